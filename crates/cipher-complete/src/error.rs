use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("sealing failed, key not indexed: {0}")]
    Seal(#[source] BoxError),

    #[error("opening a suggestion failed: {0}")]
    Open(#[source] BoxError),

    #[error("opened suggestion is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
