//! Opaque payloads and the sealing boundary of the encrypted prefix index.
//!
//! This crate defines the foundational types shared by the index and its
//! clients. A [`Payload`] is a byte sequence the index stores and returns
//! verbatim but never interprets. Two capabilities sit on either side of it:
//! - [`Seal`]: plaintext → payload, consumed by the index at insertion time.
//! - [`Open`]: payload → plaintext, held only by the client.
//!
//! [`KeyedSealer`] and [`KeyedOpener`] are a ready-made pair of capabilities
//! built on age X25519 envelopes. The sealer holds only the public
//! [`SealingKey`]; the secret [`OpeningKey`] never leaves the opener. Any
//! other scheme plugs in through the traits.

use std::fmt;
use std::io::{self, Read, Write};
use std::iter;
use std::str::FromStr;

use age::x25519;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An opaque, sealed byte sequence.
///
/// Deliberately distinct from plaintext strings: there is no `Display`, no
/// ordering and no conversion to `str`. `Debug` prints only the length.
/// Equality and hashing compare bytes for identity only.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Vec<u8>);

impl Payload {
    /// Wrap already-sealed bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Payload(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload(<{} bytes>)", self.0.len())
    }
}

/// Turns plaintext into an opaque [`Payload`].
///
/// Called once per insertion. A failure aborts only that insertion.
pub trait Seal {
    type Error: std::error::Error + Send + Sync + 'static;

    fn seal(&mut self, plaintext: &[u8]) -> Result<Payload, Self::Error>;
}

/// Turns a [`Payload`] back into plaintext. Client side only.
pub trait Open {
    type Error: std::error::Error + Send + Sync + 'static;

    fn open(&self, payload: &Payload) -> Result<Vec<u8>, Self::Error>;
}

/// Errors raised when sealing a payload.
#[derive(Error, Debug)]
pub enum SealError {
    #[error("no recipient to seal for")]
    NoRecipient,

    #[error("encryption failed: {0}")]
    Encrypt(#[from] age::EncryptError),

    #[error("IO error while sealing: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised when opening a payload.
#[derive(Error, Debug)]
pub enum OpenError {
    #[error("payload could not be decrypted: {0}")]
    Decrypt(#[from] age::DecryptError),

    #[error("payload is passphrase-protected, not sealed to a key")]
    Passphrase,

    #[error("IO error while opening: {0}")]
    Io(#[from] io::Error),
}

/// A textual key failed to parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid key: {0}")]
pub struct KeyParseError(&'static str);

/// Public half of a key pair. Seals, cannot open.
///
/// Renders as an `age1…` recipient string, safe to publish.
#[derive(Clone)]
pub struct SealingKey(x25519::Recipient);

impl fmt::Display for SealingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for SealingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SealingKey({})", self.0)
    }
}

impl FromStr for SealingKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        x25519::Recipient::from_str(s.trim())
            .map(SealingKey)
            .map_err(KeyParseError)
    }
}

/// Secret half of a key pair. Belongs to the client alone.
pub struct OpeningKey(x25519::Identity);

impl OpeningKey {
    /// Generate a fresh key pair from the OS RNG.
    pub fn generate() -> Self {
        OpeningKey(x25519::Identity::generate())
    }

    /// The public key payloads must be sealed to for this key to open them.
    pub fn sealing_key(&self) -> SealingKey {
        SealingKey(self.0.to_public())
    }
}

impl fmt::Debug for OpeningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OpeningKey(<redacted>)")
    }
}

impl FromStr for OpeningKey {
    type Err = KeyParseError;

    /// Parse an `AGE-SECRET-KEY-1…` string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        x25519::Identity::from_str(s.trim())
            .map(OpeningKey)
            .map_err(KeyParseError)
    }
}

/// Sealing half of the keyed scheme.
///
/// Every payload is a binary age envelope addressed to one X25519 recipient.
/// Each seal uses a fresh ephemeral key, so sealing the same plaintext twice
/// yields different payloads.
pub struct KeyedSealer {
    recipient: x25519::Recipient,
}

impl KeyedSealer {
    pub fn new(key: SealingKey) -> Self {
        KeyedSealer { recipient: key.0 }
    }
}

impl Seal for KeyedSealer {
    type Error = SealError;

    fn seal(&mut self, plaintext: &[u8]) -> Result<Payload, SealError> {
        let encryptor = age::Encryptor::with_recipients(vec![Box::new(self.recipient.clone())])
            .ok_or(SealError::NoRecipient)?;

        let mut out = Vec::new();
        let mut writer = encryptor.wrap_output(&mut out)?;
        writer.write_all(plaintext)?;
        writer.finish()?;
        Ok(Payload(out))
    }
}

/// Opening half of the keyed scheme.
pub struct KeyedOpener {
    identity: x25519::Identity,
}

impl KeyedOpener {
    pub fn new(key: OpeningKey) -> Self {
        KeyedOpener { identity: key.0 }
    }
}

impl Open for KeyedOpener {
    type Error = OpenError;

    fn open(&self, payload: &Payload) -> Result<Vec<u8>, OpenError> {
        let decryptor = match age::Decryptor::new(payload.as_bytes())? {
            age::Decryptor::Recipients(d) => d,
            _ => return Err(OpenError::Passphrase),
        };

        let mut reader = decryptor.decrypt(iter::once(&self.identity as &dyn age::Identity))?;
        let mut plaintext = Vec::new();
        reader.read_to_end(&mut plaintext)?;
        Ok(plaintext)
    }
}
