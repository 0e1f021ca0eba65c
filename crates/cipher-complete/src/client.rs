use sealed_payload::{Open, Payload};

use crate::error::{Error, Result};

/// The trusted side of the boundary: the only holder of an [`Open`]
/// capability.
///
/// Turns ranked payloads back into the words they stand for. Reporting the
/// chosen word goes straight to the index through `record_selection`.
pub struct Client<O: Open> {
    opener: O,
}

impl<O: Open> Client<O> {
    pub fn new(opener: O) -> Self {
        Client { opener }
    }

    /// Open one payload as UTF-8 text.
    pub fn decrypt(&self, payload: &Payload) -> Result<String> {
        let bytes = self
            .opener
            .open(payload)
            .map_err(|e| Error::Open(Box::new(e)))?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Open every payload, keeping the ranked order.
    pub fn decrypt_suggestions(&self, payloads: &[Payload]) -> Result<Vec<String>> {
        payloads.iter().map(|p| self.decrypt(p)).collect()
    }
}
