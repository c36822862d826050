//! # Secret Payload
//!
//! Owned secret material returned by `access_secret_version`.
//!
//! The buffer is wiped when dropped and never shows up in `Debug` output, so
//! a payload cannot leak through a stray `{:?}` in a log line.

use std::fmt;
use zeroize::Zeroizing;

/// Raw bytes of a secret version
#[derive(Clone, PartialEq, Eq)]
pub struct SecretPayload(Zeroizing<Vec<u8>>);

impl SecretPayload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Borrow the secret material
    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for SecretPayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl AsRef<[u8]> for SecretPayload {
    fn as_ref(&self) -> &[u8] {
        self.expose()
    }
}

impl fmt::Debug for SecretPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretPayload([REDACTED; {} bytes])", self.len())
    }
}
