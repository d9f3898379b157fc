// File: ./src/cipher/mod.rs
//! Per-page XOR obfuscation of lesson names.
pub mod decrypt;
pub mod key;

pub use decrypt::{Plaintexts, decrypt_all, decrypt_text, encrypt_text};
pub use key::{KeyRequest, resolve_key};

use crate::error::{RaspError, Result};
use std::fmt;

/// Non-empty XOR key scoped to one document.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherKey(Vec<u8>);

impl CipherKey {
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(RaspError::KeyResolution("cipher key is empty".into()));
        }
        Ok(Self(bytes))
    }

    /// Each character is taken as one raw byte value, as the key endpoint
    /// returns it.
    pub fn from_chars(s: &str) -> Result<Self> {
        let bytes = s
            .chars()
            .map(|c| {
                u8::try_from(u32::from(c)).map_err(|_| {
                    RaspError::KeyResolution(format!("key character {:?} is not a byte", c))
                })
            })
            .collect::<Result<Vec<u8>>>()?;
        Self::new(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key byte applied to the character at `index`.
    pub fn byte_for(&self, index: usize) -> u8 {
        self.0[index % self.0.len()]
    }
}

// Keys are per-page secrets; keep them out of logs.
impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CipherKey({} bytes)", self.0.len())
    }
}
