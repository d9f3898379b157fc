// File: ./src/cipher/decrypt.rs
use crate::cipher::CipherKey;
use crate::error::{RaspError, Result};
use crate::parser::dom::{ENCRYPTED_TEXT_ATTR, ENCRYPTED_TITLE_ATTR, RawDocument};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ego_tree::NodeId;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedNode {
    pub text: String,
    pub title: Option<String>,
}

/// Plaintext of every encrypted node of one document, keyed by node.
#[derive(Debug, Clone, Default)]
pub struct Plaintexts {
    nodes: HashMap<NodeId, DecryptedNode>,
}

impl Plaintexts {
    pub fn get(&self, id: NodeId) -> Option<&DecryptedNode> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn xor_chars(input: &str, key: &CipherKey) -> Result<String> {
    input
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let code = u32::from(c) ^ u32::from(key.byte_for(i));
            char::from_u32(code).ok_or_else(|| {
                RaspError::Decode(format!("U+{:04X} at position {} is not a valid character", code, i))
            })
        })
        .collect()
}

/// base64 -> UTF-8 -> per-codepoint XOR with the cycled key.
pub fn decrypt_text(ciphertext: &str, key: &CipherKey) -> Result<String> {
    let bytes = STANDARD
        .decode(ciphertext.trim())
        .map_err(|e| RaspError::Decode(format!("invalid base64 '{}': {}", ciphertext, e)))?;
    let encoded = String::from_utf8(bytes)
        .map_err(|e| RaspError::Decode(format!("ciphertext is not UTF-8: {}", e)))?;
    xor_chars(&encoded, key)
}

/// Inverse of [`decrypt_text`].
pub fn encrypt_text(plaintext: &str, key: &CipherKey) -> Result<String> {
    let xored = xor_chars(plaintext, key)?;
    Ok(STANDARD.encode(xored.as_bytes()))
}

/// Decrypts every `data-encrypt` node (and its `data-title`, if any).
pub fn decrypt_all(doc: &RawDocument, key: &CipherKey) -> Result<Plaintexts> {
    let mut nodes = HashMap::new();
    for el in doc.encrypted_nodes()? {
        let Some(cipher) = el.value().attr(ENCRYPTED_TEXT_ATTR) else {
            continue;
        };
        let text = decrypt_text(cipher, key)?;
        let title = el
            .value()
            .attr(ENCRYPTED_TITLE_ATTR)
            .map(|t| decrypt_text(t, key))
            .transpose()?;
        nodes.insert(el.id(), DecryptedNode { text, title });
    }
    log::debug!("Decrypted {} nodes", nodes.len());
    Ok(Plaintexts { nodes })
}
