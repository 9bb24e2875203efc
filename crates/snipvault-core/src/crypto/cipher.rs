//! Authenticated encryption of store payloads.
//!
//! Uses XChaCha20-Poly1305. Key: 32 bytes. Nonce: 24 bytes, random per call.
//! Tag: 16 bytes, appended to the ciphertext.
//!
//! Text form of an envelope:
//!   base64(nonce) ":" base64(ciphertext + tag)

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use zeroize::Zeroizing;

use crate::crypto::key::DerivedKey;
use crate::error::{Result, VaultError};

/// Nonce length in bytes.
pub const NONCE_LENGTH: usize = 24;

/// Poly1305 tag length in bytes.
pub const TAG_LENGTH: usize = 16;

const SEPARATOR: char = ':';

/// One encrypted payload: nonce plus tagged ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    iv: [u8; NONCE_LENGTH],
    ciphertext: Vec<u8>,
}

impl Envelope {
    pub fn iv(&self) -> &[u8; NONCE_LENGTH] {
        &self.iv
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Parse the `iv:ciphertext` text form.
    ///
    /// Surrounding whitespace is ignored. Anything else that does not look
    /// like an envelope is a [`VaultError::Format`].
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let mut parts = text.split(SEPARATOR);
        let (iv_part, ct_part) = match (parts.next(), parts.next(), parts.next()) {
            (Some(iv), Some(ct), None) => (iv, ct),
            _ => {
                return Err(VaultError::Format(
                    "Envelope must be two base64 fields separated by ':'".to_string(),
                ))
            }
        };

        let iv_bytes = STANDARD
            .decode(iv_part)
            .map_err(|e| VaultError::Format(format!("Invalid base64 in IV: {}", e)))?;
        let iv: [u8; NONCE_LENGTH] = iv_bytes.as_slice().try_into().map_err(|_| {
            VaultError::Format(format!(
                "IV must be {} bytes (got {})",
                NONCE_LENGTH,
                iv_bytes.len()
            ))
        })?;

        let ciphertext = STANDARD
            .decode(ct_part)
            .map_err(|e| VaultError::Format(format!("Invalid base64 in ciphertext: {}", e)))?;
        if ciphertext.len() < TAG_LENGTH {
            return Err(VaultError::Format(format!(
                "Ciphertext shorter than the {}-byte tag",
                TAG_LENGTH
            )));
        }

        Ok(Self { iv, ciphertext })
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            STANDARD.encode(self.iv),
            SEPARATOR,
            STANDARD.encode(&self.ciphertext)
        )
    }
}

/// Encrypt `plaintext` under `key` with a fresh random nonce.
///
/// `aad` is authenticated but not encrypted; the same bytes must be passed
/// to [`decrypt`].
pub fn encrypt(key: &DerivedKey, plaintext: &[u8], aad: &[u8]) -> Result<Envelope> {
    let cipher = XChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Crypto(format!("Failed to create cipher: {}", e)))?;

    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, Payload { msg: plaintext, aad })
        .map_err(|e| VaultError::Crypto(format!("Encryption failed: {}", e)))?;

    let mut iv = [0u8; NONCE_LENGTH];
    iv.copy_from_slice(&nonce);

    Ok(Envelope { iv, ciphertext })
}

/// Decrypt an envelope.
///
/// # Errors
///
/// Returns [`VaultError::WrongPassphrase`] if authentication fails, which
/// covers both a key derived from the wrong passphrase and a tampered
/// envelope or associated data.
pub fn decrypt(key: &DerivedKey, envelope: &Envelope, aad: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let cipher = XChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Crypto(format!("Failed to create cipher: {}", e)))?;

    let nonce = XNonce::from_slice(&envelope.iv);

    let plaintext = cipher
        .decrypt(
            nonce,
            Payload {
                msg: &envelope.ciphertext,
                aad,
            },
        )
        .map_err(|_| VaultError::WrongPassphrase)?;

    Ok(Zeroizing::new(plaintext))
}
