//! Store file header.
//!
//! The first line of a store file records what is needed to re-derive the
//! key: the Argon2id cost parameters and the per-store salt.
//!
//! ```text
//! snipvault-v1$m=65536,t=3,p=1$<base64 salt>
//! ```
//!
//! The header line is also the associated data of the envelope, so editing
//! it invalidates the ciphertext. It is read before that check can run, so
//! the cost parameters are bounded while parsing.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::crypto::key::{KdfParams, Salt, SALT_LENGTH};
use crate::error::{Result, VaultError};

/// Format tag at the start of every store file.
pub const FORMAT_TAG: &str = "snipvault-v1";

/// Largest Argon2 memory cost accepted from a header (1 GiB).
pub const MAX_MEMORY_KIB: u32 = 1024 * 1024;

/// Largest Argon2 iteration count accepted from a header.
pub const MAX_ITERATIONS: u32 = 10;

/// Largest Argon2 lane count accepted from a header.
pub const MAX_PARALLELISM: u32 = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreHeader {
    pub params: KdfParams,
    pub salt: Salt,
}

impl StoreHeader {
    pub fn new(params: KdfParams, salt: Salt) -> Self {
        Self { params, salt }
    }

    /// Header for a brand new store: fresh salt, given params.
    pub fn generate(params: KdfParams) -> Result<Self> {
        Ok(Self::new(params, Salt::generate()?))
    }

    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.trim().split('$');
        let (tag, params, salt) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(tag), Some(params), Some(salt), None) => (tag, params, salt),
            _ => {
                return Err(VaultError::Format(
                    "Store header must have three '$'-separated fields".to_string(),
                ))
            }
        };

        if tag != FORMAT_TAG {
            return Err(VaultError::Format(format!(
                "Unsupported store format: {}",
                tag
            )));
        }

        let params = parse_params(params)?;

        let salt_bytes = STANDARD
            .decode(salt)
            .map_err(|e| VaultError::Format(format!("Invalid base64 in salt: {}", e)))?;
        let salt: [u8; SALT_LENGTH] = salt_bytes.as_slice().try_into().map_err(|_| {
            VaultError::Format(format!(
                "Salt must be {} bytes (got {})",
                SALT_LENGTH,
                salt_bytes.len()
            ))
        })?;

        Ok(Self::new(params, Salt::from_bytes(salt)))
    }
}

impl fmt::Display for StoreHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}$m={},t={},p={}${}",
            FORMAT_TAG,
            self.params.memory_kib,
            self.params.iterations,
            self.params.parallelism,
            STANDARD.encode(self.salt.as_bytes())
        )
    }
}

fn parse_params(text: &str) -> Result<KdfParams> {
    let mut fields = text.split(',');
    let memory_kib = parse_field(fields.next(), "m")?;
    let iterations = parse_field(fields.next(), "t")?;
    let parallelism = parse_field(fields.next(), "p")?;
    if fields.next().is_some() {
        return Err(VaultError::Format(
            "Unexpected extra KDF parameter".to_string(),
        ));
    }

    if !(1..=MAX_PARALLELISM).contains(&parallelism) {
        return Err(VaultError::Format(format!(
            "KDF parallelism out of range: {}",
            parallelism
        )));
    }
    if !(1..=MAX_ITERATIONS).contains(&iterations) {
        return Err(VaultError::Format(format!(
            "KDF iterations out of range: {}",
            iterations
        )));
    }
    // Argon2 needs at least 8 KiB per lane.
    if memory_kib < 8 * parallelism || memory_kib > MAX_MEMORY_KIB {
        return Err(VaultError::Format(format!(
            "KDF memory out of range: {} KiB",
            memory_kib
        )));
    }

    Ok(KdfParams {
        memory_kib,
        iterations,
        parallelism,
    })
}

fn parse_field(field: Option<&str>, name: &str) -> Result<u32> {
    let value = field
        .and_then(|field| field.strip_prefix(name))
        .and_then(|rest| rest.strip_prefix('='))
        .ok_or_else(|| VaultError::Format(format!("Missing KDF parameter '{}'", name)))?;
    value
        .parse()
        .map_err(|_| VaultError::Format(format!("Invalid KDF parameter '{}': {}", name, value)))
}
