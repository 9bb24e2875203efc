//! Passphrase handling and validation.
//!
//! A [`Passphrase`] is a byte buffer that wipes itself on drop. The unlock
//! path consumes it, so the caller never keeps a copy around longer than the
//! key derivation needs.

use zeroize::{Zeroize, Zeroizing};

use crate::error::{Result, VaultError};

/// Minimum passphrase length in characters.
pub const MIN_PASSPHRASE_LENGTH: usize = 4;

/// Maximum passphrase length in characters.
pub const MAX_PASSPHRASE_LENGTH: usize = 32;

/// Sensitive passphrase bytes, zeroized on drop.
pub struct Passphrase {
    bytes: Zeroizing<Vec<u8>>,
}

impl Passphrase {
    /// Copy the passphrase out of a caller-owned buffer and wipe the source.
    pub fn from_mut_slice(source: &mut [u8]) -> Self {
        let bytes = Zeroizing::new(source.to_vec());
        source.zeroize();
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for Passphrase {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }
}

impl From<String> for Passphrase {
    fn from(value: String) -> Self {
        Self::from(value.into_bytes())
    }
}

impl From<&str> for Passphrase {
    fn from(value: &str) -> Self {
        Self::from(value.as_bytes().to_vec())
    }
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Passphrase([REDACTED])")
    }
}

/// Validate passphrase length.
///
/// # Requirements
///
/// - Valid UTF-8
/// - Between 4 and 32 characters inclusive
///
/// # Examples
///
/// ```
/// use snipvault_core::crypto::validate_passphrase;
///
/// assert!(validate_passphrase(b"abcd").is_ok());
/// assert!(validate_passphrase(b"abc").is_err());
/// ```
pub fn validate_passphrase(passphrase: &[u8]) -> Result<()> {
    let text = std::str::from_utf8(passphrase)
        .map_err(|_| VaultError::InvalidInput("Passphrase must be valid UTF-8".to_string()))?;

    let length = text.chars().count();
    if !(MIN_PASSPHRASE_LENGTH..=MAX_PASSPHRASE_LENGTH).contains(&length) {
        return Err(VaultError::InvalidInput(format!(
            "Passphrase must be between {} and {} characters (got {})",
            MIN_PASSPHRASE_LENGTH, MAX_PASSPHRASE_LENGTH, length
        )));
    }

    Ok(())
}
