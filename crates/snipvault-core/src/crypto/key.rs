//! Key derivation using Argon2id.
//!
//! Passphrases never touch the cipher directly. Each store carries its own
//! random salt and the Argon2id cost parameters it was created with, and the
//! 256-bit cipher key is derived from those plus the passphrase.

use argon2::Argon2;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

use crate::error::{Result, VaultError};

/// Length of derived key in bytes (256 bits for XChaCha20-Poly1305).
pub const KEY_LENGTH: usize = 32;

/// Length of the per-store salt in bytes.
pub const SALT_LENGTH: usize = 16;

/// Argon2id cost parameters.
///
/// Defaults are tuned for interactive desktop unlocks:
/// - Memory: 64 MB (64 * 1024 KB)
/// - Iterations: 3
/// - Parallelism: 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 3,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    fn to_argon2(self) -> Result<argon2::Params> {
        argon2::Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(KEY_LENGTH),
        )
        .map_err(|e| VaultError::Crypto(format!("Failed to create Argon2 params: {}", e)))
    }
}

/// Per-store random salt. Not secret; stored in the clear in the file header.
///
/// `Debug` prints the same base64 text the header carries.
#[derive(Clone, PartialEq, Eq)]
pub struct Salt([u8; SALT_LENGTH]);

impl Salt {
    /// Draw a fresh salt from the OS random number generator.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; SALT_LENGTH];
        getrandom::getrandom(&mut bytes)
            .map_err(|e| VaultError::Crypto(format!("Failed to generate salt: {}", e)))?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; SALT_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LENGTH] {
        &self.0
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Salt").field(&STANDARD.encode(self.0)).finish()
    }
}

/// A cryptographic key derived from a passphrase.
///
/// Key material is zeroized from memory when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive an encryption key from a passphrase using Argon2id.
///
/// # Security
///
/// - Same passphrase + salt + params always produces the same key
/// - Different salt produces a different key, so the salt must be stored
///   with the store it belongs to
/// - Memory-hard: the default params need ~64MB RAM per attempt
///
/// # Examples
///
/// ```
/// use snipvault_core::crypto::{derive_key, KdfParams, Salt};
///
/// let params = KdfParams { memory_kib: 8, iterations: 1, parallelism: 1 };
/// let salt = Salt::from_bytes([7u8; 16]);
/// let key = derive_key(b"my-passphrase", &salt, &params).unwrap();
/// assert_eq!(key.as_bytes().len(), 32);
/// ```
pub fn derive_key(passphrase: &[u8], salt: &Salt, params: &KdfParams) -> Result<DerivedKey> {
    if passphrase.is_empty() {
        return Err(VaultError::InvalidInput(
            "Passphrase cannot be empty".to_string(),
        ));
    }

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params.to_argon2()?,
    );

    let mut key_bytes = [0u8; KEY_LENGTH];
    argon2
        .hash_password_into(passphrase, salt.as_bytes(), &mut key_bytes)
        .map_err(|e| VaultError::Crypto(format!("Key derivation failed: {}", e)))?;

    Ok(DerivedKey::from_bytes(key_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_params() -> KdfParams {
        KdfParams {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_key_derivation_deterministic() {
        let salt = Salt::from_bytes([1u8; SALT_LENGTH]);

        let key1 = derive_key(b"test-passphrase", &salt, &fast_params()).unwrap();
        let key2 = derive_key(b"test-passphrase", &salt, &fast_params()).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_salt_different_key() {
        let salt1 = Salt::from_bytes([1u8; SALT_LENGTH]);
        let salt2 = Salt::from_bytes([2u8; SALT_LENGTH]);

        let key1 = derive_key(b"test-passphrase", &salt1, &fast_params()).unwrap();
        let key2 = derive_key(b"test-passphrase", &salt2, &fast_params()).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_passphrase_different_key() {
        let salt = Salt::from_bytes([3u8; SALT_LENGTH]);

        let key1 = derive_key(b"passphrase-one", &salt, &fast_params()).unwrap();
        let key2 = derive_key(b"passphrase-two", &salt, &fast_params()).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_params_different_key() {
        let salt = Salt::from_bytes([4u8; SALT_LENGTH]);
        let slower = KdfParams {
            iterations: 2,
            ..fast_params()
        };

        let key1 = derive_key(b"test-passphrase", &salt, &fast_params()).unwrap();
        let key2 = derive_key(b"test-passphrase", &salt, &slower).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_key_length_independent_of_passphrase_length() {
        let salt = Salt::from_bytes([5u8; SALT_LENGTH]);

        let short = derive_key(b"abcd", &salt, &fast_params()).unwrap();
        let long = derive_key(&[b'x'; 32], &salt, &fast_params()).unwrap();

        assert_eq!(short.as_bytes().len(), KEY_LENGTH);
        assert_eq!(long.as_bytes().len(), KEY_LENGTH);
    }

    #[test]
    fn test_empty_passphrase_rejected() {
        let salt = Salt::from_bytes([6u8; SALT_LENGTH]);
        let result = derive_key(b"", &salt, &fast_params());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Passphrase cannot be empty"));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let salt = Salt::from_bytes([6u8; SALT_LENGTH]);
        let params = KdfParams {
            memory_kib: 8,
            iterations: 0,
            parallelism: 1,
        };
        let result = derive_key(b"test-passphrase", &salt, &params);
        assert!(matches!(result, Err(VaultError::Crypto(_))));
    }

    #[test]
    fn test_generated_salts_differ() {
        let a = Salt::generate().unwrap();
        let b = Salt::generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_salt_debug_matches_header_text() {
        let salt = Salt::from_bytes([0xAB; SALT_LENGTH]);
        let debug_output = format!("{:?}", salt);

        assert_eq!(debug_output, format!("Salt({:?})", STANDARD.encode([0xAB; SALT_LENGTH])));
        assert!(!debug_output.contains("171"));
    }

    #[test]
    fn test_derived_key_debug_redacts() {
        let salt = Salt::from_bytes([7u8; SALT_LENGTH]);
        let key = derive_key(b"test-passphrase", &salt, &fast_params()).unwrap();

        let debug_output = format!("{:?}", key);
        assert!(debug_output.contains("REDACTED"));

        let key_hex = hex::encode(&key.as_bytes()[..4]);
        assert!(!debug_output.contains(&key_hex));
    }
}
