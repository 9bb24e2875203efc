//! Cryptographic operations for snipvault.
//!
//! - **Argon2id**: memory-hard key derivation from the passphrase
//! - **XChaCha20-Poly1305**: authenticated encryption of the record collection
//!
//! ## Security Model
//!
//! - Per-store random salt, stored in the clear next to the ciphertext
//! - Fresh random nonce for every write
//! - Authentication failure is the only wrong-passphrase signal; no password
//!   hash is stored
//! - Passphrases and keys zeroized from memory on drop
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the store file
//! - Offline brute-force attacks on the passphrase
//! - Silent acceptance of a tampered or truncated file
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to an unlocked session / process memory

pub mod cipher;
pub mod key;
pub mod passphrase;

pub use cipher::{decrypt, encrypt, Envelope};
pub use key::{derive_key, DerivedKey, KdfParams, Salt};
pub use passphrase::{validate_passphrase, Passphrase};
