//! Error types for snipvault core operations.
//!
//! Every fallible operation in the crate returns [`VaultError`]. Callers
//! (the presentation layer) decide whether to re-prompt, show a message, or
//! give up; nothing here is fatal to the process and nothing is retried.

use thiserror::Error;

/// Result type alias for snipvault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Core error type for snipvault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Authentication failed while decrypting: wrong passphrase or tampered file
    #[error("Incorrect passphrase")]
    WrongPassphrase,

    /// Store file is readable but its contents are not a valid store
    #[error("Format error: {0}")]
    Format(String),

    /// A record with this name already exists
    #[error("Record already exists: {0}")]
    DuplicateName(String),

    /// No record with this name exists
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The gate refuses further unlock attempts
    #[error("Too many failed unlock attempts ({0})")]
    TooManyAttempts(u32),

    /// Key derivation or cipher setup failure
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Configuration could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),

    /// Storage backend error (poisoned lock, bad path)
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl VaultError {
    /// True when the caller should re-prompt for a passphrase.
    pub fn is_wrong_passphrase(&self) -> bool {
        matches!(self, VaultError::WrongPassphrase)
    }
}
