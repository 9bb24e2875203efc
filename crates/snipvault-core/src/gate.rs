//! Passphrase gate and unlocked sessions.
//!
//! The gate is the only way to obtain a [`Session`]. It validates the
//! passphrase length, derives the key with the store's salt, and treats a
//! failed authentication as "wrong passphrase". There is no stored password
//! hash. On first run (no store file) any valid passphrase creates a new
//! seeded store.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::VaultConfig;
use crate::crypto::key::{derive_key, DerivedKey, KdfParams};
use crate::crypto::passphrase::{validate_passphrase, Passphrase};
use crate::error::{Result, VaultError};
use crate::storage::encrypted_file::EncryptedFileStore;
use crate::storage::header::StoreHeader;
use crate::storage::traits::SnippetStore;
use crate::storage::types::{Record, RecordCollection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Locked,
    Unlocked,
}

/// Guards one store file until the right passphrase is supplied.
#[derive(Debug)]
pub struct PassphraseGate {
    path: PathBuf,
    params: KdfParams,
    max_attempts: Option<u32>,
    failed_attempts: u32,
    state: GateState,
}

impl PassphraseGate {
    pub fn new(config: &VaultConfig) -> Self {
        Self {
            path: config.store.path.clone(),
            params: config.kdf,
            max_attempts: config.gate.max_attempts,
            failed_attempts: 0,
            state: GateState::Locked,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn store_path(&self) -> &Path {
        &self.path
    }

    /// Try to unlock the store with `passphrase`.
    ///
    /// The passphrase is consumed and wiped whether or not the unlock
    /// succeeds. On any error the gate stays locked.
    ///
    /// # Errors
    ///
    /// - `VaultError::InvalidInput` if the passphrase is not 4–32 characters
    ///   (the store file is not touched) or the gate is already unlocked
    /// - `VaultError::WrongPassphrase` if the store does not decrypt
    /// - `VaultError::TooManyAttempts` once `max_attempts` wrong passphrases
    ///   have been seen
    /// - `VaultError::Io` / `VaultError::Format` for unreadable or damaged files
    pub fn unlock(&mut self, passphrase: Passphrase) -> Result<Session> {
        if self.state == GateState::Unlocked {
            return Err(VaultError::InvalidInput(
                "Store is already unlocked".to_string(),
            ));
        }

        if let Some(max_attempts) = self.max_attempts {
            if self.failed_attempts >= max_attempts {
                warn!(attempts = self.failed_attempts, "unlock refused");
                return Err(VaultError::TooManyAttempts(self.failed_attempts));
            }
        }

        validate_passphrase(passphrase.as_bytes())?;

        match self.open_or_create(passphrase) {
            Ok(session) => {
                self.state = GateState::Unlocked;
                info!(path = %self.path.display(), "store unlocked");
                Ok(session)
            }
            Err(VaultError::WrongPassphrase) => {
                self.failed_attempts += 1;
                warn!(attempts = self.failed_attempts, "incorrect passphrase");
                Err(VaultError::WrongPassphrase)
            }
            Err(err) => Err(err),
        }
    }

    fn open_or_create(&self, passphrase: Passphrase) -> Result<Session> {
        match EncryptedFileStore::probe(&self.path)? {
            Some(header) => {
                let key = derive_key(passphrase.as_bytes(), &header.salt, &header.params)?;
                drop(passphrase);
                let (store, _) = EncryptedFileStore::open(&self.path, &key)?;
                Ok(Session { store, key })
            }
            None => {
                let header = StoreHeader::generate(self.params)?;
                let key = derive_key(passphrase.as_bytes(), &header.salt, &header.params)?;
                drop(passphrase);
                let (store, _) = EncryptedFileStore::create(&self.path, header, &key)?;
                Ok(Session { store, key })
            }
        }
    }
}

/// An unlocked store.
///
/// Owns the derived key for as long as the session lives; the key is
/// zeroized when the session is closed or dropped.
#[derive(Debug)]
pub struct Session {
    store: EncryptedFileStore,
    key: DerivedKey,
}

impl Session {
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    pub fn list(&self) -> Result<RecordCollection> {
        self.store.list(&self.key)
    }

    pub fn get(&self, name: &str) -> Result<Record> {
        self.store.get(&self.key, name)
    }

    pub fn add(&self, name: &str, payload: &str) -> Result<()> {
        self.store.add(&self.key, name, payload)
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        self.store.remove(&self.key, name)
    }

    /// End the session and wipe the key.
    pub fn close(self) {
        info!(path = %self.store.path().display(), "session closed");
    }
}

impl SnippetStore for Session {
    fn list(&self) -> Result<RecordCollection> {
        Session::list(self)
    }

    fn get(&self, name: &str) -> Result<Record> {
        Session::get(self, name)
    }

    fn add(&self, name: &str, payload: &str) -> Result<()> {
        Session::add(self, name, payload)
    }

    fn remove(&self, name: &str) -> Result<()> {
        Session::remove(self, name)
    }
}
