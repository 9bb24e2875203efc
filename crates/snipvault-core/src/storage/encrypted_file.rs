//! Encrypted single-file store.
//!
//! The whole record collection lives in one file:
//!
//! ```text
//! snipvault-v1$m=65536,t=3,p=1$<base64 salt>
//! <base64 IV>:<base64 ciphertext>
//! ```
//!
//! Nothing is cached. Every operation re-reads and decrypts the file, and
//! every mutation rewrites it wholesale through [`crate::fs::write_atomic`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::crypto::cipher::{decrypt, encrypt, Envelope};
use crate::crypto::key::DerivedKey;
use crate::error::{Result, VaultError};
use crate::storage::codec::{deserialize, serialize};
use crate::storage::header::StoreHeader;
use crate::storage::types::{seed_collection, Record, RecordCollection};

/// Handle to an encrypted store file.
///
/// Holds no key material; every operation takes the session's key.
/// Read-modify-write cycles are serialized by an internal mutex.
#[derive(Debug)]
pub struct EncryptedFileStore {
    path: PathBuf,
    header: StoreHeader,
    write_lock: Mutex<()>,
}

/// A store file split into its parts. `header_line` is kept verbatim
/// because it is the associated data of the envelope.
struct StoreFileContents {
    header_line: String,
    header: StoreHeader,
    envelope: Envelope,
}

impl EncryptedFileStore {
    /// Read the header of an existing store.
    ///
    /// Returns `Ok(None)` if there is no file at `path`.
    pub fn probe(path: &Path) -> Result<Option<StoreHeader>> {
        match read_store_file(path) {
            Ok(contents) => Ok(Some(contents.header)),
            Err(VaultError::Io { source }) if source.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Create a new store seeded with the default record.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidInput` if a file already exists at `path`.
    pub fn create(
        path: &Path,
        header: StoreHeader,
        key: &DerivedKey,
    ) -> Result<(Self, RecordCollection)> {
        if path.exists() {
            return Err(VaultError::InvalidInput(format!(
                "Store file already exists: {}",
                path.display()
            )));
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let store = Self {
            path: path.to_path_buf(),
            header,
            write_lock: Mutex::new(()),
        };
        let seed = seed_collection();
        store.write_collection(key, &seed)?;

        info!(path = %path.display(), "created new store");
        Ok((store, seed))
    }

    /// Open an existing store and decrypt its contents.
    ///
    /// # Errors
    ///
    /// - `VaultError::Io` if the file cannot be read (including a missing file)
    /// - `VaultError::Format` if the file is not a well-formed store, or the
    ///   decrypted text is not a record collection
    /// - `VaultError::WrongPassphrase` if authentication fails
    pub fn open(path: &Path, key: &DerivedKey) -> Result<(Self, RecordCollection)> {
        let contents = read_store_file(path)?;
        let collection = decrypt_contents(&contents, key)?;

        crate::fs::cleanup_orphaned_staging(path);

        let store = Self {
            path: path.to_path_buf(),
            header: contents.header,
            write_lock: Mutex::new(()),
        };
        debug!(path = %path.display(), records = collection.len(), "opened store");
        Ok((store, collection))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &StoreHeader {
        &self.header
    }

    /// Current on-disk collection, freshly read and decrypted.
    pub fn list(&self, key: &DerivedKey) -> Result<RecordCollection> {
        let _guard = self.lock()?;
        self.read_collection(key)
    }

    /// Look up one record by exact name.
    pub fn get(&self, key: &DerivedKey, name: &str) -> Result<Record> {
        self.list(key)?
            .find(name)
            .cloned()
            .ok_or_else(|| VaultError::NotFound(name.to_string()))
    }

    /// Append a record and rewrite the store.
    ///
    /// # Errors
    ///
    /// - `VaultError::InvalidInput` if `name` or `payload` is blank
    /// - `VaultError::DuplicateName` if a record named exactly `name` exists
    pub fn add(&self, key: &DerivedKey, name: &str, payload: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(VaultError::InvalidInput(
                "Record name cannot be empty".to_string(),
            ));
        }
        if payload.trim().is_empty() {
            return Err(VaultError::InvalidInput(
                "Record payload cannot be empty".to_string(),
            ));
        }

        self.update(key, |collection| {
            if collection.contains(name) {
                return Err(VaultError::DuplicateName(name.to_string()));
            }
            collection.push(Record::new(name, payload));
            Ok(())
        })?;

        debug!(record = name, "added record");
        Ok(())
    }

    /// Remove a record by exact name and rewrite the store.
    pub fn remove(&self, key: &DerivedKey, name: &str) -> Result<()> {
        self.update(key, |collection| {
            collection
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| VaultError::NotFound(name.to_string()))
        })?;

        debug!(record = name, "removed record");
        Ok(())
    }

    /// Run one read-modify-write cycle under the store lock.
    ///
    /// If `change` fails nothing is written.
    fn update<F>(&self, key: &DerivedKey, change: F) -> Result<()>
    where
        F: FnOnce(&mut RecordCollection) -> Result<()>,
    {
        let _guard = self.lock()?;
        let mut collection = self.read_collection(key)?;
        change(&mut collection)?;
        self.write_collection(key, &collection)?;
        debug!(records = collection.len(), "rewrote store");
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| VaultError::Storage("Store lock poisoned".to_string()))
    }

    fn read_collection(&self, key: &DerivedKey) -> Result<RecordCollection> {
        let contents = read_store_file(&self.path)?;
        decrypt_contents(&contents, key)
    }

    fn write_collection(&self, key: &DerivedKey, collection: &RecordCollection) -> Result<()> {
        let header_line = self.header.to_string();
        let plaintext = Zeroizing::new(serialize(collection)?);
        let envelope = encrypt(key, plaintext.as_bytes(), header_line.as_bytes())?;

        let file_text = format!("{}\n{}\n", header_line, envelope);
        crate::fs::write_atomic(&self.path, file_text.as_bytes())
    }
}

fn read_store_file(path: &Path) -> Result<StoreFileContents> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes)
        .map_err(|_| VaultError::Format("Store file is not valid UTF-8".to_string()))?;

    let (header_line, envelope_text) = text
        .split_once('\n')
        .ok_or_else(|| VaultError::Format("Store file is missing its envelope".to_string()))?;
    let header_line = header_line.trim_end_matches('\r');

    let header = StoreHeader::parse(header_line)?;
    let envelope = Envelope::parse(envelope_text)?;

    Ok(StoreFileContents {
        header_line: header_line.to_string(),
        header,
        envelope,
    })
}

fn decrypt_contents(contents: &StoreFileContents, key: &DerivedKey) -> Result<RecordCollection> {
    let plaintext = decrypt(key, &contents.envelope, contents.header_line.as_bytes())?;
    let text = std::str::from_utf8(&plaintext)
        .map_err(|_| VaultError::Format("Decrypted records are not valid UTF-8".to_string()))?;
    deserialize(text)
}
