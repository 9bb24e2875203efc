//! Snippet store trait definition.
//!
//! `SnippetStore` is the surface the presentation layer talks to once a
//! store is unlocked. It hides key handling entirely: implementations carry
//! whatever key material they need.

use super::types::{Record, RecordCollection};
use crate::error::Result;

/// Operations available on an unlocked snippet store.
///
/// All implementations must ensure:
/// - Data is encrypted at rest
/// - Each mutation is applied atomically, or not at all
/// - Record names are unique (exact, case-sensitive match)
/// - Insertion order is preserved
pub trait SnippetStore: Send + Sync {
    /// All records, in insertion order.
    fn list(&self) -> Result<RecordCollection>;

    /// One record by exact name.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotFound` if no record has this name.
    fn get(&self, name: &str) -> Result<Record>;

    /// Append a new record.
    ///
    /// # Errors
    ///
    /// - `VaultError::InvalidInput` if the name is blank or the payload empty
    /// - `VaultError::DuplicateName` if the name is taken
    fn add(&self, name: &str, payload: &str) -> Result<()>;

    /// Delete a record by exact name.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotFound` if no record has this name.
    fn remove(&self, name: &str) -> Result<()>;
}
