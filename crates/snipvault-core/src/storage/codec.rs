//! Canonical text encoding of a record collection.
//!
//! The plaintext inside the envelope is a JSON array:
//!
//! ```text
//! [{"name":"Title","payload":"Copied Text"}, ...]
//! ```

use crate::error::{Result, VaultError};
use crate::storage::types::RecordCollection;

/// Serialize a collection to its canonical JSON text.
pub fn serialize(collection: &RecordCollection) -> Result<String> {
    serde_json::to_string(collection)
        .map_err(|e| VaultError::Format(format!("Failed to encode records: {}", e)))
}

/// Parse canonical JSON text back into a collection.
///
/// # Errors
///
/// Returns [`VaultError::Format`] if the text is not an array of objects
/// that each carry a string `name` and a string `payload`.
pub fn deserialize(text: &str) -> Result<RecordCollection> {
    serde_json::from_str(text)
        .map_err(|e| VaultError::Format(format!("Invalid record collection: {}", e)))
}
