//! Storage layer for snipvault.
//!
//! ## Architecture
//!
//! - `types`: records and the ordered record collection
//! - `codec`: canonical JSON text of a collection
//! - `header`: first line of the store file (format tag, KDF params, salt)
//! - `encrypted_file`: the single encrypted store file and its operations
//! - `traits`: the `SnippetStore` seam used by callers
//!
//! ## Security
//!
//! The store file is always encrypted (no plaintext modes), every write
//! uses a fresh nonce, and every rewrite goes through a staging file plus
//! rename so a crash never leaves a half-written store.

pub mod codec;
pub mod encrypted_file;
pub mod header;
pub mod traits;
pub mod types;

pub use encrypted_file::EncryptedFileStore;
pub use header::StoreHeader;
pub use traits::SnippetStore;
pub use types::{seed_collection, Record, RecordCollection};
