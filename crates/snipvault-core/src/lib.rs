//! # snipvault core
//!
//! Encrypted, passphrase-gated storage for named text snippets.
//!
//! A store is a single file holding an ordered list of `{name, payload}`
//! records, encrypted with a key derived from the user's passphrase. The
//! presentation layer (whatever renders the snippets and copies them to
//! the clipboard) only ever sees a [`Session`].
//!
//! ## Architecture
//!
//! - **crypto**: Argon2id key derivation, XChaCha20-Poly1305 envelopes,
//!   passphrase validation
//! - **storage**: record types, canonical encoding, the encrypted store file
//! - **fs**: staging-file + rename atomic rewrites
//! - **gate**: passphrase gate and unlocked sessions
//! - **config**: TOML configuration
//!
//! ## Example
//!
//! ```no_run
//! use snipvault_core::{Passphrase, PassphraseGate, VaultConfig};
//!
//! let config = VaultConfig::new("snippets.vault");
//! let mut gate = PassphraseGate::new(&config);
//! let session = gate.unlock(Passphrase::from("abcd"))?;
//!
//! session.add("Email", "me@example.com")?;
//! for record in &session.list()? {
//!     println!("{}", record.name);
//! }
//! # Ok::<(), snipvault_core::VaultError>(())
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod fs;
pub mod gate;
pub mod storage;

pub use config::VaultConfig;
pub use crypto::Passphrase;
pub use error::{Result, VaultError};
pub use gate::{GateState, PassphraseGate, Session};
pub use storage::{Record, RecordCollection, SnippetStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
