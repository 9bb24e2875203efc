use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use snipvault_core::crypto::KdfParams;
use snipvault_core::{Passphrase, PassphraseGate, Record, Session, VaultConfig, VaultError};
use tempfile::tempdir;

fn config(path: &Path) -> VaultConfig {
    VaultConfig::new(path).with_kdf(KdfParams {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
}

fn unlock(path: &Path, passphrase: &str) -> Result<Session, VaultError> {
    PassphraseGate::new(&config(path)).unlock(Passphrase::from(passphrase))
}

#[test]
fn test_fresh_environment_seeds_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snippets.vault");
    assert!(!path.exists());

    let session = unlock(&path, "abcd").expect("first unlock should succeed");

    assert!(path.exists());
    let records = session.list().unwrap();
    assert_eq!(records.records(), &[Record::new("Title", "Copied Text")]);
}

#[test]
fn test_add_then_list_in_insertion_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snippets.vault");
    unlock(&path, "abcd").unwrap().close();

    let session = unlock(&path, "abcd").expect("correct passphrase should unlock");
    session.add("Email", "me@example.com").unwrap();

    let records = session.list().unwrap();
    assert_eq!(
        records.records(),
        &[
            Record::new("Title", "Copied Text"),
            Record::new("Email", "me@example.com"),
        ]
    );
}

#[test]
fn test_changes_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snippets.vault");
    let session = unlock(&path, "abcd").unwrap();
    session.add("Email", "me@example.com").unwrap();
    session.add("Address", "1 Main St").unwrap();
    session.remove("Title").unwrap();
    session.close();

    let session = unlock(&path, "abcd").unwrap();
    assert_eq!(session.list().unwrap().names(), vec!["Email", "Address"]);
}

#[test]
fn test_wrong_passphrase_leaves_file_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snippets.vault");
    unlock(&path, "abcd").unwrap().add("Email", "me@example.com").unwrap();
    let before = fs::read(&path).unwrap();

    let result = unlock(&path, "wrong");

    assert!(matches!(result, Err(VaultError::WrongPassphrase)));
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_bad_length_leaves_file_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snippets.vault");
    unlock(&path, "abcd").unwrap();
    let before = fs::read(&path).unwrap();

    let too_long = "x".repeat(33);
    for candidate in ["abc", too_long.as_str()] {
        let result = unlock(&path, candidate);
        assert!(matches!(result, Err(VaultError::InvalidInput(_))));
    }
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_duplicate_name_leaves_count_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snippets.vault");
    let session = unlock(&path, "abcd").unwrap();
    session.add("Email", "me@example.com").unwrap();
    let before = fs::read(&path).unwrap();

    let result = session.add("Email", "other@example.com");

    assert!(matches!(result, Err(VaultError::DuplicateName(name)) if name == "Email"));
    assert_eq!(session.list().unwrap().len(), 2);
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_remove_missing_name_leaves_file_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snippets.vault");
    let session = unlock(&path, "abcd").unwrap();
    let before = fs::read(&path).unwrap();

    let result = session.remove("NoSuchName");

    assert!(matches!(result, Err(VaultError::NotFound(name)) if name == "NoSuchName"));
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_store_file_does_not_contain_plaintext() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snippets.vault");
    let session = unlock(&path, "abcd").unwrap();
    session.add("Marker", "PLAINTEXT_MARKER_123").unwrap();

    let on_disk = fs::read_to_string(&path).unwrap();
    assert!(!on_disk.contains("PLAINTEXT_MARKER_123"));
    assert!(!on_disk.contains("Marker"));
}

#[test]
fn test_list_reflects_disk_not_memory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snippets.vault");
    let first = unlock(&path, "abcd").unwrap();
    let second = unlock(&path, "abcd").unwrap();

    second.add("Email", "me@example.com").unwrap();

    assert_eq!(first.list().unwrap().names(), vec!["Title", "Email"]);
}

#[test]
fn test_concurrent_adds_are_serialized() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snippets.vault");
    let session = Arc::new(unlock(&path, "abcd").unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let session = Arc::clone(&session);
            thread::spawn(move || session.add(&format!("name-{}", i), "payload"))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let records = session.list().unwrap();
    assert_eq!(records.len(), 9);
    for i in 0..8 {
        assert!(records.contains(&format!("name-{}", i)));
    }
}
