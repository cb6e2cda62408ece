//! Configuration document loading and writing.
//!
//! The configuration file on disk is ordinary JSON; sensitive fields
//! hold either plaintext (pre-encryption) or a reference key
//! (post-encryption). These helpers bridge the document and the
//! in-memory object: loading resolves reference keys to plaintext in
//! memory only, writing replaces plaintext with reference keys so the
//! real values never reach the file.

use crate::error::Error;
use crate::schema::SecretSchema;
use crate::store::SecretStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Reads a configuration document and resolves its sensitive fields to
/// plaintext in memory.
///
/// Per-field resolution failures are masked as empty strings, matching
/// [`SecretSchema::decrypt`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_decrypted<C: DeserializeOwned>(
    path: impl AsRef<Path>,
    schema: &SecretSchema<C>,
    store: &SecretStore,
) -> Result<C, Error> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let mut config: C = serde_json::from_str(&contents)?;
    schema.decrypt(store, &mut config);
    debug!(path = %path.as_ref().display(), "loaded configuration");
    Ok(config)
}

/// Writes a configuration document with sensitive fields replaced by
/// reference keys; the caller's object keeps its plaintext.
///
/// # Errors
///
/// Returns an error if field encryption, serialization or the file
/// write fails.
pub fn write_encrypted<C: Serialize + Clone>(
    path: impl AsRef<Path>,
    schema: &SecretSchema<C>,
    store: &SecretStore,
    config: &C,
) -> Result<(), Error> {
    let mut sealed = config.clone();
    schema.encrypt(store, &mut sealed)?;

    let contents = serde_json::to_string_pretty(&sealed)?;
    std::fs::write(path.as_ref(), contents)?;
    debug!(path = %path.as_ref().display(), "wrote encrypted configuration");
    Ok(())
}

/// Encrypts a configuration document in place: reads it, replaces
/// sensitive plaintext with reference keys, and writes it back.
///
/// Already-encrypted fields pass through untouched, so repeated runs
/// are idempotent at the document level.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, encrypted or
/// written back.
pub fn encrypt_in_place<C: Serialize + DeserializeOwned>(
    path: impl AsRef<Path>,
    schema: &SecretSchema<C>,
    store: &SecretStore,
) -> Result<(), Error> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let mut config: C = serde_json::from_str(&contents)?;
    schema.encrypt(store, &mut config)?;

    let sealed = serde_json::to_string_pretty(&config)?;
    std::fs::write(path.as_ref(), sealed)?;
    debug!(path = %path.as_ref().display(), "encrypted configuration in place");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Settings {
        github_username: String,
        github_token: String,
    }

    fn schema() -> SecretSchema<Settings> {
        SecretSchema::new().field("github_token", |s: &mut Settings| &mut s.github_token)
    }

    fn fixture() -> (TempDir, SecretStore, std::path::PathBuf) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = SecretStore::in_dir(temp_dir.path());
        store.create().expect("Failed to create store");
        let config_path = temp_dir.path().join("settings.json");
        (temp_dir, store, config_path)
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let (_dir, store, path) = fixture();
        let schema = schema();

        let settings = Settings {
            github_username: "alice".to_string(),
            github_token: "ghp_123".to_string(),
        };
        write_encrypted(&path, &schema, &store, &settings).unwrap();

        // The document carries a reference key, never the plaintext.
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("ghp_123"));
        assert!(contents.contains("github_token_ENC_"));

        let loaded = read_decrypted(&path, &schema, &store).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_write_leaves_caller_plaintext_intact() {
        let (_dir, store, path) = fixture();
        let schema = schema();

        let settings = Settings {
            github_username: "alice".to_string(),
            github_token: "ghp_123".to_string(),
        };
        write_encrypted(&path, &schema, &store, &settings).unwrap();
        assert_eq!(settings.github_token, "ghp_123");
    }

    #[test]
    fn test_encrypt_in_place() {
        let (_dir, store, path) = fixture();
        let schema = schema();

        let plaintext_doc = serde_json::json!({
            "github_username": "alice",
            "github_token": "ghp_123",
        });
        std::fs::write(&path, serde_json::to_string_pretty(&plaintext_doc).unwrap()).unwrap();

        encrypt_in_place(&path, &schema, &store).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        assert!(!first.contains("ghp_123"));

        // Second pass leaves the document unchanged.
        encrypt_in_place(&path, &schema, &store).unwrap();
        let second = std::fs::read_to_string(&path).unwrap();
        assert_eq!(first, second);

        let loaded: Settings = read_decrypted(&path, &schema, &store).unwrap();
        assert_eq!(loaded.github_token, "ghp_123");
    }

    #[test]
    fn test_read_missing_file() {
        let (_dir, store, path) = fixture();
        assert!(matches!(
            read_decrypted(&path, &schema(), &store),
            Err(Error::Io(_))
        ));
    }
}
