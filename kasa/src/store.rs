//! File-backed secret store.
//!
//! A `SecretStore` is a durable key-to-plaintext mapping encrypted at rest
//! under a master key held in its own file. Every operation opens the
//! files, mutates, persists and releases; nothing is cached between calls,
//! so no unlocked key lives in memory across the process lifetime.
//!
//! Two files make up a store and must move in lock-step:
//!
//! ```text
//! secrets.json    { "version": 1, "entries": { key: hex(nonce || ciphertext) } }
//! secrets.key     raw 32-byte master key, 0600 permissions on unix
//! ```
//!
//! If either file is absent the store is uninitialized and [`create`]
//! regenerates the pair, which invalidates every previously issued
//! reference key.
//!
//! [`create`]: SecretStore::create

use crate::error::Error;
use chacha20poly1305::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    ChaCha20Poly1305, Nonce,
};
use secrecy::{ExposeSecret, SecretVec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use zeroize::Zeroizing;

/// Master key size in bytes (256 bits).
pub const KEY_SIZE: usize = 32;

/// Nonce size for ChaCha20-Poly1305 (96 bits).
const NONCE_SIZE: usize = 12;

/// Default store file name.
pub const DEFAULT_STORE_FILE: &str = "secrets.json";

/// Default master key file name.
pub const DEFAULT_KEY_FILE: &str = "secrets.key";

/// Store file format version.
const STORE_VERSION: u32 = 1;

/// On-disk representation of the store file.
///
/// Entries are kept in a `BTreeMap` so iteration order (and therefore
/// [`SecretStore::find_first_key`]) is deterministic.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    entries: BTreeMap<String, String>,
}

/// File-backed secret store protected by a master key file.
///
/// The handle holds only paths; each operation performs a full scoped
/// acquisition of the underlying files. Concurrent access to the same
/// file pair from two handles or two processes can race and corrupt the
/// store; callers must serialize access themselves.
///
/// # Example
///
/// ```ignore
/// use kasa::store::SecretStore;
///
/// let store = SecretStore::in_dir("./state");
/// store.create()?;
/// store.set("GithubToken_ENC_abc", "ghp_123")?;
/// assert_eq!(store.get("GithubToken_ENC_abc")?, "ghp_123");
/// ```
#[derive(Debug, Clone)]
pub struct SecretStore {
    store_path: PathBuf,
    key_path: PathBuf,
}

impl SecretStore {
    /// Creates a handle over explicit store and key file paths.
    ///
    /// No filesystem access happens here; use [`create`](Self::create) to
    /// initialize the files.
    #[must_use]
    pub fn new(store_path: impl Into<PathBuf>, key_path: impl Into<PathBuf>) -> Self {
        Self { store_path: store_path.into(), key_path: key_path.into() }
    }

    /// Creates a handle using the default file names inside `dir`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(DEFAULT_STORE_FILE), dir.join(DEFAULT_KEY_FILE))
    }

    /// Returns the store file path.
    #[must_use]
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Returns the master key file path.
    #[must_use]
    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Returns `true` if both the store file and the key file exist.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.store_path.exists() && self.key_path.exists()
    }

    /// Initializes the store: generates a master key and an empty store
    /// file, persisting both. No-op if both files already exist.
    ///
    /// If only one of the two files exists the pair is regenerated, which
    /// silently invalidates every reference key issued so far.
    ///
    /// # Errors
    ///
    /// Returns an error if key generation or file writes fail.
    pub fn create(&self) -> Result<(), Error> {
        if self.is_initialized() {
            return Ok(());
        }

        let mut key_bytes = Zeroizing::new(vec![0u8; KEY_SIZE]);
        OsRng.fill_bytes(&mut key_bytes);
        self.write_key_file(&key_bytes)?;

        self.save_file(&StoreFile { version: STORE_VERSION, entries: BTreeMap::new() })?;

        debug!(store = %self.store_path.display(), "initialized secret store");
        Ok(())
    }

    /// Stores `plaintext` under `key`, overwriting silently if the key is
    /// already present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUninitialized`] if either file is missing,
    /// or an error if encryption or persistence fails.
    pub fn set(&self, key: &str, plaintext: &str) -> Result<(), Error> {
        self.require_initialized()?;
        let master_key = self.load_key()?;
        let mut file = self.load_file()?;

        let sealed = seal_entry(&master_key, key, plaintext)?;
        file.entries.insert(key.to_string(), sealed);

        self.save_file(&file)?;
        debug!(key, "stored secret");
        Ok(())
    }

    /// Retrieves and decrypts the plaintext stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUninitialized`] if either file is missing,
    /// [`Error::SecretNotFound`] if the key is absent,
    /// [`Error::SecretValueInvalid`] if the record decrypts to an empty
    /// payload, or [`Error::AuthenticationFailed`] if the entry fails
    /// authentication (corrupted entry or wrong master key).
    pub fn get(&self, key: &str) -> Result<String, Error> {
        self.require_initialized()?;
        let master_key = self.load_key()?;
        let file = self.load_file()?;

        let sealed = file
            .entries
            .get(key)
            .ok_or_else(|| Error::SecretNotFound(key.to_string()))?;

        let plaintext = open_entry(&master_key, key, sealed)?;
        if plaintext.is_empty() {
            return Err(Error::SecretValueInvalid(key.to_string()));
        }
        Ok(plaintext)
    }

    /// Removes the record stored under `key` and persists the store.
    ///
    /// An absent key is not an error; the store is persisted either way.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUninitialized`] if either file is missing,
    /// or an error if persistence fails.
    pub fn delete(&self, key: &str) -> Result<(), Error> {
        self.require_initialized()?;
        let mut file = self.load_file()?;

        if file.entries.remove(key).is_some() {
            debug!(key, "deleted secret");
        }

        self.save_file(&file)
    }

    /// Returns the first stored key matching `prefix`, or `None` if the
    /// store is empty or nothing matches.
    ///
    /// The match is ASCII case-insensitive and keys are scanned in sorted
    /// order. Only the store file is needed; the master key is never
    /// loaded because values stay sealed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreFileMissing`] if the store file does not
    /// exist, or an error if the file cannot be parsed.
    pub fn find_first_key(&self, prefix: &str) -> Result<Option<String>, Error> {
        if !self.store_path.exists() {
            return Err(Error::StoreFileMissing(self.store_path.clone()));
        }
        let file = self.load_file()?;

        let needle = prefix.to_ascii_lowercase();
        let found = file
            .entries
            .keys()
            .find(|k| k.to_ascii_lowercase().starts_with(&needle))
            .cloned();
        Ok(found)
    }

    fn require_initialized(&self) -> Result<(), Error> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::StoreUninitialized)
        }
    }

    fn load_key(&self) -> Result<SecretVec<u8>, Error> {
        let bytes = Zeroizing::new(std::fs::read(&self.key_path)?);
        if bytes.len() != KEY_SIZE {
            return Err(Error::InvalidMasterKey { expected: KEY_SIZE, found: bytes.len() });
        }
        Ok(SecretVec::new(bytes.to_vec()))
    }

    fn write_key_file(&self, key_bytes: &[u8]) -> Result<(), Error> {
        std::fs::write(&self.key_path, key_bytes)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.key_path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn load_file(&self) -> Result<StoreFile, Error> {
        let contents = std::fs::read_to_string(&self.store_path)?;
        let file: StoreFile = serde_json::from_str(&contents)?;
        debug!(entries = file.entries.len(), "loaded secret store");
        Ok(file)
    }

    /// Persists the store file atomically via a temp file and rename.
    fn save_file(&self, file: &StoreFile) -> Result<(), Error> {
        let contents = serde_json::to_string_pretty(file)?;
        let temp_path = self.store_path.with_extension("tmp");
        std::fs::write(&temp_path, &contents)?;
        std::fs::rename(&temp_path, &self.store_path)?;
        debug!(entries = file.entries.len(), "saved secret store");
        Ok(())
    }
}

/// Encrypts one entry value; output is `hex(nonce || ciphertext)`.
///
/// The entry key is used as associated data so a ciphertext cannot be
/// replayed under a different key name.
fn seal_entry(master_key: &SecretVec<u8>, key: &str, plaintext: &str) -> Result<String, Error> {
    let cipher = ChaCha20Poly1305::new_from_slice(master_key.expose_secret())
        .map_err(|e| Error::EncryptionFailed(format!("invalid master key: {e}")))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from(nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            &nonce,
            chacha20poly1305::aead::Payload { msg: plaintext.as_bytes(), aad: key.as_bytes() },
        )
        .map_err(|e| Error::EncryptionFailed(format!("ChaCha20-Poly1305: {e}")))?;

    let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);
    Ok(hex::encode(sealed))
}

/// Decrypts one entry value produced by [`seal_entry`].
fn open_entry(master_key: &SecretVec<u8>, key: &str, sealed: &str) -> Result<String, Error> {
    let raw = hex::decode(sealed).map_err(|e| Error::MalformedEntry {
        key: key.to_string(),
        reason: format!("not valid hex: {e}"),
    })?;
    if raw.len() < NONCE_SIZE {
        return Err(Error::MalformedEntry {
            key: key.to_string(),
            reason: "too short to hold a nonce".to_string(),
        });
    }

    let cipher = ChaCha20Poly1305::new_from_slice(master_key.expose_secret())
        .map_err(|e| Error::EncryptionFailed(format!("invalid master key: {e}")))?;

    let nonce_bytes: [u8; NONCE_SIZE] = raw[..NONCE_SIZE]
        .try_into()
        .map_err(|_| Error::MalformedEntry {
            key: key.to_string(),
            reason: "invalid nonce".to_string(),
        })?;
    let nonce = Nonce::from(nonce_bytes);

    let plaintext = cipher
        .decrypt(
            &nonce,
            chacha20poly1305::aead::Payload { msg: &raw[NONCE_SIZE..], aad: key.as_bytes() },
        )
        .map_err(|_| Error::AuthenticationFailed(key.to_string()))?;

    String::from_utf8(plaintext).map_err(|_| Error::MalformedEntry {
        key: key.to_string(),
        reason: "plaintext is not valid UTF-8".to_string(),
    })
}
