//! Error types for `kasa` operations.

use std::path::PathBuf;

/// Main error type for `kasa` operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The master key file or the store file is missing
    #[error("secret store is not initialized: master key file or store file is missing")]
    StoreUninitialized,

    /// The store file is missing (prefix search only needs the store file)
    #[error("store file not found: {}", .0.display())]
    StoreFileMissing(PathBuf),

    /// The requested key is not present in the store
    #[error("secret not found: {0}")]
    SecretNotFound(String),

    /// The record exists but decrypts to an empty payload
    #[error("secret '{0}' is present but its value is empty")]
    SecretValueInvalid(String),

    /// The master key file does not contain valid key material
    #[error("invalid master key: expected {expected} bytes, found {found}")]
    InvalidMasterKey {
        /// Required key length in bytes
        expected: usize,
        /// Length actually read from the key file
        found: usize,
    },

    /// Encryption operation failed
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Authentication tag verification failed (entry may be corrupted or tampered)
    #[error("authentication failed: entry '{0}' may be corrupted or tampered")]
    AuthenticationFailed(String),

    /// Store entry is not valid hex or is too short to hold a nonce
    #[error("malformed store entry '{key}': {reason}")]
    MalformedEntry {
        /// Key of the offending entry
        key: String,
        /// What was wrong with it
        reason: String,
    },

    /// Store file or configuration document parsing failed
    #[error("invalid document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
