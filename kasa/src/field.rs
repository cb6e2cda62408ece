//! Per-field encrypting and decrypting transform.
//!
//! A [`FieldCipher`] is bound to one sensitive field and an explicit
//! store handle. Encrypting replaces the field's plaintext with a fresh
//! reference key and stores the real value; decrypting resolves a
//! reference key back to plaintext. The transform itself owns no state
//! beyond the binding.
//!
//! Encryption is idempotent at the output level (an already-encrypted
//! value passes through untouched) but not at the store level: a fresh
//! plaintext triggers rotation, deleting the previously stored secret
//! for this field before storing the new one. At most one live secret
//! exists per field at any time.

use crate::error::Error;
use crate::refkey;
use crate::store::SecretStore;
use tracing::warn;

/// Encrypting/decrypting transform bound to one field of a configuration
/// object.
///
/// # Example
///
/// ```ignore
/// use kasa::field::FieldCipher;
/// use kasa::store::SecretStore;
///
/// let store = SecretStore::in_dir("./state");
/// store.create()?;
///
/// let cipher = FieldCipher::new(&store, "GithubToken");
/// let reference = cipher.encrypt("ghp_123")?;
/// assert_eq!(cipher.decrypt(&reference)?, "ghp_123");
/// ```
pub struct FieldCipher<'a> {
    store: &'a SecretStore,
    field: &'a str,
}

impl<'a> FieldCipher<'a> {
    /// Binds a transform to a field identifier, which doubles as the
    /// reference key prefix.
    #[must_use]
    pub fn new(store: &'a SecretStore, field: &'a str) -> Self {
        Self { store, field }
    }

    /// Returns the bound field identifier.
    #[must_use]
    pub fn field(&self) -> &str {
        self.field
    }

    /// Encrypts `value`, returning the reference key to serialize in its
    /// place.
    ///
    /// - An empty value passes through untouched, with no store access.
    /// - A value already carrying this field's reference marker passes
    ///   through untouched, with no store access.
    /// - Otherwise the previously stored secret for this field (if any)
    ///   is deleted, and `value` is stored under a fresh reference key.
    ///
    /// # Errors
    ///
    /// Returns an error if any store operation fails, including
    /// [`Error::StoreFileMissing`] or [`Error::StoreUninitialized`] when
    /// the store has not been created.
    pub fn encrypt(&self, value: &str) -> Result<String, Error> {
        if value.is_empty() {
            return Ok(String::new());
        }
        if refkey::is_reference(self.field, value) {
            return Ok(value.to_string());
        }

        // Rotation: discard the previous secret for this field.
        if let Some(previous) = self.store.find_first_key(self.field)? {
            self.store.delete(&previous)?;
        }

        let reference = refkey::generate(self.field);
        self.store.set(&reference, value)?;
        Ok(reference)
    }

    /// Decrypts a serialized value back to plaintext.
    ///
    /// An empty value passes through untouched with no store access;
    /// anything else is treated as a reference key and looked up.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SecretNotFound`], [`Error::StoreUninitialized`]
    /// or [`Error::SecretValueInvalid`] as surfaced by the store, letting
    /// the caller distinguish a missing secret from an unavailable store
    /// from a corrupt value.
    pub fn decrypt(&self, stored: &str) -> Result<String, Error> {
        if stored.is_empty() {
            return Ok(String::new());
        }
        self.store.get(stored)
    }

    /// Decrypts like [`decrypt`](Self::decrypt), but masks every failure
    /// as an empty string so one missing or corrupt secret cannot break
    /// an entire configuration load. Each masked failure is reported as a
    /// warning.
    #[must_use]
    pub fn decrypt_or_empty(&self, stored: &str) -> String {
        match self.decrypt(stored) {
            Ok(plaintext) => plaintext,
            Err(err) => {
                warn!(field = self.field, %err, "failed to resolve secret; substituting empty value");
                String::new()
            }
        }
    }
}
