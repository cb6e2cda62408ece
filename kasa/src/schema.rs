//! Field selection and schema binding.
//!
//! A [`SecretSchema`] is an explicit list of a configuration type's
//! sensitive fields, each bound by name and accessor. Encryption and
//! decryption walk the list and apply a [`FieldCipher`] per field, so
//! store side effects happen in the caller's control flow rather than
//! inside a serialization hook. Only string-typed fields can be bound.

use crate::error::Error;
use crate::field::FieldCipher;
use crate::store::SecretStore;

/// Accessor for one sensitive field of `C`.
enum Access<C> {
    Required(fn(&mut C) -> &mut String),
    Optional(fn(&mut C) -> &mut Option<String>),
}

/// One sensitive field descriptor: the field identifier (used as the
/// reference key prefix) plus the accessor reaching it.
struct SecretField<C> {
    name: &'static str,
    access: Access<C>,
}

/// Declares which fields of a configuration type are sensitive.
///
/// The field name doubles as the reference key prefix, so names must be
/// unique within a schema; the builder panics on a duplicate.
///
/// # Example
///
/// ```ignore
/// use kasa::schema::SecretSchema;
///
/// struct Settings {
///     github_token: String,
///     gitea_token: String,
/// }
///
/// let schema = SecretSchema::new()
///     .field("github_token", |s: &mut Settings| &mut s.github_token)
///     .field("gitea_token", |s: &mut Settings| &mut s.gitea_token);
///
/// schema.encrypt(&store, &mut settings)?;
/// ```
pub struct SecretSchema<C> {
    fields: Vec<SecretField<C>>,
}

impl<C> SecretSchema<C> {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Binds a required string field.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already bound; each field needs a distinct
    /// reference key prefix.
    #[must_use]
    pub fn field(mut self, name: &'static str, access: fn(&mut C) -> &mut String) -> Self {
        self.assert_unique(name);
        self.fields.push(SecretField { name, access: Access::Required(access) });
        self
    }

    /// Binds an optional string field; `None` passes through untouched.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already bound.
    #[must_use]
    pub fn optional_field(
        mut self,
        name: &'static str,
        access: fn(&mut C) -> &mut Option<String>,
    ) -> Self {
        self.assert_unique(name);
        self.fields.push(SecretField { name, access: Access::Optional(access) });
        self
    }

    /// Returns the bound field names, in declaration order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Replaces every bound field's plaintext with a reference key,
    /// storing the real values in `store`.
    ///
    /// Empty and already-encrypted values pass through untouched; fresh
    /// plaintext rotates the field's stored secret. The store is mutated
    /// as a side effect.
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered; fields already
    /// processed keep their encrypted form.
    pub fn encrypt(&self, store: &SecretStore, config: &mut C) -> Result<(), Error> {
        self.transform(store, config, |cipher, value| cipher.encrypt(value))
    }

    /// Resolves every bound field's reference key back to plaintext,
    /// masking per-field failures as empty strings (reported as
    /// warnings), so one missing or corrupt secret cannot break the
    /// whole load.
    pub fn decrypt(&self, store: &SecretStore, config: &mut C) {
        let result =
            self.transform(store, config, |cipher, value| Ok(cipher.decrypt_or_empty(value)));
        debug_assert!(result.is_ok());
    }

    /// Like [`decrypt`](Self::decrypt), but propagates the first failure
    /// instead of masking it.
    ///
    /// # Errors
    ///
    /// Returns the store error for the first field that fails to
    /// resolve; earlier fields keep their decrypted form.
    pub fn decrypt_strict(&self, store: &SecretStore, config: &mut C) -> Result<(), Error> {
        self.transform(store, config, |cipher, value| cipher.decrypt(value))
    }

    fn assert_unique(&self, name: &str) {
        assert!(
            self.fields.iter().all(|f| f.name != name),
            "duplicate sensitive field name: {name}"
        );
    }

    fn transform<F>(&self, store: &SecretStore, config: &mut C, mut apply: F) -> Result<(), Error>
    where
        F: FnMut(&FieldCipher<'_>, &str) -> Result<String, Error>,
    {
        for field in &self.fields {
            let cipher = FieldCipher::new(store, field.name);
            match &field.access {
                Access::Required(access) => {
                    let slot = access(config);
                    let replaced = apply(&cipher, slot.as_str())?;
                    *slot = replaced;
                }
                Access::Optional(access) => {
                    let slot = access(config);
                    if let Some(value) = slot.as_deref() {
                        let replaced = apply(&cipher, value)?;
                        *slot = Some(replaced);
                    }
                }
            }
        }
        Ok(())
    }
}

impl<C> Default for SecretSchema<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refkey;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Settings {
        username: String,
        github_token: String,
        gitea_token: String,
        lfs_endpoint: Option<String>,
    }

    fn settings_schema() -> SecretSchema<Settings> {
        SecretSchema::new()
            .field("github_token", |s: &mut Settings| &mut s.github_token)
            .field("gitea_token", |s: &mut Settings| &mut s.gitea_token)
            .optional_field("lfs_endpoint", |s: &mut Settings| &mut s.lfs_endpoint)
    }

    fn test_store() -> (TempDir, SecretStore) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = SecretStore::in_dir(temp_dir.path());
        store.create().expect("Failed to create store");
        (temp_dir, store)
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let (_dir, store) = test_store();
        let schema = settings_schema();

        let mut settings = Settings {
            username: "alice".to_string(),
            github_token: "ghp_123".to_string(),
            gitea_token: "gta_456".to_string(),
            lfs_endpoint: Some("https://lfs.example.com".to_string()),
        };
        let original = settings.clone();

        schema.encrypt(&store, &mut settings).unwrap();
        assert_eq!(settings.username, "alice");
        assert!(refkey::is_reference("github_token", &settings.github_token));
        assert!(refkey::is_reference("gitea_token", &settings.gitea_token));
        assert!(refkey::is_reference(
            "lfs_endpoint",
            settings.lfs_endpoint.as_deref().unwrap()
        ));

        schema.decrypt(&store, &mut settings);
        assert_eq!(settings, original);
    }

    #[test]
    fn test_encrypt_twice_is_stable() {
        let (_dir, store) = test_store();
        let schema = settings_schema();

        let mut settings = Settings {
            github_token: "ghp_123".to_string(),
            ..Settings::default()
        };

        schema.encrypt(&store, &mut settings).unwrap();
        let first_pass = settings.clone();
        schema.encrypt(&store, &mut settings).unwrap();
        assert_eq!(settings, first_pass);
    }

    #[test]
    fn test_empty_and_none_pass_through() {
        let (_dir, store) = test_store();
        let schema = settings_schema();

        let mut settings = Settings::default();
        schema.encrypt(&store, &mut settings).unwrap();

        assert_eq!(settings, Settings::default());
        // Nothing was stored either.
        assert_eq!(store.find_first_key("").unwrap(), None);
    }

    #[test]
    fn test_decrypt_masks_missing_secret() {
        let (_dir, store) = test_store();
        let schema = settings_schema();

        let mut settings = Settings {
            github_token: "github_token_ENC_doesnotexist".to_string(),
            gitea_token: "gta_ref".to_string(),
            ..Settings::default()
        };
        store.set("gta_ref", "gta_456").unwrap();

        schema.decrypt(&store, &mut settings);
        assert_eq!(settings.github_token, "");
        assert_eq!(settings.gitea_token, "gta_456");
    }

    #[test]
    fn test_decrypt_strict_propagates() {
        let (_dir, store) = test_store();
        let schema = settings_schema();

        let mut settings = Settings {
            github_token: "github_token_ENC_doesnotexist".to_string(),
            ..Settings::default()
        };

        assert!(matches!(
            schema.decrypt_strict(&store, &mut settings),
            Err(Error::SecretNotFound(_))
        ));
    }

    #[test]
    #[should_panic(expected = "duplicate sensitive field name")]
    fn test_duplicate_field_name_panics() {
        let _ = SecretSchema::new()
            .field("github_token", |s: &mut Settings| &mut s.github_token)
            .field("github_token", |s: &mut Settings| &mut s.gitea_token);
    }
}
