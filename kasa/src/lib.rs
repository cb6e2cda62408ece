//! # `kasa`
//!
//! Transparent field-level encryption for configuration files.
//!
//! Sensitive fields of a configuration object are never stored in
//! plaintext: each is replaced by an opaque reference key of the form
//! `<field>_ENC_<token>`, and the real value lives in a separate
//! secret store encrypted under a master key file.
//!
//! ## Features
//!
//! - File-backed secret store (ChaCha20-Poly1305, per-entry AEAD)
//! - Master key kept in its own file, never in the configuration
//! - Idempotent encryption passes with per-field secret rotation
//! - Explicit schema binding: sensitive fields are declared, not annotated
//! - JSON document helpers for encrypt-on-write / decrypt-on-load
//!
//! ## Example
//!
//! ```rust,ignore
//! use kasa::prelude::*;
//!
//! let store = SecretStore::in_dir("./state");
//! store.create()?;
//!
//! let schema = SecretSchema::new()
//!     .field("github_token", |s: &mut Settings| &mut s.github_token);
//!
//! schema.encrypt(&store, &mut settings)?;   // plaintext -> reference keys
//! schema.decrypt(&store, &mut settings);    // reference keys -> plaintext
//! ```

#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod field;
pub mod refkey;
pub mod schema;
pub mod store;

pub mod prelude {
    //! Convenience re-exports for common use.
    pub use crate::config::{encrypt_in_place, read_decrypted, write_encrypted};
    pub use crate::error::Error;
    pub use crate::field::FieldCipher;
    pub use crate::schema::SecretSchema;
    pub use crate::store::SecretStore;
}
