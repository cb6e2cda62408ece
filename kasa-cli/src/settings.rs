//! Settings file model for the sync tool configuration.
//!
//! Token fields are declared sensitive in [`settings_schema`]; everything
//! else round-trips through the file untouched.

use kasa::schema::SecretSchema;
use serde::{Deserialize, Serialize};

/// Top-level settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub github: GithubExportSettings,
    pub gitea: GiteaSyncSettings,
    /// Seconds to wait between repository imports.
    pub import_delay: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            github: GithubExportSettings::default(),
            gitea: GiteaSyncSettings::default(),
            import_delay: 2.5,
        }
    }
}

/// What to export from GitHub and with which credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubExportSettings {
    pub username: String,
    /// Personal access token; stored encrypted.
    pub token: String,
    pub mirror: bool,
    pub migrate_lfs: bool,
    pub lfs_endpoint: Option<String>,
    pub wiki: bool,
    pub labels: bool,
    pub issues: bool,
    pub pull_requests: bool,
    pub releases: bool,
    pub milestones: bool,
}

/// Where and how to import on the Gitea side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GiteaSyncSettings {
    pub url: String,
    pub username: String,
    /// API token; stored encrypted.
    pub token: String,
    pub owner: String,
    pub owner_is_org: bool,
    pub private: bool,
}

/// Sensitive-field schema for [`Settings`].
pub fn settings_schema() -> SecretSchema<Settings> {
    SecretSchema::new()
        .field("github_token", |s: &mut Settings| &mut s.github.token)
        .field("gitea_token", |s: &mut Settings| &mut s.gitea.token)
}
