//! Basic usage example for `kasa`.

use kasa::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Settings {
    github_username: String,
    github_token: String,
    gitea_url: String,
    gitea_token: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("kasa Basic Usage Example");
    println!("========================\n");

    // Setup: a state directory for the secret store and settings file
    let state_dir = PathBuf::from("./example_state");
    std::fs::create_dir_all(&state_dir)?;

    let store = SecretStore::in_dir(&state_dir);
    store.create()?;
    println!("✓ Secret store at {:?}\n", store.store_path());

    // Declare which fields are sensitive
    let schema = SecretSchema::new()
        .field("github_token", |s: &mut Settings| &mut s.github_token)
        .field("gitea_token", |s: &mut Settings| &mut s.gitea_token);

    let settings = Settings {
        github_username: "alice".to_string(),
        github_token: "ghp_example_token".to_string(),
        gitea_url: "https://gitea.example.com".to_string(),
        gitea_token: "gta_example_token".to_string(),
    };

    // Write the settings file with tokens replaced by reference keys
    let settings_path = state_dir.join("settings.json");
    write_encrypted(&settings_path, &schema, &store, &settings)?;
    println!("✓ Wrote encrypted settings to {settings_path:?}");

    let on_disk = std::fs::read_to_string(&settings_path)?;
    assert!(!on_disk.contains("ghp_example_token"));
    println!("✓ No plaintext token in the file:\n{on_disk}");

    // Load it back; tokens are resolved to plaintext in memory only
    let loaded: Settings = read_decrypted(&settings_path, &schema, &store)?;
    assert_eq!(loaded.github_token, settings.github_token);
    println!("✓ Round-trip successful for {}\n", loaded.github_username);

    // A second encryption pass is idempotent at the document level
    encrypt_in_place(&settings_path, &schema, &store)?;
    let second = std::fs::read_to_string(&settings_path)?;
    assert_eq!(on_disk, second);
    println!("✓ Re-encryption left the document unchanged");

    println!("\nNote: state directory at {state_dir:?} can be deleted manually");

    Ok(())
}
