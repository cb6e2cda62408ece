//! `kasa` CLI for encrypted settings files.

#![warn(clippy::pedantic, clippy::nursery)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use kasa::prelude::*;
use std::path::PathBuf;

mod settings;

use settings::{settings_schema, Settings};

#[derive(Parser)]
#[command(name = "kasa")]
#[command(about = "Encrypted settings file management", long_about = None)]
struct Cli {
    /// Directory holding the secret store and master key files
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Settings file to operate on
    #[arg(short, long, default_value = "settings.json")]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the secret store and, if missing, a default settings file
    Init,
    /// Encrypt the sensitive fields of the settings file in place
    Encrypt,
    /// Print the settings with sensitive fields resolved to plaintext
    Show,
    /// Delete a stored secret by its reference key
    Delete {
        /// Reference key, e.g. github_token_ENC_<token>
        key: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let store = SecretStore::in_dir(&cli.dir);
    let schema = settings_schema();

    match cli.command {
        Commands::Init => {
            store.create().context("failed to initialize the secret store")?;
            println!("Secret store ready at {}", store.store_path().display());

            if cli.file.exists() {
                println!("Settings file {} already exists", cli.file.display());
            } else {
                let defaults = serde_json::to_string_pretty(&Settings::default())?;
                std::fs::write(&cli.file, defaults)
                    .with_context(|| format!("failed to write {}", cli.file.display()))?;
                println!(
                    "Created {}; fill in your tokens and run `kasa encrypt`",
                    cli.file.display()
                );
            }
        }
        Commands::Encrypt => {
            if !store.is_initialized() {
                bail!("secret store is not initialized; run `kasa init` first");
            }
            encrypt_in_place(&cli.file, &schema, &store)
                .with_context(|| format!("failed to encrypt {}", cli.file.display()))?;
            println!("Encrypted {}", cli.file.display());
        }
        Commands::Show => {
            let settings: Settings = read_decrypted(&cli.file, &schema, &store)
                .with_context(|| format!("failed to load {}", cli.file.display()))?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Commands::Delete { key } => {
            store
                .delete(&key)
                .with_context(|| format!("failed to delete secret '{key}'"))?;
            println!("Deleted {key}");
        }
    }

    Ok(())
}
