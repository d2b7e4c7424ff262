//! CLI commands.

mod decrypt;
mod get;

use anyhow::Result;
use clap::{Parser, Subcommand};
use esatom_envelope::{decrypt, looks_like_envelope};

use crate::error::CliError;
use crate::keys::KeyArgs;

/// feedctl - read the esatom event feed.
#[derive(Debug, Parser)]
#[command(name = "feedctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    keys: KeyArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch a feed page or event and print it.
    Get(get::GetCommand),

    /// Decrypt an envelope read from a file or stdin.
    Decrypt(decrypt::DecryptCommand),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Get(cmd) => cmd.run(&self.keys).await,
            Commands::Decrypt(cmd) => cmd.run(&self.keys).await,
        }
    }
}

/// Plaintext of `body`: decrypted when forced or when it is an envelope,
/// otherwise returned as is.
async fn reveal(body: Vec<u8>, force: bool, keys: &KeyArgs) -> Result<Vec<u8>> {
    if !force && !looks_like_envelope(&body) {
        return Ok(body);
    }

    let service = keys.key_service()?;
    let plaintext = decrypt(&body, service.as_ref())
        .await
        .map_err(CliError::from)?;
    Ok(plaintext)
}
