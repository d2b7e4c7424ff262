//! `feedctl decrypt`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::AsyncReadExt;

use super::reveal;
use crate::keys::KeyArgs;

#[derive(Debug, Args)]
pub struct DecryptCommand {
    /// File holding the envelope; reads stdin when omitted.
    file: Option<PathBuf>,
}

impl DecryptCommand {
    pub async fn run(&self, keys: &KeyArgs) -> Result<()> {
        let blob = match &self.file {
            Some(path) => tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?,
            None => {
                let mut buf = Vec::new();
                tokio::io::stdin()
                    .read_to_end(&mut buf)
                    .await
                    .context("failed to read stdin")?;
                buf
            }
        };

        let plaintext = reveal(blob, true, keys).await?;
        println!("{}", String::from_utf8_lossy(&plaintext));
        Ok(())
    }
}
