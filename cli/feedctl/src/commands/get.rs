//! `feedctl get`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use esatom_feed::FeedDocument;

use super::reveal;
use crate::error::CliError;
use crate::keys::KeyArgs;

#[derive(Debug, Args)]
pub struct GetCommand {
    /// Feed page or event URL.
    url: String,

    /// Decrypt the body even if it does not look like an envelope.
    #[arg(long)]
    decrypt: bool,

    /// Print the feed's links and entry ids instead of the raw document.
    #[arg(long)]
    links: bool,
}

impl GetCommand {
    pub async fn run(&self, keys: &KeyArgs) -> Result<()> {
        let client = reqwest::Client::new();
        let body = fetch(&client, &self.url).await?;
        let plaintext = reveal(body, self.decrypt, keys).await?;
        let text = String::from_utf8(plaintext).context("response is not UTF-8")?;

        if self.links {
            let feed = FeedDocument::from_xml(&text).context("response is not a feed")?;
            print_links(&feed);
        } else {
            println!("{text}");
        }

        Ok(())
    }
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, CliError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Http {
            status: status.as_u16(),
        });
    }
    Ok(response.bytes().await?.to_vec())
}

fn print_links(feed: &FeedDocument) {
    println!("{} {}", "feed".bold(), feed.id);
    for link in &feed.links {
        println!("  {:<14} {}", link.rel.cyan(), link.href);
    }
    println!("{} {}", "entries".bold(), feed.entries.len());
    for entry in &feed.entries {
        println!("  {}  {}", entry.id, entry.content.content_type.dimmed());
    }
}
