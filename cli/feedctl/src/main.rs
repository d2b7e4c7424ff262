//! feedctl - client for the esatom Atom feed
//!
//! Fetches feed pages and single events and, when the service encrypts its
//! output, unwraps the envelope through the key service.

use anyhow::Result;
use clap::Parser;

mod commands;
mod error;
mod keys;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = cli.run().await {
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
