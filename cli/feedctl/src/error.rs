//! Error handling and display for the CLI.

use colored::Colorize;
use esatom_envelope::EnvelopeError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Response is encrypted but no key service is configured")]
    NoKeyService,

    #[error("Request failed with status {status}")]
    Http { status: u16 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Decryption failed: {0}")]
    Envelope(#[from] EnvelopeError),
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        match cli_err {
            CliError::NoKeyService => {
                eprintln!(
                    "\n{}",
                    "Hint: Set KMS_ENDPOINT or ATOMPUB_MASTER_KEY (or pass --kms-endpoint / --master-key)."
                        .yellow()
                );
            }
            CliError::Http { status: 404 } => {
                eprintln!(
                    "\n{}",
                    "Hint: Unknown page or event. Archive page ids come from prev-archive links."
                        .yellow()
                );
            }
            CliError::Network(_) => {
                eprintln!(
                    "\n{}",
                    "Hint: Check your network connection and the feed URL.".yellow()
                );
            }
            CliError::Envelope(EnvelopeError::UnknownMasterKey(_)) => {
                eprintln!(
                    "\n{}",
                    "Hint: The response was encrypted under a different master key.".yellow()
                );
            }
            _ => {}
        }
    }
}
