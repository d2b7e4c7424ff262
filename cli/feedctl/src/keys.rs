//! Key service selection.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use esatom_envelope::{KeyService, KmsKeyService, LocalKeyService};

use crate::error::CliError;

/// Where to unwrap data keys.
#[derive(Debug, Clone, Default, Args)]
pub struct KeyArgs {
    /// Base URL of a KMS-compatible key service.
    #[arg(long, global = true, env = "KMS_ENDPOINT")]
    pub kms_endpoint: Option<String>,

    /// Base64 256-bit master key for local decryption.
    #[arg(long, global = true, env = "ATOMPUB_MASTER_KEY", hide_env_values = true)]
    pub master_key: Option<String>,
}

impl KeyArgs {
    /// The configured key service, KMS first.
    pub fn key_service(&self) -> Result<Arc<dyn KeyService>> {
        if let Some(endpoint) = self.kms_endpoint.as_deref().filter(|e| !e.is_empty()) {
            let kms = KmsKeyService::new(endpoint).context("failed to create KMS client")?;
            return Ok(Arc::new(kms));
        }

        if let Some(master_key) = self.master_key.as_deref().filter(|k| !k.is_empty()) {
            let local =
                LocalKeyService::from_base64(master_key).context("invalid master key")?;
            return Ok(Arc::new(local));
        }

        Err(CliError::NoKeyService.into())
    }
}
