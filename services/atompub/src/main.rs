//! esatom atompub
//!
//! Serves the event store as an RFC 5005 paged Atom feed, optionally
//! envelope-encrypting every response body.

use std::sync::Arc;

use anyhow::{Context, Result};
use esatom_envelope::{
    EnvelopeCipher, KeyService, KmsKeyService, LocalKeyService, OutputCipher, PlainOutput,
};
use esatom_feed::{FeedAssembler, FeedLinks};
use esatom_pub::{
    api,
    config::{Config, Encryption},
    state::AppState,
    store::PgEventStore,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing (prefer RUST_LOG, fallback to ATOMPUB_LOG_LEVEL)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting atompub");
    info!(
        listen_addr = %config.listen_addr,
        base_url = %config.base_url(),
        encryption = config.encryption.is_enabled(),
        "Configuration loaded"
    );

    // Connect to the event store
    let store = match PgEventStore::connect(&config.database).await {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "Failed to connect to event store");
            return Err(e.into());
        }
    };

    // Output cipher; refuse to start if the key service cannot issue keys
    let cipher = build_cipher(&config.encryption)?;
    if let Err(e) = cipher.check().await {
        error!(error = %e, "Key service check failed");
        return Err(e).context("key service is not usable");
    }

    let assembler = FeedAssembler::new(FeedLinks::new(&config.link_proto, &config.linkhost));
    let state = AppState::new(Arc::new(store), assembler, cipher);
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Received shutdown signal");
        })
        .await?;

    info!("atompub shutdown complete");
    Ok(())
}

fn build_cipher(encryption: &Encryption) -> Result<Arc<dyn OutputCipher>> {
    let (key_alias, keys): (&str, Arc<dyn KeyService>) = match encryption {
        Encryption::Disabled => {
            info!("Output encryption disabled");
            return Ok(Arc::new(PlainOutput));
        }
        Encryption::Kms {
            key_alias,
            endpoint,
        } => {
            info!(key_alias = %key_alias, endpoint = %endpoint, "Using KMS key service");
            let kms = KmsKeyService::new(endpoint.as_str())
                .context("failed to create KMS client")?;
            (key_alias, Arc::new(kms))
        }
        Encryption::Local {
            key_alias,
            master_key,
        } => {
            let local = LocalKeyService::from_base64(master_key)
                .context("ATOMPUB_MASTER_KEY is not a base64 256-bit key")?;
            info!(key_alias = %key_alias, key_id = %local.key_id(), "Using local key service");
            (key_alias, Arc::new(local))
        }
    };

    Ok(Arc::new(EnvelopeCipher::new(key_alias, keys)))
}
