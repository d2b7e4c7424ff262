use std::net::SocketAddr;

use anyhow::{bail, Context, Result};

use crate::store::DbConfig;

/// Where output encryption gets its data keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encryption {
    /// No key alias configured; responses are sent as plain XML.
    Disabled,

    /// Remote KMS-compatible key service.
    Kms { key_alias: String, endpoint: String },

    /// Local master key, base64 encoded.
    Local {
        key_alias: String,
        master_key: String,
    },
}

impl Encryption {
    fn from_parts(
        key_alias: Option<String>,
        kms_endpoint: Option<String>,
        master_key: Option<String>,
    ) -> Result<Self> {
        let Some(alias) = key_alias else {
            return Ok(Encryption::Disabled);
        };
        let key_alias = esatom_envelope::key_alias(&alias);

        match (kms_endpoint, master_key) {
            (Some(endpoint), _) => Ok(Encryption::Kms {
                key_alias,
                endpoint,
            }),
            (None, Some(master_key)) => Ok(Encryption::Local {
                key_alias,
                master_key,
            }),
            (None, None) => {
                bail!("KEY_ALIAS is set but neither KMS_ENDPOINT nor ATOMPUB_MASTER_KEY is")
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Encryption::Disabled)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub link_proto: String,
    pub linkhost: String,
    pub log_level: String,
    pub database: DbConfig,
    pub encryption: Encryption,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let listen_addr = std::env::var("ATOMPUB_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8000".to_string())
            .parse()
            .context("ATOMPUB_LISTEN_ADDR is not a socket address")?;

        let linkhost = non_empty_var("LINKHOST").context("LINKHOST must be set")?;

        let link_proto = non_empty_var("LINK_PROTO").unwrap_or_else(|| "https".to_string());
        if link_proto != "http" && link_proto != "https" {
            bail!("LINK_PROTO must be http or https, got {link_proto}");
        }

        let log_level =
            std::env::var("ATOMPUB_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let database = DbConfig::from_env();

        let encryption = Encryption::from_parts(
            non_empty_var("KEY_ALIAS"),
            non_empty_var("KMS_ENDPOINT"),
            non_empty_var("ATOMPUB_MASTER_KEY"),
        )?;

        Ok(Self {
            listen_addr,
            link_proto,
            linkhost,
            log_level,
            database,
            encryption,
        })
    }

    /// `{link_proto}://{linkhost}`, the prefix of every link href.
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.link_proto, self.linkhost)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encryption_disabled_without_alias() {
        let encryption =
            Encryption::from_parts(None, Some("http://kms".into()), None).unwrap();
        assert_eq!(encryption, Encryption::Disabled);
        assert!(!encryption.is_enabled());
    }

    #[test]
    fn test_kms_preferred_over_master_key() {
        let encryption = Encryption::from_parts(
            Some("feed".into()),
            Some("http://kms".into()),
            Some("a2V5".into()),
        )
        .unwrap();
        assert_eq!(
            encryption,
            Encryption::Kms {
                key_alias: "alias/feed".into(),
                endpoint: "http://kms".into(),
            }
        );
    }

    #[test]
    fn test_local_master_key() {
        let encryption =
            Encryption::from_parts(Some("feed".into()), None, Some("a2V5".into())).unwrap();
        assert!(matches!(encryption, Encryption::Local { ref key_alias, .. } if key_alias == "alias/feed"));
    }

    #[test]
    fn test_alias_without_key_source_is_error() {
        assert!(Encryption::from_parts(Some("feed".into()), None, None).is_err());
    }
}
