//! Postgres-backed event store reader.
//!
//! Reads the tables maintained by the feed writer:
//! - `atom_event(aggregate_id, version, typecode, payload, event_time, feedid)`
//!   where `feedid` is null until the event is assigned to a page
//! - `feed(id, feedid, previous)` with one row per archive page, `id`
//!   increasing as pages are created

use std::time::Duration;

use async_trait::async_trait;
use esatom_feed::{EventRecord, Payload};
use sqlx::{
    postgres::{PgPool, PgPoolOptions, PgRow},
    Column, Row, TypeInfo,
};
use tracing::{debug, info};

use super::{EventStoreGateway, PageLookup, StoreError};

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database connection URL.
    pub database_url: String,

    /// Maximum number of connections in the pool.
    pub max_connections: u32,

    /// Minimum number of idle connections.
    pub min_connections: u32,

    /// Connection acquire timeout.
    pub acquire_timeout: Duration,

    /// Idle connection timeout.
    pub idle_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/esatom".to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl DbConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| defaults.database_url.clone());

        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_connections);

        let min_connections = std::env::var("DB_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.min_connections);

        Self {
            database_url,
            max_connections,
            min_connections,
            ..defaults
        }
    }
}

const EVENT_COLUMNS: &str =
    "event_time, aggregate_id, version::bigint AS version, typecode, payload";

/// Event store reader over a Postgres pool.
#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    /// Connect a new pool.
    pub async fn connect(config: &DbConfig) -> Result<Self, StoreError> {
        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to event store"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect(&config.database_url)
            .await
            .map_err(StoreError::Connect)?;

        info!("Event store connection pool established");

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_events(
        &self,
        filter: &str,
        bind: Option<&str>,
    ) -> Result<Vec<EventRecord>, StoreError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM atom_event WHERE {filter} \
             ORDER BY event_time, aggregate_id, version"
        );
        let mut query = sqlx::query(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(StoreError::Query)?;
        rows.iter()
            .map(event_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::Query)
    }
}

fn event_from_row(row: &PgRow) -> Result<EventRecord, sqlx::Error> {
    Ok(EventRecord {
        aggregate_id: row.try_get("aggregate_id")?,
        version: row.try_get("version")?,
        type_code: row.try_get("typecode")?,
        payload: payload_from_row(row)?,
        occurred_at: row.try_get("event_time")?,
    })
}

/// Decode the payload column. Anything other than `bytea` is kept as
/// [`Payload::Unsupported`] so the feed can refuse it.
fn payload_from_row(row: &PgRow) -> Result<Payload, sqlx::Error> {
    match row.try_get::<Option<Vec<u8>>, _>("payload") {
        Ok(Some(bytes)) => Ok(Payload::Bytes(bytes)),
        Ok(None) => Ok(Payload::Unsupported("null".to_string())),
        Err(sqlx::Error::ColumnDecode { .. }) => {
            let kind = row
                .try_column("payload")
                .map(|column| column.type_info().name().to_lowercase())
                .unwrap_or_else(|_| "unknown".to_string());
            Ok(Payload::Unsupported(kind))
        }
        Err(e) => Err(e),
    }
}

#[async_trait]
impl EventStoreGateway for PgEventStore {
    async fn fetch_recent_events(&self) -> Result<Vec<EventRecord>, StoreError> {
        let events = self.fetch_events("feedid IS NULL", None).await?;
        debug!(count = events.len(), "Fetched recent events");
        Ok(events)
    }

    async fn fetch_last_page_id(&self) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT feedid FROM feed ORDER BY id DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::Query)?;

        row.map(|row| row.try_get::<String, _>("feedid"))
            .transpose()
            .map_err(StoreError::Query)
    }

    async fn fetch_page_events(&self, page_id: &str) -> Result<PageLookup, StoreError> {
        let events = self.fetch_events("feedid = $1", Some(page_id)).await?;
        debug!(page_id = %page_id, count = events.len(), "Fetched page events");
        Ok(PageLookup::from_rows(events))
    }

    async fn fetch_previous_page_id(&self, page_id: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT previous FROM feed WHERE feedid = $1")
            .bind(page_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::Query)?;

        Ok(row
            .map(|row| row.try_get::<Option<String>, _>("previous"))
            .transpose()
            .map_err(StoreError::Query)?
            .flatten()
            .filter(|id| !id.is_empty()))
    }

    async fn fetch_next_page_id(&self, page_id: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT feedid FROM feed WHERE previous = $1")
            .bind(page_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::Query)?;

        Ok(row
            .map(|row| row.try_get::<Option<String>, _>("feedid"))
            .transpose()
            .map_err(StoreError::Query)?
            .flatten()
            .filter(|id| !id.is_empty()))
    }

    async fn fetch_event(
        &self,
        aggregate_id: &str,
        version: i64,
    ) -> Result<EventRecord, StoreError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM atom_event WHERE aggregate_id = $1 AND version = $2"
        );
        let row = sqlx::query(&sql)
            .bind(aggregate_id)
            .bind(version)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::Query)?
            .ok_or_else(|| StoreError::NotFound {
                aggregate_id: aggregate_id.to_string(),
                version,
            })?;

        event_from_row(&row).map_err(StoreError::Query)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(StoreError::Query)?;
        Ok(())
    }
}
