#![cfg(feature = "db")]

pub mod repositories;
pub mod source;

pub use source::PgSource;

use anyhow::{bail, Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{DbConfig, OutputTables};

/// Tables a run reads from
pub const INPUT_TABLES: [&str; 5] = [
    "plantas",
    "equipos",
    "strings",
    "solcast",
    "datosMeteorologicosPlantas",
];

/// Postgres pool shared by the repositories of one run
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect, retrying with exponential backoff
    pub async fn new(config: &DbConfig) -> Result<Self> {
        let pool = Self::connect_with_retry(config, 5).await?;
        let db = Self { pool };
        db.health_check().await?;
        info!(max_connections = config.max_connections, "database pool ready");
        Ok(db)
    }

    /// Round-trip a trivial query through the pool
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }

    async fn connect_with_retry(config: &DbConfig, max_attempts: u32) -> Result<PgPool> {
        let options = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs));

        let mut delay = Duration::from_secs(1);
        for attempt in 1..=max_attempts {
            match options.clone().connect(&config.url).await {
                Ok(pool) => return Ok(pool),
                Err(e) if attempt == max_attempts => {
                    return Err(e).with_context(|| {
                        format!("Failed to connect to database after {} attempts", max_attempts)
                    });
                }
                Err(e) => {
                    warn!(attempt, max_attempts, ?delay, "database connection failed: {}", e);
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
        bail!("database connection was never attempted")
    }

    /// Fail fast when an input or configured output table is missing
    pub async fn verify_schema(&self, tables: &OutputTables) -> Result<()> {
        let output = [
            tables.plant_power.as_str(),
            tables.plant_energy.as_str(),
            tables.device_power.as_str(),
            tables.device_energy.as_str(),
        ];

        let mut missing = Vec::new();
        for table in INPUT_TABLES.iter().copied().chain(output) {
            let found: Option<String> =
                sqlx::query_scalar("SELECT to_regclass(quote_ident($1))::text")
                    .bind(table)
                    .fetch_one(&self.pool)
                    .await
                    .with_context(|| format!("Failed to look up table {}", table))?;
            if found.is_none() {
                missing.push(table);
            }
        }

        if !missing.is_empty() {
            bail!("missing tables: {}", missing.join(", "));
        }
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(self) {
        self.pool.close().await;
        info!("database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DbConfig {
        DbConfig {
            url: std::env::var("DATABASE_URL").unwrap_or_default(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 60,
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn test_health_check_after_connect() {
        let db = Database::new(&config()).await.unwrap();
        db.health_check().await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn test_health_check_fails_on_closed_pool() {
        let db = Database::new(&config()).await.unwrap();
        db.pool().close().await;
        assert!(db.health_check().await.is_err());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn test_connect_and_verify_schema() {
        let db = Database::new(&config()).await.unwrap();
        db.verify_schema(&OutputTables::default()).await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn test_unknown_output_table_is_reported() {
        let db = Database::new(&config()).await.unwrap();
        let tables = OutputTables {
            plant_power: "no_such_table".into(),
            ..OutputTables::default()
        };
        let err = db.verify_schema(&tables).await.unwrap_err();
        assert!(err.to_string().contains("no_such_table"));
        db.close().await;
    }
}
