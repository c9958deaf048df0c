use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use sqlx::PgPool;
use tracing::debug;

use crate::domain::{IrradianceSample, MeteoSample};

/// Repository for satellite irradiance and ground weather history
pub struct IrradianceRepository {
    pool: PgPool,
}

impl IrradianceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Oldest irradiance timestamp of a plant
    pub async fn first_period_end(&self, plant_name: &str) -> Result<Option<NaiveDateTime>> {
        let first = sqlx::query_scalar::<_, NaiveDateTime>(
            r#"
            SELECT s.period_end
            FROM solcast s
            JOIN plantas p ON p.id = s.id_planta
            WHERE p.nombre = $1
            ORDER BY s.period_end ASC
            LIMIT 1
            "#,
        )
        .bind(plant_name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch first irradiance record")?;

        Ok(first)
    }

    pub async fn find_range(
        &self,
        plant_name: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<IrradianceSample>> {
        let samples = sqlx::query_as::<_, IrradianceSample>(
            r#"
            SELECT s.period_end,
                   s.ghi::float8 AS ghi,
                   s.dni::float8 AS dni,
                   s.dhi::float8 AS dhi
            FROM solcast s
            JOIN plantas p ON p.id = s.id_planta
            WHERE p.nombre = $1
              AND s.period_end >= $2
              AND s.period_end <= $3
              AND s.ghi IS NOT NULL AND s.dni IS NOT NULL AND s.dhi IS NOT NULL
            ORDER BY s.period_end ASC
            "#,
        )
        .bind(plant_name)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch irradiance records in range")?;

        debug!(
            "Found {} irradiance records between {} and {} for plant {}",
            samples.len(),
            start,
            end,
            plant_name
        );
        Ok(samples)
    }

    pub async fn find_meteo_range(
        &self,
        plant_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<MeteoSample>> {
        let samples = sqlx::query_as::<_, MeteoSample>(
            r#"
            SELECT fecha AS timestamp,
                   temperature::float8 AS air_temp,
                   wind_speed::float8 AS wind_speed
            FROM "datosMeteorologicosPlantas"
            WHERE id_planta = $1
              AND fecha >= $2
              AND fecha <= $3
              AND temperature IS NOT NULL AND wind_speed IS NOT NULL
            ORDER BY fecha ASC
            "#,
        )
        .bind(plant_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch meteo records in range")?;

        debug!("Found {} meteo records for plant {}", samples.len(), plant_id);
        Ok(samples)
    }
}
