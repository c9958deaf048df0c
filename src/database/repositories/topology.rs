use anyhow::{Context, Result};
use sqlx::{FromRow, PgPool};
use tracing::debug;

use crate::domain::{Device, MountingType, Plant, StringSpec};

/// String row as stored; converted into a `StringSpec` after loading
#[derive(Debug, Clone, FromRow)]
pub struct StringRow {
    pub plant_name: String,
    pub serial: String,
    pub tilt_deg: f64,
    pub azimuth_deg: f64,
    pub module_model: Option<String>,
    pub module_count: i64,
    pub mounting: Option<String>,
}

impl From<StringRow> for StringSpec {
    fn from(row: StringRow) -> Self {
        StringSpec {
            plant_name: row.plant_name,
            serial: row.serial,
            tilt_deg: row.tilt_deg,
            azimuth_deg: row.azimuth_deg,
            module_model: row
                .module_model
                .unwrap_or_else(|| crate::domain::NOT_ASSIGNED.to_string()),
            module_count: u32::try_from(row.module_count.max(0)).unwrap_or(u32::MAX),
            mounting: MountingType::parse_lenient(row.mounting.as_deref().unwrap_or_default()),
        }
    }
}

/// Repository for plant, inverter and string reference data
pub struct TopologyRepository {
    pool: PgPool,
}

impl TopologyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Plants with a location, ordered by name
    pub async fn plants(&self) -> Result<Vec<Plant>> {
        let plants = sqlx::query_as::<_, Plant>(
            r#"
            SELECT id::int8 AS id,
                   nombre AS name,
                   latitud::float8 AS latitude,
                   longitud::float8 AS longitude
            FROM plantas
            WHERE latitud IS NOT NULL AND longitud IS NOT NULL
            ORDER BY nombre ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch plants")?;

        debug!("Found {} plants with location", plants.len());
        Ok(plants)
    }

    pub async fn devices(&self) -> Result<Vec<Device>> {
        let devices = sqlx::query_as::<_, Device>(
            r#"
            SELECT e.id::int8 AS device_id,
                   e."numeroSerie" AS serial,
                   p.nombre AS plant_name,
                   COALESCE(e.potencia_ac, 0)::float8 AS ac_power_w,
                   e."modeloCecInversor" AS inverter_model
            FROM equipos e
            JOIN plantas p ON p.id = e.id_planta
            ORDER BY p.nombre ASC, e.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch devices")?;

        debug!("Found {} devices", devices.len());
        Ok(devices)
    }

    pub async fn strings(&self) -> Result<Vec<StringSpec>> {
        let rows = sqlx::query_as::<_, StringRow>(
            r#"
            SELECT p.nombre AS plant_name,
                   e."numeroSerie" AS serial,
                   s.inclinacion::float8 AS tilt_deg,
                   s.azimuth::float8 AS azimuth_deg,
                   s."modeloCecPanel" AS module_model,
                   s.cantidad::int8 AS module_count,
                   s.montaje AS mounting
            FROM strings s
            JOIN equipos e ON e.id = s.id_equipo
            JOIN plantas p ON p.id = e.id_planta
            ORDER BY p.nombre ASC, e.id ASC, s.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch strings")?;

        debug!("Found {} strings", rows.len());
        Ok(rows.into_iter().map(StringSpec::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NOT_ASSIGNED;

    #[test]
    fn test_string_row_conversion() {
        let row = StringRow {
            plant_name: "TRES SOLES".into(),
            serial: "SN-7".into(),
            tilt_deg: 15.0,
            azimuth_deg: 10.0,
            module_model: None,
            module_count: 22,
            mounting: Some("Rooftop".into()),
        };
        let spec = StringSpec::from(row);
        assert_eq!(spec.module_model, NOT_ASSIGNED);
        assert_eq!(spec.module_count, 22);
        assert_eq!(spec.mounting, MountingType::Rooftop);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn test_topology_queries() {
        let pool = PgPool::connect(&std::env::var("DATABASE_URL").unwrap_or_default())
            .await
            .unwrap();
        let repo = TopologyRepository::new(pool);
        repo.plants().await.unwrap();
        repo.devices().await.unwrap();
        repo.strings().await.unwrap();
    }
}
