use anyhow::{Context, Result};
use sqlx::query_builder::Separated;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};

use crate::config::OutputTables;
use crate::domain::{
    format_date, format_timestamp, DeviceEnergyRecord, DevicePowerRecord, PlantEnergyRecord,
    PlantPowerRecord, DEVICE_ENERGY_COLUMNS, DEVICE_POWER_COLUMNS, PLANT_ENERGY_COLUMNS,
    PLANT_POWER_COLUMNS,
};

/// Rows per INSERT statement, well below the bind parameter limit
const CHUNK_SIZE: usize = 1000;

/// Quote an identifier for use in generated SQL
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn insert_prefix(table: &str, columns: &[&str]) -> String {
    let columns = columns.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", ");
    format!("INSERT INTO {} ({}) ", quote_ident(table), columns)
}

/// Repository for the theoretical production report tables
pub struct TheoreticalRepository {
    pool: PgPool,
    tables: OutputTables,
}

impl TheoreticalRepository {
    pub fn new(pool: PgPool, tables: OutputTables) -> Self {
        Self { pool, tables }
    }

    /// Insert all rows into one table inside a single transaction
    async fn insert_rows<T, F>(&self, table: &str, columns: &[&str], rows: &[T], mut bind: F) -> Result<()>
    where
        T: Sync,
        F: FnMut(&mut Separated<'_, 'static, Postgres, &'static str>, &T) + Send,
    {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.context("Failed to start transaction")?;

        for chunk in rows.chunks(CHUNK_SIZE) {
            let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new(insert_prefix(table, columns));
            qb.push_values(chunk, |mut b, row| bind(&mut b, row));
            qb.build()
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to insert rows into {}", table))?;
            debug!("Inserted {} rows into {}", chunk.len(), table);
        }

        tx.commit().await.context("Failed to commit transaction")?;

        info!("Inserted {} rows into {}", rows.len(), table);
        Ok(())
    }

    pub async fn insert_plant_power(&self, records: &[PlantPowerRecord]) -> Result<()> {
        self.insert_rows(&self.tables.plant_power, &PLANT_POWER_COLUMNS, records, |b, r| {
            b.push_bind(format_timestamp(&r.timestamp))
                .push_unseparated("::timestamp")
                .push_bind(r.theoretical_w)
                .push_bind(r.plant_id);
        })
        .await
    }

    pub async fn insert_plant_energy(&self, records: &[PlantEnergyRecord]) -> Result<()> {
        self.insert_rows(&self.tables.plant_energy, &PLANT_ENERGY_COLUMNS, records, |b, r| {
            b.push_bind(format_date(&r.date))
                .push_unseparated("::date")
                .push_bind(r.theoretical_kwh)
                .push_bind(r.poa_energy_kwh)
                .push_bind(r.plant_id);
        })
        .await
    }

    pub async fn insert_device_power(&self, records: &[DevicePowerRecord]) -> Result<()> {
        self.insert_rows(&self.tables.device_power, &DEVICE_POWER_COLUMNS, records, |b, r| {
            b.push_bind(format_timestamp(&r.timestamp))
                .push_unseparated("::timestamp")
                .push_bind(r.theoretical_w)
                .push_bind(r.device_id);
        })
        .await
    }

    pub async fn insert_device_energy(&self, records: &[DeviceEnergyRecord]) -> Result<()> {
        self.insert_rows(&self.tables.device_energy, &DEVICE_ENERGY_COLUMNS, records, |b, r| {
            b.push_bind(format_date(&r.date))
                .push_unseparated("::date")
                .push_bind(r.energy_kwh)
                .push_bind(r.device_id);
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_prefix_quotes_identifiers() {
        assert_eq!(
            insert_prefix("potenciaTeoricaPlanta", &PLANT_POWER_COLUMNS),
            r#"INSERT INTO "potenciaTeoricaPlanta" ("fecha", "valorTeorico", "id_planta") "#
        );
        assert_eq!(quote_ident(r#"odd"name"#), r#""odd""name""#);
    }
}
