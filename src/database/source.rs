use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;

use super::repositories::{IrradianceRepository, TheoreticalRepository, TopologyRepository};
use crate::config::OutputTables;
use crate::domain::{Device, IrradianceSample, MeteoSample, Plant, PlantReport, StringSpec};
use crate::pipeline::{PlantSource, ReportSink};

/// Postgres-backed input and output of a report run
pub struct PgSource {
    topology: TopologyRepository,
    irradiance: IrradianceRepository,
    theoretical: TheoreticalRepository,
}

impl PgSource {
    pub fn new(pool: PgPool, tables: OutputTables) -> Self {
        Self {
            topology: TopologyRepository::new(pool.clone()),
            irradiance: IrradianceRepository::new(pool.clone()),
            theoretical: TheoreticalRepository::new(pool, tables),
        }
    }
}

#[async_trait]
impl PlantSource for PgSource {
    async fn plants(&self) -> Result<Vec<Plant>> {
        self.topology.plants().await
    }

    async fn strings(&self) -> Result<Vec<StringSpec>> {
        self.topology.strings().await
    }

    async fn devices(&self) -> Result<Vec<Device>> {
        self.topology.devices().await
    }

    async fn first_irradiance(&self, plant_name: &str) -> Result<Option<NaiveDateTime>> {
        self.irradiance.first_period_end(plant_name).await
    }

    async fn irradiance(
        &self,
        plant_name: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<IrradianceSample>> {
        self.irradiance.find_range(plant_name, start, end).await
    }

    async fn meteo(
        &self,
        plant_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<MeteoSample>> {
        self.irradiance.find_meteo_range(plant_id, start, end).await
    }
}

#[async_trait]
impl ReportSink for PgSource {
    /// Tables are written in report order, each in its own transaction
    async fn upload(&self, report: &PlantReport) -> Result<()> {
        self.theoretical.insert_plant_power(&report.plant_power).await?;
        self.theoretical.insert_plant_energy(&report.plant_energy).await?;
        self.theoretical.insert_device_power(&report.device_power).await?;
        self.theoretical.insert_device_energy(&report.device_energy).await?;
        Ok(())
    }
}
