use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::domain::{Device, IrradianceSample, MeteoSample, Plant, PlantReport, StringSpec};

/// Read side of a report run
#[async_trait]
pub trait PlantSource: Send + Sync {
    /// Plants with a known location
    async fn plants(&self) -> Result<Vec<Plant>>;
    /// Strings of every plant
    async fn strings(&self) -> Result<Vec<StringSpec>>;
    /// Inverters of every plant
    async fn devices(&self) -> Result<Vec<Device>>;
    /// Timestamp of the oldest irradiance record of a plant
    async fn first_irradiance(&self, plant_name: &str) -> Result<Option<NaiveDateTime>>;
    async fn irradiance(
        &self,
        plant_name: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<IrradianceSample>>;
    async fn meteo(
        &self,
        plant_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<MeteoSample>>;
}

/// Write side of a report run
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn upload(&self, report: &PlantReport) -> Result<()>;
}
