//! In-memory source and sink for running reports without a database.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::source::{PlantSource, ReportSink};
use crate::domain::{Device, IrradianceSample, MeteoSample, Plant, PlantReport, StringSpec};

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub plants: Vec<Plant>,
    pub strings: Vec<StringSpec>,
    pub devices: Vec<Device>,
    /// Irradiance keyed by plant name
    pub irradiance: HashMap<String, Vec<IrradianceSample>>,
    /// Meteo keyed by plant id
    pub meteo: HashMap<i64, Vec<MeteoSample>>,
}

#[async_trait]
impl PlantSource for MemorySource {
    async fn plants(&self) -> Result<Vec<Plant>> {
        Ok(self.plants.clone())
    }

    async fn strings(&self) -> Result<Vec<StringSpec>> {
        Ok(self.strings.clone())
    }

    async fn devices(&self) -> Result<Vec<Device>> {
        Ok(self.devices.clone())
    }

    async fn first_irradiance(&self, plant_name: &str) -> Result<Option<NaiveDateTime>> {
        Ok(self
            .irradiance
            .get(plant_name)
            .and_then(|samples| samples.iter().map(|s| s.period_end).min()))
    }

    async fn irradiance(
        &self,
        plant_name: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<IrradianceSample>> {
        let mut samples: Vec<IrradianceSample> = self
            .irradiance
            .get(plant_name)
            .map(|all| {
                all.iter()
                    .filter(|s| s.period_end >= start && s.period_end <= end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        samples.sort_by_key(|s| s.period_end);
        Ok(samples)
    }

    async fn meteo(
        &self,
        plant_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<MeteoSample>> {
        let mut samples: Vec<MeteoSample> = self
            .meteo
            .get(&plant_id)
            .map(|all| {
                all.iter()
                    .filter(|s| s.timestamp >= start && s.timestamp <= end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        samples.sort_by_key(|s| s.timestamp);
        Ok(samples)
    }
}

/// Keeps every uploaded report
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<PlantReport>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn reports(&self) -> Vec<PlantReport> {
        self.reports.lock().await.clone()
    }
}

#[async_trait]
impl ReportSink for MemorySink {
    async fn upload(&self, report: &PlantReport) -> Result<()> {
        self.reports.lock().await.push(report.clone());
        Ok(())
    }
}
