//! CSV export of plant reports, one file per table per plant.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::OutputTables;
use crate::domain::{
    format_date, format_timestamp, DeviceEnergyRecord, DevicePowerRecord, PlantEnergyRecord,
    PlantPowerRecord, PlantReport, DEVICE_ENERGY_COLUMNS, DEVICE_POWER_COLUMNS,
    PLANT_ENERGY_COLUMNS, PLANT_POWER_COLUMNS,
};
use crate::pipeline::ReportSink;

pub fn write_plant_power(records: &[PlantPowerRecord], writer: impl Write) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(PLANT_POWER_COLUMNS)?;
    for r in records {
        wtr.write_record(&[
            format_timestamp(&r.timestamp),
            r.theoretical_w.to_string(),
            r.plant_id.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_plant_energy(records: &[PlantEnergyRecord], writer: impl Write) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(PLANT_ENERGY_COLUMNS)?;
    for r in records {
        wtr.write_record(&[
            format_date(&r.date),
            r.theoretical_kwh.to_string(),
            r.poa_energy_kwh.map(|v| v.to_string()).unwrap_or_default(),
            r.plant_id.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_device_power(records: &[DevicePowerRecord], writer: impl Write) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(DEVICE_POWER_COLUMNS)?;
    for r in records {
        wtr.write_record(&[
            format_timestamp(&r.timestamp),
            r.theoretical_w.to_string(),
            r.device_id.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_device_energy(records: &[DeviceEnergyRecord], writer: impl Write) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(DEVICE_ENERGY_COLUMNS)?;
    for r in records {
        wtr.write_record(&[
            format_date(&r.date),
            r.energy_kwh.to_string(),
            r.device_id.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes reports under a directory instead of the database
pub struct CsvSink {
    dir: PathBuf,
    tables: OutputTables,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>, tables: OutputTables) -> Self {
        Self {
            dir: dir.into(),
            tables,
        }
    }

    pub fn path_for(&self, table: &str, plant_id: i64) -> PathBuf {
        self.dir.join(format!("{}_{}.csv", table, plant_id))
    }

    async fn write(&self, path: &Path, contents: Vec<u8>) -> Result<()> {
        tokio::fs::write(path, contents)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

#[async_trait]
impl ReportSink for CsvSink {
    async fn upload(&self, report: &PlantReport) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let mut buf = Vec::new();
        write_plant_power(&report.plant_power, &mut buf)?;
        self.write(&self.path_for(&self.tables.plant_power, report.plant_id), buf).await?;

        let mut buf = Vec::new();
        write_plant_energy(&report.plant_energy, &mut buf)?;
        self.write(&self.path_for(&self.tables.plant_energy, report.plant_id), buf).await?;

        let mut buf = Vec::new();
        write_device_power(&report.device_power, &mut buf)?;
        self.write(&self.path_for(&self.tables.device_power, report.plant_id), buf).await?;

        let mut buf = Vec::new();
        write_device_energy(&report.device_energy, &mut buf)?;
        self.write(&self.path_for(&self.tables.device_energy, report.plant_id), buf).await?;

        info!(dir = %self.dir.display(), plant = %report.plant_name, "report written as csv");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_report() -> PlantReport {
        let day = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
        let noon = day.and_hms_opt(12, 0, 0).unwrap();
        PlantReport {
            plant_id: 12,
            plant_name: "TRES SOLES".into(),
            plant_power: vec![PlantPowerRecord { timestamp: noon, theoretical_w: 1500.5, plant_id: 12 }],
            plant_energy: vec![PlantEnergyRecord {
                date: day,
                theoretical_kwh: 0.75,
                poa_energy_kwh: None,
                plant_id: 12,
            }],
            device_power: vec![DevicePowerRecord { timestamp: noon, theoretical_w: 1500.5, device_id: 4 }],
            device_energy: vec![DeviceEnergyRecord { date: day, energy_kwh: 0.75, device_id: 4 }],
        }
    }

    #[test]
    fn test_plant_power_layout() {
        let mut buf = Vec::new();
        write_plant_power(&sample_report().plant_power, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "fecha,valorTeorico,id_planta");
        assert_eq!(lines[1], "2023-05-01 12:00:00,1500.5,12");
    }

    #[test]
    fn test_missing_poa_is_blank() {
        let mut buf = Vec::new();
        write_plant_energy(&sample_report().plant_energy, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().nth(1), Some("2023-05-01,0.75,,12"));
    }

    #[tokio::test]
    async fn test_sink_writes_four_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path(), OutputTables::default());
        sink.upload(&sample_report()).await.unwrap();

        for table in ["potenciaTeoricaPlanta", "proyeccionGeneracion", "potenciaTeoricaEquipo", "proyeccionGeneracionEquipo"] {
            let path = sink.path_for(table, 12);
            assert!(path.exists(), "missing {}", path.display());
        }
    }
}
