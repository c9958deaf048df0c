use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::path::PathBuf;
use validator::{Validate, ValidationError};

use crate::telemetry::LogFormat;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Config {
    #[validate(nested)]
    pub run: RunConfig,
    pub db: DbConfig,
    pub catalog: CatalogConfig,
    #[validate(nested)]
    pub degradation: DegradationConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_dates"))]
pub struct RunConfig {
    #[validate(range(min = 1))]
    pub days_window: i64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Plant names to process; empty means every plant
    #[serde(default)]
    pub plants: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

/// Explicit windows need both ends
fn validate_dates(run: &RunConfig) -> Result<(), ValidationError> {
    match (run.start_date, run.end_date) {
        (Some(_), None) | (None, Some(_)) => {
            let mut err = ValidationError::new("half_window");
            err.message = Some("start_date and end_date must be set together".into());
            Err(err)
        }
        (Some(start), Some(end)) if start > end => {
            let mut err = ValidationError::new("reversed_window");
            err.message = Some("start_date is after end_date".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

fn default_max_connections() -> u32 { 4 }
fn default_min_connections() -> u32 { 1 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// CEC module tables, searched in order
    pub module_files: Vec<PathBuf>,
    pub inverter_file: PathBuf,
    pub losses_file: PathBuf,
}

#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct DegradationConfig {
    #[validate(range(min = 0.0, max = 1.0))]
    pub first_year_rate: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub second_year_rate: f64,
}

impl Default for DegradationConfig {
    fn default() -> Self {
        Self {
            first_year_rate: 0.025,
            second_year_rate: 0.007,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Database,
    Csv,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub sink: SinkKind,
    #[serde(default = "default_csv_dir")]
    pub csv_dir: PathBuf,
    #[serde(default)]
    pub tables: OutputTables,
}

fn default_csv_dir() -> PathBuf { PathBuf::from("out") }

#[derive(Debug, Clone, Deserialize)]
pub struct OutputTables {
    pub plant_power: String,
    pub plant_energy: String,
    pub device_power: String,
    pub device_energy: String,
}

impl Default for OutputTables {
    fn default() -> Self {
        Self {
            plant_power: "potenciaTeoricaPlanta".to_string(),
            plant_energy: "proyeccionGeneracion".to_string(),
            device_power: "potenciaTeoricaEquipo".to_string(),
            device_energy: "proyeccionGeneracionEquipo".to_string(),
        }
    }
}

/// Date window of one report run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl RunConfig {
    /// Explicit dates win; otherwise the window ends at today's midnight (UTC)
    /// and reaches back `days_window` days.
    pub fn window(&self, today: NaiveDate) -> RunWindow {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => RunWindow {
                start: start.and_time(NaiveTime::MIN),
                end: end.and_time(NaiveTime::MIN),
            },
            _ => {
                let end = today.and_time(NaiveTime::MIN);
                RunWindow {
                    start: end - Duration::days(self.days_window),
                    end,
                }
            }
        }
    }

    pub fn window_now(&self) -> RunWindow {
        self.window(Utc::now().date_naive())
    }

    pub fn selects(&self, plant_name: &str) -> bool {
        self.plants.is_empty() || self.plants.iter().any(|p| p == plant_name)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file("config/default.toml"))
                .merge(Env::prefixed("PVT__").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Config = figment.extract().context("invalid configuration")?;
        cfg.validate().context("configuration failed validation")?;
        Ok(cfg)
    }
}
