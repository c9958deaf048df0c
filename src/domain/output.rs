use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Timestamp layout expected by the report tables
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Date layout expected by the daily report tables
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Column layouts of the four report tables
pub const PLANT_POWER_COLUMNS: [&str; 3] = ["fecha", "valorTeorico", "id_planta"];
pub const PLANT_ENERGY_COLUMNS: [&str; 4] = ["fecha", "valorTeorico", "energiaIncidentePOA", "id_planta"];
pub const DEVICE_POWER_COLUMNS: [&str; 3] = ["fecha", "potenciaTeorica", "id_equipo"];
pub const DEVICE_ENERGY_COLUMNS: [&str; 3] = ["fecha", "valor", "id_equipo"];

/// Half-hourly theoretical AC power of a whole plant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantPowerRecord {
    pub timestamp: NaiveDateTime,
    pub theoretical_w: f64,
    pub plant_id: i64,
}

/// Daily theoretical energy of a plant and the energy incident on its arrays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantEnergyRecord {
    pub date: NaiveDate,
    pub theoretical_kwh: f64,
    /// `None` when no array irradiance fell on that day
    pub poa_energy_kwh: Option<f64>,
    pub plant_id: i64,
}

/// Theoretical AC power of one inverter at one weather timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevicePowerRecord {
    pub timestamp: NaiveDateTime,
    pub theoretical_w: f64,
    pub device_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceEnergyRecord {
    pub date: NaiveDate,
    pub energy_kwh: f64,
    pub device_id: i64,
}

/// Everything computed for one plant, uploaded as a unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantReport {
    pub plant_id: i64,
    pub plant_name: String,
    pub plant_power: Vec<PlantPowerRecord>,
    pub plant_energy: Vec<PlantEnergyRecord>,
    pub device_power: Vec<DevicePowerRecord>,
    pub device_energy: Vec<DeviceEnergyRecord>,
}

pub fn format_timestamp(t: &NaiveDateTime) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_date(d: &NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_formats() {
        let d = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
        assert_eq!(format_date(&d), "2023-05-01");
        assert_eq!(format_timestamp(&d.and_hms_opt(13, 30, 0).unwrap()), "2023-05-01 13:30:00");
    }
}
