use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};
use tracing::warn;

/// Module model placeholder for strings that were never catalogued
pub const NOT_ASSIGNED: &str = "Not assigned";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Plant {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// An inverter and the nameplate data needed to model it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Device {
    pub device_id: i64,
    pub serial: String,
    pub plant_name: String,
    /// Rated AC output in W
    pub ac_power_w: f64,
    /// CEC inverter key, if one was ever assigned
    pub inverter_model: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum MountingType {
    #[strum(serialize = "Rooftop")]
    Rooftop,
    #[strum(serialize = "Ground mount")]
    GroundMount,
}

impl MountingType {
    /// Unrecognised labels are modeled as open-rack ground mounts
    pub fn parse_lenient(label: &str) -> Self {
        MountingType::from_str(label.trim()).unwrap_or_else(|_| {
            warn!(mounting = label, "unknown mounting type, assuming ground mount");
            MountingType::GroundMount
        })
    }
}

/// One string of modules wired to an inverter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringSpec {
    pub plant_name: String,
    /// Serial number of the inverter this string feeds
    pub serial: String,
    pub tilt_deg: f64,
    pub azimuth_deg: f64,
    pub module_model: String,
    pub module_count: u32,
    pub mounting: MountingType,
}

impl StringSpec {
    pub fn is_unassigned(&self) -> bool {
        self.module_model == NOT_ASSIGNED
    }
}

/// Strings and devices of every plant, loaded once per run
#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub strings: Vec<StringSpec>,
    pub devices: Vec<Device>,
}

/// Borrowed view of one plant's part of the topology
#[derive(Debug, Clone)]
pub struct PlantTopology<'a> {
    pub strings: Vec<&'a StringSpec>,
    pub devices: Vec<&'a Device>,
}

impl Topology {
    pub fn for_plant(&self, plant_name: &str) -> PlantTopology<'_> {
        PlantTopology {
            strings: self.strings.iter().filter(|s| s.plant_name == plant_name).collect(),
            devices: self.devices.iter().filter(|d| d.plant_name == plant_name).collect(),
        }
    }
}

impl<'a> PlantTopology<'a> {
    pub fn strings_of(&self, serial: &str) -> Vec<&'a StringSpec> {
        self.strings.iter().copied().filter(|s| s.serial == serial).collect()
    }
}
