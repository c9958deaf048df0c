use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::model::LossParameters;

/// One plant's row; blank cells fall back to the default for that category
#[derive(Debug, Deserialize)]
struct LossRow {
    plant: String,
    soiling: Option<f64>,
    shading: Option<f64>,
    snow: Option<f64>,
    mismatch: Option<f64>,
    wiring: Option<f64>,
    connections: Option<f64>,
    lid: Option<f64>,
    nameplate_rating: Option<f64>,
    age: Option<f64>,
    availability: Option<f64>,
}

impl LossRow {
    fn into_parameters(self) -> LossParameters {
        let d = LossParameters::default();
        let pick = |v: Option<f64>, default: f64| v.filter(|x| x.is_finite()).unwrap_or(default);
        LossParameters {
            soiling: pick(self.soiling, d.soiling),
            shading: pick(self.shading, d.shading),
            snow: pick(self.snow, d.snow),
            mismatch: pick(self.mismatch, d.mismatch),
            wiring: pick(self.wiring, d.wiring),
            connections: pick(self.connections, d.connections),
            lid: pick(self.lid, d.lid),
            nameplate_rating: pick(self.nameplate_rating, d.nameplate_rating),
            age: pick(self.age, d.age),
            availability: pick(self.availability, d.availability),
        }
    }
}

/// Per-plant loss budgets
#[derive(Debug, Clone, Default)]
pub struct LossesTable {
    plants: HashMap<String, LossParameters>,
}

impl LossesTable {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open losses table {}", path.display()))?;
        let table = Self::from_reader(file)?;
        info!(path = %path.display(), plants = table.plants.len(), "loaded losses table");
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut plants = HashMap::new();
        for row in rdr.deserialize::<LossRow>() {
            let row = row.context("Failed to parse losses row")?;
            plants.insert(row.plant.clone(), row.into_parameters());
        }
        Ok(Self { plants })
    }

    pub fn for_plant(&self, plant_name: &str) -> LossParameters {
        match self.plants.get(plant_name) {
            Some(losses) => *losses,
            None => {
                debug!(plant = plant_name, "no losses listed, using defaults");
                LossParameters::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOSSES: &str = "\
plant,soiling,shading,snow,mismatch,wiring,connections,lid,nameplate_rating,age,availability
TRES SOLES,5,,0,2,2,0.5,1.5,1,0,1
";

    #[test]
    fn test_listed_plant_with_blank_cell() {
        let table = LossesTable::from_reader(LOSSES.as_bytes()).unwrap();
        let losses = table.for_plant("TRES SOLES");
        assert_eq!(losses.soiling, 5.0);
        assert_eq!(losses.shading, LossParameters::default().shading);
        assert_eq!(losses.availability, 1.0);
    }

    #[test]
    fn test_unlisted_plant_gets_defaults() {
        let table = LossesTable::from_reader(LOSSES.as_bytes()).unwrap();
        assert_eq!(table.for_plant("SODIMAC HC ÑUBLE"), LossParameters::default());
    }
}
