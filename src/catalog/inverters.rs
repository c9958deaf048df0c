use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use super::modules::normalize_name;
use crate::model::{InverterModel, SandiaInverter};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InverterRow {
    name: String,
    paco: f64,
    pdco: f64,
    vdco: f64,
    pso: f64,
    #[serde(rename = "C0")]
    c0: f64,
    #[serde(rename = "C1")]
    c1: f64,
    #[serde(rename = "C2")]
    c2: f64,
    #[serde(rename = "C3")]
    c3: f64,
    pnt: f64,
}

impl InverterRow {
    fn split(self) -> (String, SandiaInverter) {
        let params = SandiaInverter {
            paco: self.paco,
            pdco: self.pdco,
            vdco: self.vdco,
            pso: self.pso,
            c0: self.c0,
            c1: self.c1,
            c2: self.c2,
            c3: self.c3,
            pnt: self.pnt,
        };
        (self.name, params)
    }
}

/// CEC inverter list keyed by raw and normalized name
#[derive(Debug, Clone, Default)]
pub struct InverterCatalog {
    inverters: HashMap<String, SandiaInverter>,
}

impl InverterCatalog {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open inverter table {}", path.display()))?;
        let catalog = Self::from_reader(file)?;
        info!(path = %path.display(), inverters = catalog.len(), "loaded inverter table");
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let mut inverters = HashMap::new();

        for row in rdr.deserialize::<InverterRow>() {
            match row {
                Ok(row) => {
                    let (name, params) = row.split();
                    inverters
                        .entry(normalize_name(&name))
                        .or_insert_with(|| params.clone());
                    inverters.entry(name).or_insert(params);
                }
                Err(e) => debug!("skipping inverter row: {}", e),
            }
        }

        Ok(Self { inverters })
    }

    pub fn get(&self, name: &str) -> Option<&SandiaInverter> {
        self.inverters
            .get(name)
            .or_else(|| self.inverters.get(&normalize_name(name)))
    }

    /// Sandia model for catalogued inverters, PVWatts sized from the AC rating otherwise
    pub fn inverter_parameters(&self, model: Option<&str>, ac_power_w: f64) -> InverterModel {
        match model.and_then(|m| self.get(m)) {
            Some(params) => InverterModel::Sandia(params.clone()),
            None => {
                debug!(model = ?model, ac_power_w, "inverter not catalogued, using pvwatts");
                InverterModel::pvwatts_from_ac_rating(ac_power_w)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inverters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inverters.is_empty()
    }
}
