//! Reference tables loaded from disk once per run and only read afterwards.

pub mod inverters;
pub mod losses;
pub mod modules;

pub use inverters::InverterCatalog;
pub use losses::LossesTable;
pub use modules::{normalize_name, CecModule, ModuleCatalog};

use anyhow::Result;

use crate::config::CatalogConfig;

#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub modules: ModuleCatalog,
    pub inverters: InverterCatalog,
    pub losses: LossesTable,
}

impl ReferenceData {
    pub fn load(cfg: &CatalogConfig) -> Result<Self> {
        Ok(Self {
            modules: ModuleCatalog::from_paths(&cfg.module_files)?,
            inverters: InverterCatalog::from_path(&cfg.inverter_file)?,
            losses: LossesTable::from_path(&cfg.losses_file)?,
        })
    }
}
