use thiserror::Error;

/// Reasons a plant run stops before anything is uploaded
#[derive(Debug, Error)]
pub enum PlantError {
    #[error("no irradiance data for plant")]
    NoIrradiance,

    #[error("plant has no strings")]
    NoStrings,

    #[error("plant has no inverters")]
    NoDevices,

    #[error("no irradiance samples in the requested window")]
    EmptyWindow,

    #[error("inverter {serial} has strings without an assigned module model")]
    UnassignedModule { serial: String },

    #[error("module {model} not found in any catalog")]
    UnknownModule { model: String },

    #[error("no arrays for inverter {serial}")]
    NoArrays { serial: String },

    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

impl PlantError {
    /// Data guards end the plant quietly; anything else is an actual failure
    pub fn is_skip(&self) -> bool {
        !matches!(self, PlantError::Source(_))
    }
}
