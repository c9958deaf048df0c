//! Physical PV model chain: sun position, transposition, incidence losses,
//! cell temperature, DC output, system losses, module ageing and inversion.

pub mod chain;
pub mod dc;
pub mod degradation;
pub mod inverter;
pub mod irradiance;
pub mod solar_position;
pub mod temperature;

pub use chain::{ArrayIrradiance, ModelChain, ModelResults, PvArray, PvSystem};
pub use dc::{pvwatts_dc, LossParameters};
pub use degradation::{degradation_series, module_degradation_factor};
pub use inverter::{pvwatts_ac, InverterModel, SandiaInverter};
pub use irradiance::{PhysicalIam, PoaIrradiance, SurfaceOrientation};
pub use solar_position::{extra_radiation, Location, SolarPosition};
pub use temperature::SapmParams;
