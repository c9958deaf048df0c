//! Repository implementations for the report database
//!
//! - Topology: plants, inverters and strings
//! - Irradiance: satellite irradiance and ground weather history
//! - Theoretical: the four report tables written by a run

pub mod irradiance;
pub mod theoretical;
pub mod topology;

pub use irradiance::IrradianceRepository;
pub use theoretical::TheoreticalRepository;
pub use topology::{StringRow, TopologyRepository};
