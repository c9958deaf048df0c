pub mod aggregate;
pub mod catalog;
pub mod config;
#[cfg(feature = "db")]
pub mod database;
pub mod domain;
pub mod error;
pub mod export;
pub mod model;
pub mod pipeline;
pub mod telemetry;
