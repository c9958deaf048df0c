//! Single-pass simulation of one inverter and the arrays wired to it.

use anyhow::{ensure, Result};
use chrono::NaiveDateTime;
use tracing::debug;

use super::dc::{pvwatts_dc, LossParameters};
use super::inverter::InverterModel;
use super::irradiance::{total_irradiance, PhysicalIam, SurfaceOrientation, DEFAULT_ALBEDO};
use super::solar_position::{extra_radiation, Location};
use super::temperature::SapmParams;
use crate::catalog::CecModule;
use crate::domain::WeatherSample;

/// Fixed-mount array of identical modules
#[derive(Debug, Clone, PartialEq)]
pub struct PvArray {
    pub orientation: SurfaceOrientation,
    pub module: CecModule,
    pub temperature: SapmParams,
    pub strings: u32,
    pub modules_per_string: u32,
}

impl PvArray {
    /// Nameplate DC power, W
    pub fn pdc0(&self) -> f64 {
        self.module.stc * f64::from(self.modules_per_string) * f64::from(self.strings)
    }

    pub fn kwp(&self) -> f64 {
        self.pdc0() / 1000.0
    }
}

/// Arrays feeding a single inverter
#[derive(Debug, Clone, PartialEq)]
pub struct PvSystem {
    pub arrays: Vec<PvArray>,
    pub inverter: InverterModel,
    pub losses: LossParameters,
}

/// Irradiance on one array at one timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayIrradiance {
    pub timestamp: NaiveDateTime,
    pub poa_global: f64,
    pub poa_direct: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResults {
    /// AC output per weather timestamp, W; negative values are night tare
    pub ac: Vec<(NaiveDateTime, f64)>,
    /// DC output after losses and degradation, summed over arrays, W
    pub dc: Vec<(NaiveDateTime, f64)>,
    /// Plane-of-array irradiance, one series per array
    pub total_irrad: Vec<Vec<ArrayIrradiance>>,
}

pub struct ModelChain<'a> {
    system: &'a PvSystem,
    location: Location,
    iam: PhysicalIam,
    albedo: f64,
    name: String,
}

impl<'a> ModelChain<'a> {
    pub fn new(system: &'a PvSystem, location: Location, name: impl Into<String>) -> Self {
        Self {
            system,
            location,
            iam: PhysicalIam::default(),
            albedo: DEFAULT_ALBEDO,
            name: name.into(),
        }
    }

    /// Run the chain over a weather series.
    ///
    /// `degradation` holds one module ageing factor per weather sample.
    pub fn run(&self, weather: &[WeatherSample], degradation: &[f64]) -> Result<ModelResults> {
        ensure!(
            weather.len() == degradation.len(),
            "{}: {} weather samples but {} degradation factors",
            self.name,
            weather.len(),
            degradation.len()
        );

        let loss_factor = self.system.losses.dc_factor();
        let mut results = ModelResults {
            ac: Vec::with_capacity(weather.len()),
            dc: Vec::with_capacity(weather.len()),
            total_irrad: vec![Vec::with_capacity(weather.len()); self.system.arrays.len()],
        };

        for (w, factor) in weather.iter().zip(degradation) {
            let sun = self.location.solar_position(w.timestamp);
            let dni_extra = extra_radiation(w.timestamp);

            let mut total_dc = 0.0;
            for (array, irrad) in self.system.arrays.iter().zip(results.total_irrad.iter_mut()) {
                let poa = total_irradiance(
                    array.orientation,
                    sun.zenith_deg,
                    sun.azimuth_deg,
                    w.dni,
                    w.ghi,
                    w.dhi,
                    dni_extra,
                    self.albedo,
                );
                let aoi = array.orientation.aoi(sun.zenith_deg, sun.azimuth_deg);
                let effective = poa.poa_direct * self.iam.modifier(aoi) + poa.poa_diffuse;
                let temp_cell = array.temperature.cell_temperature(poa.poa_global, w.temp_air, w.wind_speed);

                total_dc += pvwatts_dc(effective, temp_cell, array.pdc0(), array.module.gamma_pdc());
                irrad.push(ArrayIrradiance {
                    timestamp: w.timestamp,
                    poa_global: poa.poa_global,
                    poa_direct: poa.poa_direct,
                });
            }

            let dc = total_dc * loss_factor * factor;
            results.dc.push((w.timestamp, dc));
            results.ac.push((w.timestamp, self.system.inverter.ac_power(dc)));
        }

        debug!(
            chain = %self.name,
            samples = weather.len(),
            arrays = self.system.arrays.len(),
            ac_model = self.system.inverter.name(),
            "model chain finished"
        );

        Ok(results)
    }
}
