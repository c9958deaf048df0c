//! Per-plant report pipeline: topology, weather, model chain per inverter,
//! aggregation and upload.

pub mod memory;
pub mod source;

pub use memory::{MemorySink, MemorySource};
pub use source::{PlantSource, ReportSink};

use anyhow::Result;
use tracing::{error, info, warn, Instrument};

use crate::aggregate;
use crate::catalog::ReferenceData;
use crate::config::{DegradationConfig, RunConfig, RunWindow};
use crate::domain::{
    half_hour, join_weather, resample_pad, Device, Plant, PlantReport, PlantTopology, Topology,
    WeatherSample,
};
use crate::error::PlantError;
use crate::telemetry;
use crate::model::{
    degradation_series, Location, ModelChain, PvArray, PvSystem, SapmParams, SurfaceOrientation,
};

/// Outcome counts of a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Model output of one inverter
struct DeviceRun {
    device_id: i64,
    ac: Vec<(chrono::NaiveDateTime, f64)>,
    poa: Vec<(f64, Vec<crate::model::ArrayIrradiance>)>,
}

pub struct TheoreticalRun<'a, S: PlantSource + ?Sized> {
    source: &'a S,
    reference: &'a ReferenceData,
    degradation: DegradationConfig,
}

impl<'a, S: PlantSource + ?Sized> TheoreticalRun<'a, S> {
    pub fn new(source: &'a S, reference: &'a ReferenceData, degradation: DegradationConfig) -> Self {
        Self {
            source,
            reference,
            degradation,
        }
    }

    /// Process every selected plant in turn; a failing plant never stops the run
    pub async fn run(
        &self,
        sink: &dyn ReportSink,
        selection: &RunConfig,
        window: RunWindow,
    ) -> Result<RunSummary> {
        let plants = self.source.plants().await?;
        let topology = Topology {
            strings: self.source.strings().await?,
            devices: self.source.devices().await?,
        };
        info!(
            plants = plants.len(),
            strings = topology.strings.len(),
            devices = topology.devices.len(),
            start = %window.start,
            end = %window.end,
            "starting theoretical production run"
        );

        let mut summary = RunSummary::default();
        for plant in plants.iter().filter(|p| selection.selects(&p.name)) {
            async {
                match self.run_plant(plant, &topology, window).await {
                    Ok(report) => match sink.upload(&report).await {
                        Ok(()) => {
                            info!(
                                plant_power = report.plant_power.len(),
                                device_power = report.device_power.len(),
                                "report uploaded"
                            );
                            summary.processed += 1;
                        }
                        Err(e) => {
                            error!("upload failed: {:#}", e);
                            summary.failed += 1;
                        }
                    },
                    Err(e) if e.is_skip() => {
                        warn!("aborting plant: {}", e);
                        summary.skipped += 1;
                    }
                    Err(e) => {
                        error!("plant run failed: {:#}", e);
                        summary.failed += 1;
                    }
                }
            }
            .instrument(telemetry::plant_span(plant))
            .await;
        }

        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed,
            "run finished"
        );
        Ok(summary)
    }

    /// Model every inverter of a plant. Nothing is returned unless all of them succeed.
    pub async fn run_plant(
        &self,
        plant: &Plant,
        topology: &Topology,
        window: RunWindow,
    ) -> Result<PlantReport, PlantError> {
        let installed = self
            .source
            .first_irradiance(&plant.name)
            .await?
            .ok_or(PlantError::NoIrradiance)?;

        let losses = self.reference.losses.for_plant(&plant.name);

        let plant_topology = topology.for_plant(&plant.name);
        if plant_topology.strings.is_empty() {
            return Err(PlantError::NoStrings);
        }
        if plant_topology.devices.is_empty() {
            return Err(PlantError::NoDevices);
        }

        let weather = self.weather(plant, window).await?;
        let degradation = degradation_series(
            installed,
            weather.iter().map(|w| w.timestamp),
            self.degradation,
        );

        let location = Location::new(plant.latitude, plant.longitude);
        let mut runs = Vec::with_capacity(plant_topology.devices.len());

        for device in &plant_topology.devices {
            let arrays = self.arrays_for(device, &plant_topology)?;
            let system = PvSystem {
                arrays,
                inverter: self
                    .reference
                    .inverters
                    .inverter_parameters(device.inverter_model.as_deref(), device.ac_power_w),
                losses,
            };

            let chain = ModelChain::new(&system, location, format!("{}-{}", plant.name, device.serial));
            let results = chain.run(&weather, &degradation)?;

            runs.push(DeviceRun {
                device_id: device.device_id,
                ac: results.ac,
                poa: system
                    .arrays
                    .iter()
                    .map(PvArray::kwp)
                    .zip(results.total_irrad)
                    .collect(),
            });
        }

        Ok(build_report(plant, &runs))
    }

    /// Irradiance for the window joined with the plant's resampled meteo readings
    async fn weather(&self, plant: &Plant, window: RunWindow) -> Result<Vec<WeatherSample>, PlantError> {
        let irradiance = self
            .source
            .irradiance(&plant.name, window.start, window.end)
            .await?;
        let (Some(first), Some(last)) = (irradiance.first(), irradiance.last()) else {
            return Err(PlantError::EmptyWindow);
        };

        let meteo = self
            .source
            .meteo(plant.id, first.period_end, last.period_end)
            .await?;
        let weather = join_weather(&irradiance, &resample_pad(&meteo, half_hour()));
        if weather.is_empty() {
            return Err(PlantError::EmptyWindow);
        }
        Ok(weather)
    }

    fn arrays_for(
        &self,
        device: &Device,
        topology: &PlantTopology<'_>,
    ) -> Result<Vec<PvArray>, PlantError> {
        let strings = topology.strings_of(&device.serial);

        if strings.iter().any(|s| s.is_unassigned()) {
            return Err(PlantError::UnassignedModule {
                serial: device.serial.clone(),
            });
        }

        let arrays = strings
            .iter()
            .map(|s| {
                let module = self.reference.modules.get(&s.module_model).ok_or_else(|| {
                    PlantError::UnknownModule {
                        model: s.module_model.clone(),
                    }
                })?;
                Ok(PvArray {
                    orientation: SurfaceOrientation {
                        tilt_deg: s.tilt_deg,
                        azimuth_deg: s.azimuth_deg,
                    },
                    module: module.clone(),
                    temperature: SapmParams::for_mounting(s.mounting),
                    strings: 1,
                    modules_per_string: s.module_count,
                })
            })
            .collect::<Result<Vec<_>, PlantError>>()?;

        if arrays.is_empty() {
            return Err(PlantError::NoArrays {
                serial: device.serial.clone(),
            });
        }
        Ok(arrays)
    }
}

fn build_report(plant: &Plant, runs: &[DeviceRun]) -> PlantReport {
    let device_power: Vec<_> = runs
        .iter()
        .flat_map(|run| aggregate::device_power_records(run.device_id, &run.ac))
        .collect();

    let poa_daily = aggregate::poa_daily_energy(
        runs.iter()
            .flat_map(|run| run.poa.iter().map(|(kwp, series)| (*kwp, series.as_slice()))),
    );

    let plant_power = aggregate::plant_power(&device_power, plant.id);
    let plant_energy = aggregate::plant_energy(&plant_power, &poa_daily, plant.id);
    let device_energy = aggregate::device_energy(&device_power);

    PlantReport {
        plant_id: plant.id,
        plant_name: plant.name.clone(),
        plant_power,
        plant_energy,
        device_power,
        device_energy,
    }
}
