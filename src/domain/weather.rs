//! Irradiance and meteorological series, and how they are combined into the
//! weather input of the model chain.

use chrono::{DateTime, Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Satellite irradiance for the period ending at `period_end`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct IrradianceSample {
    pub period_end: NaiveDateTime,
    /// Global horizontal irradiance, W/m²
    pub ghi: f64,
    /// Direct normal irradiance, W/m²
    pub dni: f64,
    /// Diffuse horizontal irradiance, W/m²
    pub dhi: f64,
}

/// Ground station reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MeteoSample {
    pub timestamp: NaiveDateTime,
    pub air_temp: f64,
    pub wind_speed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub timestamp: NaiveDateTime,
    pub ghi: f64,
    pub dni: f64,
    pub dhi: f64,
    pub temp_air: f64,
    pub wind_speed: f64,
}

/// Default spacing of the meteo grid
pub fn half_hour() -> Duration {
    Duration::minutes(30)
}

/// Round a timestamp down onto a grid of `step`
pub fn floor_to(time: NaiveDateTime, step: Duration) -> NaiveDateTime {
    let step_secs = step.num_seconds().max(1);
    let secs = time.and_utc().timestamp();
    let floored = secs - secs.rem_euclid(step_secs);
    DateTime::from_timestamp(floored, 0)
        .map(|t| t.naive_utc())
        .unwrap_or(time)
}

/// Resample readings onto a regular grid, carrying the last known reading forward.
///
/// The grid starts at the first reading rounded down to `step` and ends at or
/// before the last reading. Grid points with no earlier reading are left out.
pub fn resample_pad(samples: &[MeteoSample], step: Duration) -> Vec<MeteoSample> {
    let by_time: BTreeMap<NaiveDateTime, MeteoSample> =
        samples.iter().map(|s| (s.timestamp, *s)).collect();

    let (Some(first), Some(last)) = (by_time.keys().next(), by_time.keys().next_back()) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut t = floor_to(*first, step);
    while t <= *last {
        if let Some((_, reading)) = by_time.range(..=t).next_back() {
            out.push(MeteoSample { timestamp: t, ..*reading });
        }
        t += step;
    }
    out
}

/// Inner join of irradiance and meteo on timestamp
pub fn join_weather(irradiance: &[IrradianceSample], meteo: &[MeteoSample]) -> Vec<WeatherSample> {
    let meteo: BTreeMap<NaiveDateTime, &MeteoSample> =
        meteo.iter().map(|m| (m.timestamp, m)).collect();

    irradiance
        .iter()
        .filter_map(|irr| {
            meteo.get(&irr.period_end).map(|m| WeatherSample {
                timestamp: irr.period_end,
                ghi: irr.ghi,
                dni: irr.dni,
                dhi: irr.dhi,
                temp_air: m.air_temp,
                wind_speed: m.wind_speed,
            })
        })
        .collect()
}
