//! # Solar Position
//!
//! Sun position and extraterrestrial irradiance for a site, from UTC
//! timestamps. Declination, equation of time and the eccentricity
//! correction use Spencer's (1971) Fourier series.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Solar constant used for the extraterrestrial irradiance, W/m²
pub const SOLAR_CONSTANT: f64 = 1366.1;

const DEG: f64 = PI / 180.0;

/// Geographic site of a plant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Degrees, positive north
    pub latitude: f64,
    /// Degrees, positive east
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPosition {
    pub zenith_deg: f64,
    pub elevation_deg: f64,
    /// Degrees clockwise from north
    pub azimuth_deg: f64,
}

/// Day angle in radians, zero on January 1st
fn day_angle(time: NaiveDateTime) -> f64 {
    2.0 * PI * (time.ordinal() as f64 - 1.0) / 365.0
}

/// Normal-incidence irradiance at the top of the atmosphere, W/m²
pub fn extra_radiation(time: NaiveDateTime) -> f64 {
    let b = day_angle(time);
    SOLAR_CONSTANT
        * (1.00011
            + 0.034221 * b.cos()
            + 0.00128 * b.sin()
            + 0.000719 * (2.0 * b).cos()
            + 0.000077 * (2.0 * b).sin())
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Sun position at a UTC timestamp
    pub fn solar_position(&self, time: NaiveDateTime) -> SolarPosition {
        let b = day_angle(time);

        let declination = 0.006918 - 0.399912 * b.cos() + 0.070257 * b.sin()
            - 0.006758 * (2.0 * b).cos()
            + 0.000907 * (2.0 * b).sin()
            - 0.002697 * (3.0 * b).cos()
            + 0.00148 * (3.0 * b).sin();

        // Minutes
        let equation_of_time = 229.18
            * (0.000075 + 0.001868 * b.cos()
                - 0.032077 * b.sin()
                - 0.014615 * (2.0 * b).cos()
                - 0.04089 * (2.0 * b).sin());

        let utc_hours =
            time.hour() as f64 + time.minute() as f64 / 60.0 + time.second() as f64 / 3600.0;
        let solar_time = utc_hours + self.longitude / 15.0 + equation_of_time / 60.0;
        let hour_angle_deg = 15.0 * (solar_time - 12.0);
        let hour_angle = hour_angle_deg * DEG;

        let lat = self.latitude * DEG;
        let sin_elevation = (lat.sin() * declination.sin()
            + lat.cos() * declination.cos() * hour_angle.cos())
        .clamp(-1.0, 1.0);
        let elevation = sin_elevation.asin();

        let denominator = elevation.cos() * lat.cos();
        let cos_azimuth = if denominator.abs() > 1e-9 {
            ((declination.sin() - sin_elevation * lat.sin()) / denominator).clamp(-1.0, 1.0)
        } else {
            1.0
        };
        let mut azimuth_deg = cos_azimuth.acos() / DEG;

        // Afternoon: sun in the western half of the sky
        if hour_angle.sin() > 0.0 {
            azimuth_deg = 360.0 - azimuth_deg;
        }

        let elevation_deg = elevation / DEG;
        SolarPosition {
            zenith_deg: 90.0 - elevation_deg,
            elevation_deg,
            azimuth_deg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap().and_hms_opt(h, mi, 0).unwrap()
    }

    #[test]
    fn test_southern_hemisphere_noon() {
        // Chillán, Chile; solar noon near 16:50 UTC
        let site = Location::new(-36.6, -72.1);
        let pos = site.solar_position(utc(2023, 5, 1, 16, 50));

        // Declination ~ +15°, so elevation ~ 90 - 36.6 - 15
        assert!(pos.elevation_deg > 35.0 && pos.elevation_deg < 41.0, "{pos:?}");
        // Sun is due north at noon south of the tropics
        assert!(pos.azimuth_deg < 15.0 || pos.azimuth_deg > 345.0, "{pos:?}");
    }

    #[test]
    fn test_night() {
        let site = Location::new(-36.6, -72.1);
        let pos = site.solar_position(utc(2023, 5, 1, 5, 0));
        assert!(pos.elevation_deg < 0.0);
        assert!(pos.zenith_deg > 90.0);
    }

    #[test]
    fn test_morning_east_afternoon_west() {
        let site = Location::new(59.33, 18.07);
        let morning = site.solar_position(utc(2024, 6, 21, 6, 0));
        let afternoon = site.solar_position(utc(2024, 6, 21, 16, 0));
        assert!(morning.azimuth_deg > 45.0 && morning.azimuth_deg < 135.0);
        assert!(afternoon.azimuth_deg > 225.0 && afternoon.azimuth_deg < 315.0);
    }

    #[test]
    fn test_extra_radiation_perihelion() {
        let january = extra_radiation(utc(2023, 1, 3, 12, 0));
        let july = extra_radiation(utc(2023, 7, 4, 12, 0));
        assert!(january > 1400.0 && january < 1420.0);
        assert!(july > 1310.0 && july < 1330.0);
    }
}
