//! DC output of an array and the PVWatts loss budget applied to it.

use serde::{Deserialize, Serialize};

/// Reference cell temperature of the nameplate rating, °C
pub const TEMP_REF: f64 = 25.0;

/// PVWatts DC power, W
///
/// * `effective_irradiance` - irradiance reaching the cells, W/m²
/// * `temp_cell` - cell temperature, °C
/// * `pdc0` - nameplate DC power at 1000 W/m² and 25 °C, W
/// * `gamma_pdc` - power temperature coefficient, 1/°C
pub fn pvwatts_dc(effective_irradiance: f64, temp_cell: f64, pdc0: f64, gamma_pdc: f64) -> f64 {
    effective_irradiance * 0.001 * pdc0 * (1.0 + gamma_pdc * (temp_cell - TEMP_REF))
}

/// System loss categories, each in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossParameters {
    pub soiling: f64,
    pub shading: f64,
    pub snow: f64,
    pub mismatch: f64,
    pub wiring: f64,
    pub connections: f64,
    pub lid: f64,
    pub nameplate_rating: f64,
    pub age: f64,
    pub availability: f64,
}

impl Default for LossParameters {
    fn default() -> Self {
        Self {
            soiling: 2.0,
            shading: 3.0,
            snow: 0.0,
            mismatch: 2.0,
            wiring: 2.0,
            connections: 0.5,
            lid: 1.5,
            nameplate_rating: 1.0,
            age: 0.0,
            availability: 3.0,
        }
    }
}

impl LossParameters {
    fn as_array(&self) -> [f64; 10] {
        [
            self.soiling,
            self.shading,
            self.snow,
            self.mismatch,
            self.wiring,
            self.connections,
            self.lid,
            self.nameplate_rating,
            self.age,
            self.availability,
        ]
    }

    /// Combined loss in percent; categories compound multiplicatively
    pub fn total_percent(&self) -> f64 {
        let remaining: f64 = self.as_array().iter().map(|l| 1.0 - l / 100.0).product();
        100.0 * (1.0 - remaining)
    }

    /// Factor applied to DC power
    pub fn dc_factor(&self) -> f64 {
        1.0 - self.total_percent() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pvwatts_at_reference() {
        assert_eq!(pvwatts_dc(1000.0, 25.0, 5000.0, -0.004), 5000.0);
        assert!((pvwatts_dc(1000.0, 50.0, 5000.0, -0.004) - 4500.0).abs() < 1e-9);
        assert_eq!(pvwatts_dc(0.0, 10.0, 5000.0, -0.004), 0.0);
    }

    #[test]
    fn test_default_loss_total() {
        let total = LossParameters::default().total_percent();
        assert!((total - 14.08).abs() < 0.01, "{total}");
    }

    #[test]
    fn test_no_losses() {
        let none = LossParameters {
            soiling: 0.0,
            shading: 0.0,
            snow: 0.0,
            mismatch: 0.0,
            wiring: 0.0,
            connections: 0.0,
            lid: 0.0,
            nameplate_rating: 0.0,
            age: 0.0,
            availability: 0.0,
        };
        assert_eq!(none.dc_factor(), 1.0);
    }
}
