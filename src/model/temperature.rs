use crate::domain::MountingType;

/// Sandia Array Performance Model temperature coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SapmParams {
    pub a: f64,
    pub b: f64,
    /// Cell to back-of-module difference at 1000 W/m², °C
    pub delta_t: f64,
}

impl SapmParams {
    pub const OPEN_RACK_GLASS_POLYMER: SapmParams = SapmParams { a: -3.56, b: -0.075, delta_t: 3.0 };
    pub const INSULATED_BACK_GLASS_POLYMER: SapmParams = SapmParams { a: -2.81, b: -0.0455, delta_t: 0.0 };

    pub fn for_mounting(mounting: MountingType) -> Self {
        match mounting {
            MountingType::Rooftop => Self::INSULATED_BACK_GLASS_POLYMER,
            MountingType::GroundMount => Self::OPEN_RACK_GLASS_POLYMER,
        }
    }

    /// Cell temperature in °C
    pub fn cell_temperature(&self, poa_global: f64, temp_air: f64, wind_speed: f64) -> f64 {
        let module = poa_global * (self.a + self.b * wind_speed).exp() + temp_air;
        module + poa_global / 1000.0 * self.delta_t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_sun_means_ambient() {
        let p = SapmParams::OPEN_RACK_GLASS_POLYMER;
        assert_eq!(p.cell_temperature(0.0, 12.5, 3.0), 12.5);
    }

    #[test]
    fn test_rooftop_runs_hotter() {
        let roof = SapmParams::for_mounting(MountingType::Rooftop);
        let ground = SapmParams::for_mounting(MountingType::GroundMount);
        let t_roof = roof.cell_temperature(1000.0, 25.0, 1.0);
        let t_ground = ground.cell_temperature(1000.0, 25.0, 1.0);
        assert!(t_roof > t_ground);
        // Open rack at 1000 W/m², 25 °C, 1 m/s
        assert!((t_ground - 54.4).abs() < 0.5, "{t_ground}");
    }

    #[test]
    fn test_wind_cools() {
        let p = SapmParams::OPEN_RACK_GLASS_POLYMER;
        assert!(p.cell_temperature(800.0, 20.0, 6.0) < p.cell_temperature(800.0, 20.0, 0.5));
    }
}
