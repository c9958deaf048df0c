//! DC to AC conversion: the Sandia inverter model for catalogued inverters and
//! the PVWatts model as a fallback when only the AC rating is known.

use serde::{Deserialize, Serialize};

/// Sandia inverter coefficients as published in the CEC inverter list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandiaInverter {
    /// Maximum AC power, W
    #[serde(rename = "Paco")]
    pub paco: f64,
    /// DC power at which `paco` is reached, W
    #[serde(rename = "Pdco")]
    pub pdco: f64,
    /// DC voltage at which `paco` is reached, V
    #[serde(rename = "Vdco")]
    pub vdco: f64,
    /// DC power needed to start the inversion process, W
    #[serde(rename = "Pso")]
    pub pso: f64,
    #[serde(rename = "C0")]
    pub c0: f64,
    #[serde(rename = "C1")]
    pub c1: f64,
    #[serde(rename = "C2")]
    pub c2: f64,
    #[serde(rename = "C3")]
    pub c3: f64,
    /// Night tare, W
    #[serde(rename = "Pnt")]
    pub pnt: f64,
}

impl SandiaInverter {
    /// AC output for a DC input at voltage `v_dc`
    pub fn ac_power(&self, v_dc: f64, p_dc: f64) -> f64 {
        let dv = v_dc - self.vdco;
        let a = self.pdco * (1.0 + self.c1 * dv);
        let b = self.pso * (1.0 + self.c2 * dv);
        let c = self.c0 * (1.0 + self.c3 * dv);

        if p_dc < self.pso {
            return -self.pnt.abs();
        }

        let ac = (self.paco / (a - b) - c * (a - b)) * (p_dc - b) + c * (p_dc - b).powi(2);
        ac.min(self.paco)
    }
}

pub const PVWATTS_ETA_NOM: f64 = 0.96;
pub const PVWATTS_ETA_REF: f64 = 0.9637;

/// PVWatts inverter output for a DC input limit `pdc0`
pub fn pvwatts_ac(p_dc: f64, pdc0: f64) -> f64 {
    let pac0 = PVWATTS_ETA_NOM * pdc0;
    let zeta = p_dc / pdc0;

    let eta = if zeta > 0.0 {
        PVWATTS_ETA_NOM / PVWATTS_ETA_REF * (-0.0162 * zeta - 0.0059 / zeta + 0.9858)
    } else {
        0.0
    };

    (eta * p_dc).min(pac0).max(0.0)
}

/// Conversion model selected for one inverter
#[derive(Debug, Clone, PartialEq)]
pub enum InverterModel {
    Sandia(SandiaInverter),
    PvWatts { pdc0: f64 },
}

impl InverterModel {
    /// Fallback for inverters missing from the catalog: DC limit 2% above the AC rating
    pub fn pvwatts_from_ac_rating(ac_power_w: f64) -> Self {
        InverterModel::PvWatts { pdc0: ac_power_w * 1.02 }
    }

    /// AC output for the summed DC input of all arrays
    pub fn ac_power(&self, total_dc: f64) -> f64 {
        match self {
            // No voltage from the DC model; evaluate at the reference voltage
            InverterModel::Sandia(params) => params.ac_power(params.vdco, total_dc),
            InverterModel::PvWatts { pdc0 } => pvwatts_ac(total_dc, *pdc0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InverterModel::Sandia(_) => "sandia",
            InverterModel::PvWatts { .. } => "pvwatts",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sandia() -> SandiaInverter {
        SandiaInverter {
            paco: 3000.0,
            pdco: 3127.0,
            vdco: 380.0,
            pso: 18.0,
            c0: -8.0e-6,
            c1: 4.0e-5,
            c2: 1.5e-3,
            c3: -2.0e-4,
            pnt: 0.9,
        }
    }

    #[test]
    fn test_sandia_reaches_paco_at_pdco() {
        let inv = sample_sandia();
        let ac = inv.ac_power(inv.vdco, inv.pdco);
        assert!((ac - inv.paco).abs() < 1e-6, "{ac}");
    }

    #[test]
    fn test_sandia_clips_and_tares() {
        let inv = sample_sandia();
        assert_eq!(inv.ac_power(inv.vdco, 10_000.0), inv.paco);
        assert_eq!(inv.ac_power(inv.vdco, 5.0), -0.9);
        let mid = inv.ac_power(inv.vdco, 1500.0);
        assert!(mid > 1350.0 && mid < 1500.0, "{mid}");
    }

    #[test]
    fn test_pvwatts_efficiency_and_limits() {
        let pdc0 = 10_000.0;
        assert_eq!(pvwatts_ac(0.0, pdc0), 0.0);
        assert_eq!(pvwatts_ac(20_000.0, pdc0), 9_600.0);
        let half = pvwatts_ac(5_000.0, pdc0);
        assert!(half / 5_000.0 > 0.94 && half / 5_000.0 < 0.97, "{half}");
    }

    #[test]
    fn test_fallback_rating() {
        let model = InverterModel::pvwatts_from_ac_rating(50_000.0);
        assert_eq!(model, InverterModel::PvWatts { pdc0: 51_000.0 });
        assert_eq!(model.name(), "pvwatts");
        assert!(model.ac_power(60_000.0) <= 0.96 * 51_000.0);
    }
}
