//! Reshape per-device model output into the report's time resolutions.
//!
//! Power values are W at a half-hourly cadence, so a sample's energy is
//! `power · 0.5 h`; `/ 2000` converts a half-hour of W into kWh.

use chrono::NaiveDate;
use itertools::Itertools;
use std::collections::BTreeMap;

use crate::domain::{
    floor_to, half_hour, DeviceEnergyRecord, DevicePowerRecord, PlantEnergyRecord, PlantPowerRecord,
};
use crate::model::ArrayIrradiance;

/// kWh in half an hour at 1 W
const HALF_HOUR_W_TO_KWH: f64 = 0.5 / 1000.0;

/// Energy over a series of half-hourly power samples, kWh
pub fn power_to_kwh_energy(powers: impl IntoIterator<Item = f64>) -> f64 {
    powers.into_iter().sum::<f64>() * HALF_HOUR_W_TO_KWH
}

/// Device output with night tare and other negative values zeroed
pub fn device_power_records(
    device_id: i64,
    ac: &[(chrono::NaiveDateTime, f64)],
) -> Vec<DevicePowerRecord> {
    ac.iter()
        .map(|(timestamp, power)| DevicePowerRecord {
            timestamp: *timestamp,
            theoretical_w: power.max(0.0),
            device_id,
        })
        .collect()
}

/// Sum of all devices per half-hour bin.
///
/// The grid runs from the first to the last bin without holes; bins no
/// device reported into are written as 0 W.
pub fn plant_power(devices: &[DevicePowerRecord], plant_id: i64) -> Vec<PlantPowerRecord> {
    let mut bins: BTreeMap<chrono::NaiveDateTime, f64> = BTreeMap::new();
    for record in devices {
        *bins.entry(floor_to(record.timestamp, half_hour())).or_default() += record.theoretical_w;
    }

    let (Some(&first), Some(&last)) = (bins.keys().next(), bins.keys().next_back()) else {
        return Vec::new();
    };

    std::iter::successors(Some(first), |t| Some(*t + half_hour()))
        .take_while(|t| *t <= last)
        .map(|timestamp| PlantPowerRecord {
            timestamp,
            theoretical_w: bins.get(&timestamp).copied().unwrap_or(0.0),
            plant_id,
        })
        .collect()
}

/// Daily energy incident on the arrays, kWh, weighted by each array's kWp
pub fn poa_daily_energy<'a>(
    arrays: impl IntoIterator<Item = (f64, &'a [ArrayIrradiance])>,
) -> BTreeMap<NaiveDate, f64> {
    let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (kwp, series) in arrays {
        for sample in series {
            *days.entry(sample.timestamp.date()).or_default() += kwp * sample.poa_global / 2000.0;
        }
    }
    days
}

/// Daily plant energy joined with that day's incident energy.
///
/// Every calendar day between the first and last sample gets a row; days
/// without power are 0 kWh and keep whatever POA energy was recorded.
pub fn plant_energy(
    power: &[PlantPowerRecord],
    poa_daily: &BTreeMap<NaiveDate, f64>,
    plant_id: i64,
) -> Vec<PlantEnergyRecord> {
    let daily: BTreeMap<NaiveDate, f64> = power
        .iter()
        .into_group_map_by(|r| r.timestamp.date())
        .into_iter()
        .map(|(date, records)| (date, records.iter().map(|r| r.theoretical_w).sum::<f64>() / 2000.0))
        .collect();

    let (Some(&first), Some(&last)) = (daily.keys().next(), daily.keys().next_back()) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| PlantEnergyRecord {
            date,
            theoretical_kwh: daily.get(&date).copied().unwrap_or(0.0),
            poa_energy_kwh: poa_daily.get(&date).copied(),
            plant_id,
        })
        .collect()
}

/// Daily energy per device, ordered by device then date
pub fn device_energy(power: &[DevicePowerRecord]) -> Vec<DeviceEnergyRecord> {
    power
        .iter()
        .into_group_map_by(|r| (r.device_id, r.timestamp.date()))
        .into_iter()
        .sorted_by_key(|(key, _)| *key)
        .map(|((device_id, date), records)| DeviceEnergyRecord {
            date,
            energy_kwh: power_to_kwh_energy(records.iter().map(|r| r.theoretical_w)),
            device_id,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 5, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn two_day_series(device_id: i64, scale: f64) -> Vec<DevicePowerRecord> {
        (0..96)
            .map(|i| DevicePowerRecord {
                timestamp: t0() + Duration::minutes(30 * i),
                theoretical_w: scale * (i % 48) as f64,
                device_id,
            })
            .collect()
    }

    #[test]
    fn test_negative_power_is_clamped() {
        let ac = vec![(t0(), -0.9), (t0() + Duration::minutes(30), 1200.0)];
        let records = device_power_records(7, &ac);
        assert_eq!(records[0].theoretical_w, 0.0);
        assert_eq!(records[1].theoretical_w, 1200.0);
        assert!(records.iter().all(|r| r.device_id == 7));
    }

    #[test]
    fn test_plant_power_sums_devices_per_bin() {
        let mut devices = two_day_series(1, 100.0);
        devices.extend(two_day_series(2, 50.0));
        let plant = plant_power(&devices, 9);

        assert_eq!(plant.len(), 96);
        assert_eq!(plant[10].theoretical_w, 1500.0);
        assert_eq!(plant[10].timestamp, t0() + Duration::minutes(300));
    }

    #[test]
    fn test_unaligned_samples_share_a_bin() {
        let devices = vec![
            DevicePowerRecord { timestamp: t0() + Duration::minutes(35), theoretical_w: 10.0, device_id: 1 },
            DevicePowerRecord { timestamp: t0() + Duration::minutes(50), theoretical_w: 5.0, device_id: 2 },
        ];
        let plant = plant_power(&devices, 1);
        assert_eq!(plant.len(), 1);
        assert_eq!(plant[0].timestamp, t0() + Duration::minutes(30));
        assert_eq!(plant[0].theoretical_w, 15.0);
    }

    #[test]
    fn test_gaps_are_filled_with_zero() {
        let at = |minutes: i64, w: f64| DevicePowerRecord {
            timestamp: t0() + Duration::minutes(minutes),
            theoretical_w: w,
            device_id: 1,
        };
        let devices = vec![at(600, 800.0), at(690, 400.0), at(600 + 2 * 1440, 200.0)];

        let plant = plant_power(&devices, 3);
        // 10:00 on the first day to 10:00 two days later
        assert_eq!(plant.len(), 97);
        assert_eq!(plant[1].timestamp, t0() + Duration::minutes(630));
        assert_eq!(plant[1].theoretical_w, 0.0);
        assert_eq!(plant[3].theoretical_w, 400.0);
        assert_eq!(plant[96].theoretical_w, 200.0);

        let mut poa = BTreeMap::new();
        poa.insert(t0().date(), 5.0);
        let daily = plant_energy(&plant, &poa, 3);
        let dates: Vec<_> = daily.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![t0().date(), t0().date() + Duration::days(1), t0().date() + Duration::days(2)]);
        assert_eq!(daily[1].theoretical_kwh, 0.0);
        assert_eq!(daily[1].poa_energy_kwh, None);
        assert_eq!(daily[0].poa_energy_kwh, Some(5.0));
        assert!((daily[0].theoretical_kwh - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_plant_energy_fills_missing_days() {
        let power = vec![
            PlantPowerRecord { timestamp: t0(), theoretical_w: 2000.0, plant_id: 1 },
            PlantPowerRecord { timestamp: t0() + Duration::days(3), theoretical_w: 4000.0, plant_id: 1 },
        ];
        let daily = plant_energy(&power, &BTreeMap::new(), 1);
        assert_eq!(daily.len(), 4);
        assert_eq!(daily[0].theoretical_kwh, 1.0);
        assert_eq!(daily[1].theoretical_kwh, 0.0);
        assert_eq!(daily[2].theoretical_kwh, 0.0);
        assert_eq!(daily[3].theoretical_kwh, 2.0);
    }

    #[test]
    fn test_daily_energy_is_scale_consistent() {
        let mut devices = two_day_series(1, 100.0);
        devices.extend(two_day_series(2, 50.0));

        let plant = plant_power(&devices, 9);
        let daily = plant_energy(&plant, &BTreeMap::new(), 9);
        let per_device = device_energy(&devices);

        assert_eq!(daily.len(), 2);
        assert_eq!(per_device.len(), 4);

        for day in &daily {
            let device_total: f64 = per_device
                .iter()
                .filter(|d| d.date == day.date)
                .map(|d| d.energy_kwh)
                .sum();
            assert!((device_total - day.theoretical_kwh).abs() < 1e-9);
        }

        // Σ (0..48) = 1128 -> 1128 · 150 W · 0.5 h = 84.6 kWh
        assert!((daily[0].theoretical_kwh - 84.6).abs() < 1e-9);
        assert_eq!(daily[0].poa_energy_kwh, None);
    }

    #[test]
    fn test_device_energy_order() {
        let mut devices = two_day_series(2, 1.0);
        devices.extend(two_day_series(1, 1.0));
        let keys: Vec<_> = device_energy(&devices).iter().map(|d| (d.device_id, d.date)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_poa_energy_weighted_by_kwp() {
        let series: Vec<ArrayIrradiance> = (0..4)
            .map(|i| ArrayIrradiance {
                timestamp: t0() + Duration::hours(12) + Duration::minutes(30 * i),
                poa_global: 1000.0,
                poa_direct: 800.0,
            })
            .collect();

        let days = poa_daily_energy([(10.0, series.as_slice()), (5.0, series.as_slice())]);
        // (10 + 5) kWp · 1 kW/m² · 4 half-hours · 0.5 h
        assert!((days[&t0().date()] - 30.0).abs() < 1e-9);

        let power = vec![PlantPowerRecord { timestamp: t0() + Duration::hours(12), theoretical_w: 2000.0, plant_id: 3 }];
        let energy = plant_energy(&power, &days, 3);
        assert_eq!(energy[0].poa_energy_kwh, Some(days[&t0().date()]));
        assert_eq!(energy[0].theoretical_kwh, 1.0);
    }
}
