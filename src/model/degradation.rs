use chrono::NaiveDateTime;

use crate::config::DegradationConfig;

const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_YEAR: f64 = 365.0;

/// Share of nameplate output left after module ageing.
///
/// Ageing follows `first_year_rate` per year during the first year and
/// `second_year_rate` per year afterwards. Instants before `installed`
/// carry no loss, and the factor never drops below zero.
pub fn module_degradation_factor(
    installed: NaiveDateTime,
    now: NaiveDateTime,
    first_year_rate: f64,
    second_year_rate: f64,
) -> f64 {
    let elapsed_years =
        (now - installed).num_seconds() as f64 / SECONDS_PER_DAY / DAYS_PER_YEAR;

    let degradation = if elapsed_years < 1.0 {
        first_year_rate * elapsed_years
    } else {
        first_year_rate + (elapsed_years - 1.0) * second_year_rate
    };

    if degradation > 0.0 {
        (1.0 - degradation).max(0.0)
    } else {
        1.0
    }
}

/// Factor for every timestamp of a series
pub fn degradation_series(
    installed: NaiveDateTime,
    times: impl IntoIterator<Item = NaiveDateTime>,
    rates: DegradationConfig,
) -> Vec<f64> {
    times
        .into_iter()
        .map(|t| module_degradation_factor(installed, t, rates.first_year_rate, rates.second_year_rate))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;
    use rstest::rstest;

    const FIRST: f64 = 0.025;
    const SECOND: f64 = 0.007;

    fn installed() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[rstest]
    #[case(0, 1.0)]
    #[case(365, 1.0 - FIRST)]
    #[case(730, 1.0 - FIRST - SECOND)]
    #[case(365 * 3, 1.0 - FIRST - 2.0 * SECOND)]
    fn test_schedule(#[case] days: i64, #[case] expected: f64) {
        let now = installed() + Duration::days(days);
        let f = module_degradation_factor(installed(), now, FIRST, SECOND);
        assert!((f - expected).abs() < 1e-12, "{days} days -> {f}");
    }

    #[test]
    fn test_half_year() {
        let now = installed() + Duration::days(365 / 2) + Duration::hours(12);
        let f = module_degradation_factor(installed(), now, FIRST, SECOND);
        assert!((f - (1.0 - FIRST / 2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_before_installation_has_no_loss() {
        let now = installed() - Duration::days(10);
        assert_eq!(module_degradation_factor(installed(), now, FIRST, SECOND), 1.0);
    }

    #[test]
    fn test_floor_at_zero() {
        let now = installed() + Duration::days(365 * 200);
        assert_eq!(module_degradation_factor(installed(), now, FIRST, SECOND), 0.0);
    }

    #[test]
    fn test_series() {
        let times = (0..3).map(|d| installed() + Duration::days(d * 365));
        let factors = degradation_series(installed(), times, DegradationConfig::default());
        assert_eq!(factors.len(), 3);
        assert_eq!(factors[0], 1.0);
        assert!(factors[1] > factors[2]);
    }

    proptest! {
        #[test]
        fn prop_strictly_decreasing(a in 1i64..(60 * 365 * 24), b in 1i64..(60 * 365 * 24)) {
            prop_assume!(a != b);
            let (early, late) = if a < b { (a, b) } else { (b, a) };
            let f_early = module_degradation_factor(installed(), installed() + Duration::hours(early), FIRST, SECOND);
            let f_late = module_degradation_factor(installed(), installed() + Duration::hours(late), FIRST, SECOND);
            prop_assert!(f_late < f_early);
            prop_assert!(f_early <= 1.0);
        }
    }
}
