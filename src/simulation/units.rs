//! Unit conversions and simple finance helpers. Results are rounded to two decimals.

use chrono::{Datelike, Local};

pub const KM_PER_MILE: f64 = 1.60934;
pub const DEFAULT_DEPRECIATION_RATE: f64 = 0.15;
/// The value of a car never drops below this share of its original price.
pub const MIN_RESIDUAL_VALUE: f64 = 0.1;
pub const VINTAGE_AGE: i32 = 25;

fn round2(value: f64) -> f64 {
    (value * 100.).round() / 100.
}

pub fn current_year() -> i32 {
    Local::now().year()
}

/// Distance per unit of fuel. Returns 0 if no fuel was consumed.
pub fn fuel_efficiency(distance: f64, fuel_consumed: f64) -> f64 {
    if fuel_consumed == 0. {
        return 0.;
    }
    round2(distance / fuel_consumed)
}

pub fn miles_to_km(miles: f64) -> f64 {
    round2(miles * KM_PER_MILE)
}

pub fn km_to_miles(km: f64) -> f64 {
    round2(km / KM_PER_MILE)
}

pub fn mph_to_kmh(mph: f64) -> f64 {
    round2(mph * KM_PER_MILE)
}

pub fn kmh_to_mph(kmh: f64) -> f64 {
    round2(kmh / KM_PER_MILE)
}

// i64 so that no pair of years can overflow
fn age(year: i32, current_year: i32) -> i64 {
    i64::from(current_year) - i64::from(year)
}

pub fn format_age(year: i32) -> String {
    format_age_at(year, current_year())
}

pub fn format_age_at(year: i32, current_year: i32) -> String {
    match age(year, current_year) {
        0 => "Brand new".to_string(),
        1 => "1 year old".to_string(),
        age => format!("{age} years old"),
    }
}

pub fn is_vintage(year: i32) -> bool {
    is_vintage_at(year, current_year())
}

pub fn is_vintage_at(year: i32, current_year: i32) -> bool {
    age(year, current_year) >= i64::from(VINTAGE_AGE)
}

/// `original_price * (1 - rate)^age`, but at least 10% of the original price.
pub fn depreciated_value(original_price: f64, year: i32, rate: f64) -> f64 {
    depreciated_value_at(original_price, year, rate, current_year())
}

pub fn depreciated_value_at(original_price: f64, year: i32, rate: f64, current_year: i32) -> f64 {
    let age = age(year, current_year).clamp(i32::MIN.into(), i32::MAX.into()) as i32;
    let value = original_price * (1. - rate).powi(age);
    round2(value.max(original_price * MIN_RESIDUAL_VALUE))
}

#[cfg(test)]
mod tests {
    use crate::simulation::units::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn fuel_efficiency_rounds() {
        assert_eq!(fuel_efficiency(500., 40.), 12.5);
        assert_eq!(fuel_efficiency(100., 3.), 33.33);
    }

    #[test]
    fn fuel_efficiency_without_fuel() {
        assert_eq!(fuel_efficiency(500., 0.), 0.);
    }

    #[test]
    fn conversions() {
        assert_eq!(mph_to_kmh(60.), 96.56);
        assert_eq!(km_to_miles(100.), 62.14);
        assert_eq!(miles_to_km(1.), 1.61);
        assert_eq!(kmh_to_mph(160.934), 100.);
    }

    #[test]
    fn conversions_round_trip() {
        for x in [0., 1., 12.5, 60., 100., 333.33, 1000.] {
            assert_approx_eq!(km_to_miles(miles_to_km(x)), x, 0.02);
            assert_approx_eq!(mph_to_kmh(kmh_to_mph(x)), x, 0.02);
        }
    }

    #[test]
    fn format_age_special_cases() {
        assert_eq!(format_age_at(2026, 2026), "Brand new");
        assert_eq!(format_age_at(2025, 2026), "1 year old");
        assert_eq!(format_age_at(2000, 2026), "26 years old");
    }

    #[test]
    fn format_age_uses_current_year() {
        assert_eq!(format_age(current_year()), "Brand new");
    }

    #[test]
    fn vintage() {
        assert!(is_vintage_at(2000, 2025));
        assert!(!is_vintage_at(2001, 2025));
        assert!(is_vintage(1950));
    }

    #[test]
    fn depreciation() {
        assert_eq!(depreciated_value_at(100_000., 2024, 0.15, 2024), 100_000.);
        assert_eq!(depreciated_value_at(100_000., 2023, 0.15, 2024), 85_000.);
        assert_eq!(depreciated_value_at(100_000., 2022, 0.15, 2024), 72_250.);
    }

    #[test]
    fn extreme_years_do_not_overflow() {
        assert_eq!(format_age_at(i32::MIN, i32::MAX), "4294967295 years old");
        assert_eq!(format_age_at(i32::MAX, i32::MIN), "-4294967295 years old");
        assert!(is_vintage_at(i32::MIN, 2024));
        assert!(!is_vintage_at(i32::MAX, i32::MIN));
        assert_eq!(depreciated_value_at(100_000., i32::MIN, 0.15, 2024), 10_000.);
    }

    #[test]
    fn depreciation_floor() {
        assert_eq!(depreciated_value_at(20_000., 1990, 0.15, 2024), 2_000.);
    }

    #[test]
    fn depreciation_is_monotonic() {
        let mut last = f64::MAX;
        for age in 0..40 {
            let value = depreciated_value_at(50_000., 2024 - age, DEFAULT_DEPRECIATION_RATE, 2024);
            assert!(value <= last);
            assert!(value >= 5_000.);
            last = value;
        }
    }
}
