use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::MetricSample;

/// Tests that are never reported, matched on their exact name.
pub const SKIPPED_TESTS: &[&str] = &["Core WF default domain", "Core WF t2medium domain"];

pub fn is_skipped(name: &str) -> bool {
    SKIPPED_TESTS.contains(&name)
}

/// Mean of the reported success ratios. Null and zero entries are not samples;
/// when nothing is left the result is `0.0`, meaning "no data".
pub fn mean_success_ratio(samples: &[MetricSample]) -> f64 {
    let ratios: Vec<f64> = samples
        .iter()
        .filter_map(|s| s.success_ratio)
        .filter(|r| *r != 0.0)
        .collect();
    if ratios.is_empty() {
        return 0.0;
    }
    ratios.iter().sum::<f64>() / ratios.len() as f64
}

/// Round the exact binary value of `value` to `decimals` places, exact ties going to even.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    match Decimal::from_f64_retain(value) {
        Some(exact) => {
            let mut rounded = exact.round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven);
            rounded.rescale(decimals);
            rounded.mantissa() as f64 / factor
        }
        None => value,
    }
}

pub fn ratio_to_percentage(ratio: f64) -> f64 {
    round_to(ratio * 100.0, 3)
}

pub fn uptime_percentage(samples: &[MetricSample]) -> f64 {
    ratio_to_percentage(mean_success_ratio(samples))
}

/// Text shown in a grid cell: whole numbers keep one decimal (`100.0`), the
/// no-data value is a bare `0`.
pub fn format_percentage(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
