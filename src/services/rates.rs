//! Ratio and rounding rules shared by reports and dashboards. A zero
//! denominator always yields 0.

/// `round(part / whole * 100)`, clamped to `0..=100`.
pub(crate) fn percentage(part: i64, whole: i64) -> i64 {
    if whole <= 0 || part <= 0 {
        return 0;
    }
    let value = (part as f64 / whole as f64 * 100.0).round() as i64;
    value.clamp(0, 100)
}

/// Rounds an optional average to one decimal place; missing data is 0.
pub(crate) fn one_decimal(value: Option<f64>) -> f64 {
    match value {
        Some(value) if value.is_finite() => (value * 10.0).round() / 10.0,
        _ => 0.0,
    }
}

pub(crate) fn two_decimals(value: f64) -> f64 {
    if value.is_finite() {
        (value * 100.0).round() / 100.0
    } else {
        0.0
    }
}
