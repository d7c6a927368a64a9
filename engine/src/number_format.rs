//! FILENAME: engine/src/number_format.rs
//! PURPOSE: Print formatters for numeric columns.
//! CONTEXT: A column carries a `NumberFormat`; `get_string` renders each row
//! through it. Derived window columns switch to `Ints`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NumberFormat {
    /// Shortest readable form; scientific notation for very large or very
    /// small magnitudes.
    #[default]
    General,
    /// Plain integer digits, never scientific notation.
    Ints,
}

pub fn format_number(value: f64, format: &NumberFormat) -> String {
    match format {
        NumberFormat::General => format_general(value),
        NumberFormat::Ints => format!("{:.0}", value.trunc()),
    }
}

/// Exact for the whole i64 range under `Ints`; `General` switches to
/// scientific notation at ten digits, like `format_number`.
pub fn format_integer(value: i64, format: &NumberFormat) -> String {
    match format {
        NumberFormat::Ints => value.to_string(),
        NumberFormat::General if value.unsigned_abs() < 10_000_000_000 => value.to_string(),
        NumberFormat::General => format_general(value as f64),
    }
}

fn format_general(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let abs_value = value.abs();
    if abs_value >= 1e10 || abs_value < 1e-4 {
        let formatted = format!("{:.5e}", value);
        // Trim the mantissa only; "1.50000e10" must keep its exponent
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) => format!("{}e{}", trim_fraction(mantissa), exponent),
            None => formatted,
        };
    }

    if value.fract() == 0.0 {
        return format!("{:.0}", value);
    }
    trim_fraction(&format!("{:.10}", value)).to_string()
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
