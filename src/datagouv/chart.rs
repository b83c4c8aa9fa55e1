//! Projection of tabular rows into a label/value bar series.
//!
//! Upstream cells are untyped, so labels and values are coerced the way the
//! presentation layer (a JavaScript chart widget) would read them.

use serde_json::{Number, Value};

use super::models::{ChartKind, ChartSeries, TabularRow};

/// Build a bar series from `rows`, in row order.
///
/// A row contributes only when both columns are present as keys; explicit
/// `null` or empty-string cells still count. Non-numeric values become `0`
/// instead of dropping the row, so `labels` and `values` always have the
/// same length.
pub fn project_series(rows: &[TabularRow], label_column: &str, value_column: &str) -> ChartSeries {
    let mut labels = Vec::new();
    let mut values = Vec::new();

    for row in rows {
        if let (Some(label), Some(value)) = (row.get(label_column), row.get(value_column)) {
            labels.push(label_text(label));
            values.push(numeric_value(value));
        }
    }

    ChartSeries {
        kind: ChartKind::Bar,
        labels,
        values,
        label: value_column.to_string(),
    }
}

/// String form of a cell, matching JavaScript's `String(value)`.
pub fn label_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => label_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Numeric form of a cell, matching JavaScript's `Number(value) || 0`.
///
/// Non-finite results are also reported as `0`: they have no JSON encoding.
pub fn numeric_value(value: &Value) -> f64 {
    let number = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_numeric_text(s),
        Value::Bool(true) => 1.0,
        Value::Bool(false) | Value::Null | Value::Object(_) => 0.0,
        // `[]` reads as 0, `["5"]` as 5, longer arrays as NaN.
        Value::Array(_) => parse_numeric_text(&label_text(value)),
    };

    if number.is_finite() {
        number
    } else {
        0.0
    }
}

fn parse_numeric_text(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let radix_prefixes = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)];
    for (prefix, radix) in radix_prefixes {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return parse_radix_digits(digits, radix);
        }
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Unsigned digits only. Folds into `f64` so long literals lose precision
/// instead of overflowing.
fn parse_radix_digits(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }

    let mut number = 0.0;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => number = number * radix as f64 + d as f64,
            None => return f64::NAN,
        }
    }
    number
}

fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }

    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.abs() >= 1e21 || f.abs() < 1e-6 => exponent_text(f),
        Some(f) if f.fract() == 0.0 => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// `1e+21`, `1.5e-7`: the exponent always carries a sign.
fn exponent_text(f: f64) -> String {
    let text = format!("{:e}", f);
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => text,
    }
}
