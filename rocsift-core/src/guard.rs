//! Numeric coercion and array guards shared by every ingestion path.
//!
//! These helpers only know about generic shape rules (missing values,
//! non-numeric entries, ordering, bounds). Curve-level business rules live in
//! [`crate::canonical`].

use serde_json::Value;

use crate::{Result, RocError};

/// Parse a trimmed decimal string, returning `None` when it is not a number.
///
/// Accepts everything `f64::from_str` accepts, including `inf` / `Infinity`.
pub fn parse_number_str(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn coerce_raw(value: &Value, label: &str, index: usize) -> Result<f64> {
    match value {
        Value::Null => Err(RocError::Shape(format!(
            "{label} has missing value at index {index}."
        ))),
        Value::Number(n) => n.as_f64().ok_or_else(|| {
            RocError::Shape(format!("{label} has invalid numeric value at index {index}."))
        }),
        Value::String(s) => {
            if s.trim().is_empty() {
                return Err(RocError::Shape(format!(
                    "{label} has missing value at index {index}."
                )));
            }
            parse_number_str(s).ok_or_else(|| {
                RocError::Shape(format!(
                    "{label} has invalid numeric value at index {index} ({s:?})."
                ))
            })
        }
        other => Err(RocError::Shape(format!(
            "{label} has non-numeric {} at index {index}.",
            json_kind(other)
        ))),
    }
}

/// Coerce a single JSON value (number or numeric string) to a finite `f64`.
///
/// # Errors
///
/// `null`, empty strings, booleans, arrays, objects, unparseable strings and
/// non-finite results are all rejected with a message naming `label[index]`.
pub fn coerce_number(value: &Value, label: &str, index: usize) -> Result<f64> {
    let num = coerce_raw(value, label, index)?;
    if !num.is_finite() {
        return Err(RocError::Shape(format!(
            "{label} has non-finite value at index {index}."
        )));
    }
    Ok(num)
}

/// Coerce a JSON array into a non-empty vector of finite numbers.
///
/// `None` (field absent) and non-array values are rejected.
pub fn coerce_number_array(value: Option<&Value>, label: &str) -> Result<Vec<f64>> {
    let items = match value {
        Some(Value::Array(items)) => items,
        _ => return Err(RocError::Shape(format!("{label} must be an array."))),
    };
    if items.is_empty() {
        return Err(RocError::Shape(format!(
            "{label} must contain at least one value."
        )));
    }
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| coerce_number(item, label, idx))
        .collect()
}

/// Coerce one threshold entry.
///
/// `null` and blank strings mean "no finite threshold here" and map to
/// `None`. Infinite values are kept; NaN is rejected.
pub fn coerce_threshold(value: &Value, label: &str, index: usize) -> Result<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        other => {
            let num = coerce_raw(other, label, index)?;
            if num.is_nan() {
                return Err(RocError::Shape(format!(
                    "{label} has NaN at index {index}."
                )));
            }
            Ok(Some(num))
        }
    }
}

/// Assert that `values` is non-decreasing.
pub fn assert_ascending(values: &[f64], label: &str) -> Result<()> {
    for i in 1..values.len() {
        if values[i] < values[i - 1] {
            return Err(RocError::Shape(format!(
                "{label} must be sorted in ascending order (index {i}: {} < {}).",
                values[i],
                values[i - 1]
            )));
        }
    }
    Ok(())
}

/// Assert that every value lies in `[min, max]`.
pub fn assert_within(values: &[f64], label: &str, min: f64, max: f64) -> Result<()> {
    for (idx, &value) in values.iter().enumerate() {
        if value < min || value > max {
            return Err(RocError::Shape(format!(
                "{label} must be within [{min}, {max}] (invalid value {value} at index {idx})."
            )));
        }
    }
    Ok(())
}

/// Assert that every value is finite (no NaN, no infinity).
pub fn assert_finite(values: &[f64], label: &str) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(idx) => Err(RocError::Shape(format!(
            "{label} has non-finite value at index {idx}."
        ))),
        None => Ok(()),
    }
}

/// Assert that `values` has exactly `expected` entries.
pub fn assert_len(values: usize, expected: usize, label: &str) -> Result<()> {
    if values != expected {
        return Err(RocError::Shape(format!(
            "{label} length {values} does not match fpr/tpr length {expected}."
        )));
    }
    Ok(())
}

/// Parse an optional numeric CSV cell. Missing or blank cells yield `None`.
///
/// # Errors
///
/// Any non-blank cell that is not a finite number.
pub fn parse_optional_cell(cell: Option<&str>, label: &str, row: usize) -> Result<Option<f64>> {
    let Some(cell) = cell else {
        return Ok(None);
    };
    if cell.trim().is_empty() {
        return Ok(None);
    }
    match parse_number_str(cell) {
        Some(num) if num.is_finite() => Ok(Some(num)),
        _ => Err(RocError::Parse(format!(
            "{label} must be numeric on row {row} (got {:?}).",
            cell.trim()
        ))),
    }
}

/// Parse a required numeric CSV cell.
pub fn parse_required_cell(cell: Option<&str>, label: &str, row: usize) -> Result<f64> {
    parse_optional_cell(cell, label, row)?
        .ok_or_else(|| RocError::Parse(format!("{label} is required on row {row}.")))
}

/// Parse a threshold CSV cell: like [`parse_optional_cell`] but ±infinity is
/// accepted as an open-ended decision boundary.
pub fn parse_threshold_cell(cell: Option<&str>, label: &str, row: usize) -> Result<Option<f64>> {
    let Some(cell) = cell else {
        return Ok(None);
    };
    if cell.trim().is_empty() {
        return Ok(None);
    }
    match parse_number_str(cell) {
        Some(num) if !num.is_nan() => Ok(Some(num)),
        _ => Err(RocError::Parse(format!(
            "{label} must be numeric on row {row} (got {:?}).",
            cell.trim()
        ))),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_accepts_numbers_and_trimmed_strings() {
        let v = json!([0, "0.25", " 1 "]);
        let out = coerce_number_array(Some(&v), "c.fpr").unwrap();
        assert_eq!(out, vec![0.0, 0.25, 1.0]);
    }

    #[test]
    fn coerce_rejects_missing_entries() {
        let v = json!([0, null, 1]);
        let err = coerce_number_array(Some(&v), "c.fpr").unwrap_err();
        assert!(err.to_string().contains("c.fpr has missing value at index 1"));

        let v = json!([0, "  "]);
        assert!(coerce_number_array(Some(&v), "c.fpr").is_err());
    }

    #[test]
    fn coerce_rejects_non_finite_and_garbage() {
        assert!(coerce_number(&json!("Infinity"), "x", 0).is_err());
        assert!(coerce_number(&json!("abc"), "x", 0).is_err());
        assert!(coerce_number(&json!(true), "x", 0).is_err());
        assert!(coerce_number(&json!([1]), "x", 0).is_err());
    }

    #[test]
    fn coerce_array_requires_array_and_values() {
        assert!(coerce_number_array(None, "c.tpr").is_err());
        assert!(coerce_number_array(Some(&json!("0,1")), "c.tpr").is_err());
        let err = coerce_number_array(Some(&json!([])), "c.tpr").unwrap_err();
        assert!(err.to_string().contains("at least one value"));
    }

    #[test]
    fn threshold_keeps_null_and_infinity() {
        assert_eq!(coerce_threshold(&json!(null), "t", 0).unwrap(), None);
        assert_eq!(coerce_threshold(&json!(""), "t", 0).unwrap(), None);
        assert_eq!(
            coerce_threshold(&json!("Infinity"), "t", 0).unwrap(),
            Some(f64::INFINITY)
        );
        assert_eq!(
            coerce_threshold(&json!("-inf"), "t", 0).unwrap(),
            Some(f64::NEG_INFINITY)
        );
        assert_eq!(coerce_threshold(&json!(0.5), "t", 0).unwrap(), Some(0.5));
        assert!(coerce_threshold(&json!("NaN"), "t", 0).is_err());
    }

    #[test]
    fn ascending_and_range_guards() {
        assert!(assert_ascending(&[0.0, 0.0, 0.5, 1.0], "fpr").is_ok());
        assert!(assert_ascending(&[0.0, 0.5, 0.3], "fpr").is_err());
        assert!(assert_within(&[0.0, 1.0], "tpr", 0.0, 1.0).is_ok());
        assert!(assert_within(&[0.0, 1.01], "tpr", 0.0, 1.0).is_err());
        assert!(assert_within(&[-0.1], "tpr", 0.0, 1.0).is_err());
    }

    #[test]
    fn csv_cells() {
        assert_eq!(parse_optional_cell(None, "x", 2).unwrap(), None);
        assert_eq!(parse_optional_cell(Some("  "), "x", 2).unwrap(), None);
        assert_eq!(parse_optional_cell(Some(" 0.5"), "x", 2).unwrap(), Some(0.5));
        assert!(parse_optional_cell(Some("inf"), "x", 2).is_err());

        let err = parse_required_cell(Some(""), "a.fpr", 7).unwrap_err();
        assert_eq!(err.to_string(), "parse error: a.fpr is required on row 7.");

        assert_eq!(
            parse_threshold_cell(Some("-inf"), "t", 3).unwrap(),
            Some(f64::NEG_INFINITY)
        );
        assert!(parse_threshold_cell(Some("nan"), "t", 3).is_err());
        assert!(parse_threshold_cell(Some("high"), "t", 3).is_err());
    }
}
