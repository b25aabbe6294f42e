//! Curve canonicalization: one raw curve-like object in, one [`RocCurve`] out.
//!
//! Ingestion is strict: `fpr` must already be ascending and both axes must
//! lie in `[0, 1]`. The lenient path (clamping small decreases) belongs to the
//! validator, never to ingestion.

use serde_json::{Map, Value};

use crate::curve::{BandLevel, ConfidenceBand, CurveKind, RocCurve};
use crate::guard::{coerce_number, coerce_number_array, coerce_threshold, json_kind};
use crate::{Result, RocError};

/// Keys accepted for a band's confidence level, in priority order.
const LEVEL_KEYS: [&str; 3] = ["level", "confidence_level", "credible_level"];

/// Already-typed pieces of a curve, as assembled by the CSV parser or by
/// callers building curves programmatically.
#[derive(Debug, Clone, Default)]
pub struct CurveParts {
    pub name: Option<String>,
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub threshold: Option<Vec<Option<f64>>>,
    pub bands: Vec<ConfidenceBand>,
    pub metadata: Option<Map<String, Value>>,
}

/// Assemble a canonical curve from typed parts.
///
/// Trims the name (dropping it when blank), sorts bands into canonical order
/// and verifies every invariant listed on [`RocCurve`].
///
/// # Errors
///
/// [`RocError::Shape`] naming `context` and the offending field.
pub fn canonicalize(parts: CurveParts, context: &str) -> Result<RocCurve> {
    let mut bands = parts.bands;
    bands.sort_by(|a, b| a.level.canonical_cmp(&b.level));

    let curve = RocCurve {
        kind: CurveKind::Roc,
        name: parts
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        fpr: parts.fpr,
        tpr: parts.tpr,
        threshold: parts.threshold,
        bands,
        metadata: parts.metadata,
    };
    curve.check(context)?;
    Ok(curve)
}

/// Convert one curve-like JSON object into a canonical curve.
///
/// `id_hint` names the curve in error messages; when absent the object's own
/// `curve_id` or `name` is used, else `"curve"`.
///
/// Accepted input: `fpr`/`tpr` as arrays of numbers or numeric strings,
/// optional `type` (must be `"ROC"`), `name`, `threshold` (entries may be
/// `null` or ±infinity), `bands` and `metadata`.
pub fn to_canonical(input: &Value, id_hint: Option<&str>) -> Result<RocCurve> {
    let Value::Object(obj) = input else {
        return Err(RocError::Shape(format!(
            "ROC curve must be an object, got {}.",
            json_kind(input)
        )));
    };

    let context = id_hint
        .map(str::to_string)
        .or_else(|| string_field(obj, "curve_id"))
        .or_else(|| string_field(obj, "name"))
        .unwrap_or_else(|| "curve".to_string());

    if let Some(kind) = obj.get("type") {
        if kind.as_str() != Some("ROC") {
            return Err(RocError::Shape(format!("{context}.type must be \"ROC\".")));
        }
    }

    let fpr = coerce_number_array(obj.get("fpr"), &format!("{context}.fpr"))?;
    let tpr = coerce_number_array(obj.get("tpr"), &format!("{context}.tpr"))?;
    if tpr.len() != fpr.len() {
        return Err(RocError::Shape(format!(
            "{context} has mismatched fpr/tpr lengths ({} vs {}).",
            fpr.len(),
            tpr.len()
        )));
    }

    let threshold = match obj.get("threshold") {
        None => None,
        Some(Value::Array(items)) => {
            let label = format!("{context}.threshold");
            if items.len() != fpr.len() {
                return Err(RocError::Shape(format!(
                    "{label} length must match fpr/tpr length ({} vs {}).",
                    items.len(),
                    fpr.len()
                )));
            }
            Some(
                items
                    .iter()
                    .enumerate()
                    .map(|(idx, v)| coerce_threshold(v, &label, idx))
                    .collect::<Result<Vec<_>>>()?,
            )
        }
        Some(_) => {
            return Err(RocError::Shape(format!(
                "{context}.threshold must be an array."
            )))
        }
    };

    let bands = match obj.get("bands") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(idx, band)| normalize_band(band, idx, fpr.len(), &context))
            .collect::<Result<Vec<_>>>()?,
        Some(_) => {
            return Err(RocError::Shape(format!("{context}.bands must be an array.")))
        }
    };

    let metadata = match obj.get("metadata") {
        Some(Value::Object(meta)) => Some(meta.clone()),
        _ => None,
    };

    let curve = canonicalize(
        CurveParts {
            name: obj.get("name").and_then(Value::as_str).map(str::to_string),
            fpr,
            tpr,
            threshold,
            bands,
            metadata,
        },
        &context,
    )?;
    log::trace!("canonicalized {context}: {} points", curve.len());
    Ok(curve)
}

/// Read a curve-like JSON object without enforcing ordering, ranges or
/// length agreement between `fpr` and `tpr`.
///
/// Values must still be numeric. This feeds the validator, which reports and
/// repairs what [`to_canonical`] would reject.
pub fn to_unchecked(input: &Value, id_hint: Option<&str>) -> Result<RocCurve> {
    let Value::Object(obj) = input else {
        return Err(RocError::Shape(format!(
            "ROC curve must be an object, got {}.",
            json_kind(input)
        )));
    };
    let context = id_hint.unwrap_or("curve");
    let fpr = coerce_number_array(obj.get("fpr"), &format!("{context}.fpr"))?;
    let tpr = coerce_number_array(obj.get("tpr"), &format!("{context}.tpr"))?;

    let mut curve = RocCurve::unchecked(fpr, tpr);
    curve.name = string_field(obj, "name");
    if let Some(Value::Array(items)) = obj.get("threshold") {
        let label = format!("{context}.threshold");
        curve.threshold = Some(
            items
                .iter()
                .enumerate()
                .map(|(idx, v)| coerce_threshold(v, &label, idx))
                .collect::<Result<Vec<_>>>()?,
        );
    }
    if let Some(Value::Array(items)) = obj.get("bands") {
        curve.bands = items
            .iter()
            .enumerate()
            .map(|(idx, band)| normalize_band(band, idx, curve.fpr.len(), context))
            .collect::<Result<Vec<_>>>()?;
    }
    if let Some(Value::Object(meta)) = obj.get("metadata") {
        curve.metadata = Some(meta.clone());
    }
    Ok(curve)
}

fn normalize_band(band: &Value, idx: usize, len: usize, context: &str) -> Result<ConfidenceBand> {
    let label = format!("{context}.bands[{idx}]");
    let Value::Object(obj) = band else {
        return Err(RocError::Shape(format!("{label} must be an object.")));
    };

    let source = LEVEL_KEYS
        .iter()
        .filter_map(|key| obj.get(*key))
        .find(|v| !v.is_null());
    let level = match source {
        Some(v @ Value::Number(_)) => Some(BandLevel::Numeric(coerce_number(
            v,
            &format!("{label}.level"),
            0,
        )?)),
        Some(Value::String(s)) => BandLevel::from_token(s),
        _ => None,
    }
    .ok_or_else(|| RocError::Shape(format!("{label}.level must be a number or a label.")))?;

    let lower = coerce_number_array(obj.get("lower"), &format!("{label}.lower"))?;
    let upper = coerce_number_array(obj.get("upper"), &format!("{label}.upper"))?;
    if lower.len() != len || upper.len() != len {
        return Err(RocError::Shape(format!(
            "{label} arrays must match fpr/tpr length {len} (lower {}, upper {}).",
            lower.len(),
            upper.len()
        )));
    }
    Ok(ConfidenceBand { level, lower, upper })
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
