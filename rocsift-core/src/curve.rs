//! Canonical ROC curve data model.
//!
//! Every parser converges on [`RocCurve`]; consumers (chart renderers, the
//! exporters, the validator) only ever see this shape.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::guard::{self, assert_ascending, assert_finite, assert_len, assert_within};
use crate::{Result, RocError};

/// Mapping from curve identifier to curve. Identifiers are unique by
/// construction; iteration order is ascending by id.
pub type CurveSet = BTreeMap<String, RocCurve>;

/// Fixed discriminant carried by every canonical curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CurveKind {
    #[default]
    #[serde(rename = "ROC")]
    Roc,
}

/// Confidence level of a band: a number, or a free-form label kept verbatim
/// so it survives a trip through CSV column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BandLevel {
    Numeric(f64),
    Label(String),
}

impl BandLevel {
    /// Interpret a raw token (CSV column suffix or JSON string).
    ///
    /// Finite numbers become [`BandLevel::Numeric`], other non-blank text a
    /// [`BandLevel::Label`]. Blank input yields `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return None;
        }
        match guard::parse_number_str(trimmed) {
            Some(num) if num.is_finite() => Some(BandLevel::Numeric(num)),
            _ => Some(BandLevel::Label(trimmed.to_string())),
        }
    }

    /// Storage key used for CSV column names and uniqueness checks.
    ///
    /// Numbers use their shortest round-trip form (`0.95`, `1`); labels are
    /// trimmed with whitespace runs collapsed to `_`.
    pub fn label(&self) -> String {
        match self {
            BandLevel::Numeric(v) => format!("{v}"),
            BandLevel::Label(s) => s.split_whitespace().collect::<Vec<_>>().join("_"),
        }
    }

    /// Numeric sort key. Labels that do not parse as numbers sort last.
    pub fn sort_value(&self) -> f64 {
        match self {
            BandLevel::Numeric(v) => *v,
            BandLevel::Label(s) => match guard::parse_number_str(s) {
                Some(v) if v.is_finite() => v,
                _ => f64::INFINITY,
            },
        }
    }

    /// Canonical band order: ascending sort key, ties broken by label.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.sort_value()
            .partial_cmp(&other.sort_value())
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.label().cmp(&other.label()))
    }
}

/// Lower/upper TPR bounds at one confidence level, aligned with the parent
/// curve's FPR grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceBand {
    pub level: BandLevel,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// A single point on a ROC curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RocPoint {
    /// False positive rate: FP / (FP + TN).
    pub fpr: f64,
    /// True positive rate (recall): TP / (TP + FN).
    pub tpr: f64,
    /// Score threshold at which this point is computed. `None` when the
    /// point has no decision threshold; ±infinity marks the open endpoints.
    #[serde(
        default,
        serialize_with = "serialize_threshold",
        deserialize_with = "deserialize_threshold"
    )]
    pub threshold: Option<f64>,
}

impl RocPoint {
    pub fn new(fpr: f64, tpr: f64, threshold: Option<f64>) -> Self {
        Self { fpr, tpr, threshold }
    }
}

/// Canonical ROC curve.
///
/// Invariants (checked by [`RocCurve::check`] and established by every
/// constructor in this crate):
///
/// - `fpr`, `tpr`, `threshold` and every band's `lower`/`upper` share one length ≥ 1
/// - `fpr` and `tpr` are finite and within `[0, 1]`; `fpr` is non-decreasing
/// - thresholds are never NaN
/// - band levels are distinct after [`BandLevel::label`] formatting, and
///   bands are in [`BandLevel::canonical_cmp`] order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocCurve {
    #[serde(rename = "type")]
    pub kind: CurveKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_thresholds"
    )]
    pub threshold: Option<Vec<Option<f64>>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bands: Vec<ConfidenceBand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl RocCurve {
    /// Build a bare curve from FPR/TPR arrays, enforcing the canonical invariants.
    pub fn new(fpr: Vec<f64>, tpr: Vec<f64>) -> Result<Self> {
        crate::canonicalize(
            crate::CurveParts {
                fpr,
                tpr,
                ..Default::default()
            },
            "curve",
        )
    }

    /// Build a curve from FPR/TPR arrays without checking any invariant.
    ///
    /// Meant for curves produced outside the ingestion path (analytic curves,
    /// front-end edits) that are about to go through the validator.
    pub fn unchecked(fpr: Vec<f64>, tpr: Vec<f64>) -> Self {
        Self {
            kind: CurveKind::Roc,
            name: None,
            fpr,
            tpr,
            threshold: None,
            bands: Vec::new(),
            metadata: None,
        }
    }

    /// Build a curve from an ordered point sequence, keeping each point's
    /// threshold.
    pub fn from_points(points: &[RocPoint]) -> Result<Self> {
        crate::canonicalize(
            crate::CurveParts {
                fpr: points.iter().map(|p| p.fpr).collect(),
                tpr: points.iter().map(|p| p.tpr).collect(),
                threshold: Some(points.iter().map(|p| p.threshold).collect()),
                ..Default::default()
            },
            "curve",
        )
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.fpr.len()
    }

    /// Whether the curve has no points. Never true for a canonical curve.
    pub fn is_empty(&self) -> bool {
        self.fpr.is_empty()
    }

    /// The curve as a point sequence (threshold `None` where absent).
    pub fn points(&self) -> Vec<RocPoint> {
        self.fpr
            .iter()
            .zip(&self.tpr)
            .enumerate()
            .map(|(i, (&fpr, &tpr))| RocPoint {
                fpr,
                tpr,
                threshold: self
                    .threshold
                    .as_ref()
                    .and_then(|t| t.get(i).copied().flatten()),
            })
            .collect()
    }

    /// Look up a band by its formatted level label.
    pub fn band(&self, label: &str) -> Option<&ConfidenceBand> {
        self.bands.iter().find(|b| b.level.label() == label)
    }

    /// Re-verify the canonical invariants.
    ///
    /// `context` prefixes error messages (normally the curve id).
    pub fn check(&self, context: &str) -> Result<()> {
        let n = self.fpr.len();
        if n == 0 {
            return Err(RocError::Shape(format!(
                "{context}.fpr must contain at least one value."
            )));
        }
        let fpr_label = format!("{context}.fpr");
        assert_finite(&self.fpr, &fpr_label)?;
        assert_ascending(&self.fpr, &fpr_label)?;
        assert_within(&self.fpr, &fpr_label, 0.0, 1.0)?;

        if self.tpr.len() != n {
            return Err(RocError::Shape(format!(
                "{context} has mismatched fpr/tpr lengths ({} vs {}).",
                n,
                self.tpr.len()
            )));
        }
        let tpr_label = format!("{context}.tpr");
        assert_finite(&self.tpr, &tpr_label)?;
        assert_within(&self.tpr, &tpr_label, 0.0, 1.0)?;

        if let Some(threshold) = &self.threshold {
            assert_len(threshold.len(), n, &format!("{context}.threshold"))?;
            if let Some(idx) = threshold.iter().position(|t| t.is_some_and(f64::is_nan)) {
                return Err(RocError::Shape(format!(
                    "{context}.threshold has NaN at index {idx}."
                )));
            }
        }

        let mut seen = BTreeSet::new();
        for (idx, band) in self.bands.iter().enumerate() {
            let label = format!("{context}.bands[{idx}]");
            if let BandLevel::Numeric(v) = band.level {
                if !v.is_finite() {
                    return Err(RocError::Shape(format!("{label}.level must be finite.")));
                }
            }
            assert_len(band.lower.len(), n, &format!("{label}.lower"))?;
            assert_len(band.upper.len(), n, &format!("{label}.upper"))?;
            assert_finite(&band.lower, &format!("{label}.lower"))?;
            assert_finite(&band.upper, &format!("{label}.upper"))?;
            let key = band.level.label();
            if key.is_empty() {
                return Err(RocError::Shape(format!("{label}.level must not be blank.")));
            }
            if !seen.insert(key.clone()) {
                return Err(RocError::Shape(format!(
                    "{context} has duplicate band level \"{key}\"."
                )));
            }
            if idx > 0 && self.bands[idx - 1].level.canonical_cmp(&band.level) == Ordering::Greater {
                return Err(RocError::Shape(format!(
                    "{context}.bands must be sorted by level."
                )));
            }
        }
        Ok(())
    }
}

struct ThresholdRepr(Option<f64>);

impl Serialize for ThresholdRepr {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            None => s.serialize_none(),
            Some(v) if v == f64::INFINITY => s.serialize_str("Infinity"),
            Some(v) if v == f64::NEG_INFINITY => s.serialize_str("-Infinity"),
            Some(v) => s.serialize_f64(v),
        }
    }
}

// JSON has no infinity literal; infinite thresholds are written as strings
// that the canonicalizer reads back.
fn serialize_threshold<S: Serializer>(
    value: &Option<f64>,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    ThresholdRepr(*value).serialize(s)
}

fn serialize_thresholds<S: Serializer>(
    values: &Option<Vec<Option<f64>>>,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    match values {
        None => s.serialize_none(),
        Some(values) => s.collect_seq(values.iter().map(|v| ThresholdRepr(*v))),
    }
}

fn deserialize_threshold<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<f64>, D::Error> {
    let raw = Value::deserialize(d)?;
    guard::coerce_threshold(&raw, "threshold", 0).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn curve() -> RocCurve {
        RocCurve {
            kind: CurveKind::Roc,
            name: Some("model".into()),
            fpr: vec![0.0, 0.5, 1.0],
            tpr: vec![0.0, 0.8, 1.0],
            threshold: Some(vec![Some(f64::INFINITY), Some(0.4), None]),
            bands: vec![ConfidenceBand {
                level: BandLevel::Numeric(0.95),
                lower: vec![0.0, 0.7, 1.0],
                upper: vec![0.0, 0.9, 1.0],
            }],
            metadata: None,
        }
    }

    #[test]
    fn band_level_labels() {
        assert_eq!(BandLevel::Numeric(0.95).label(), "0.95");
        assert_eq!(BandLevel::Numeric(1.0).label(), "1");
        assert_eq!(BandLevel::Label("  high  conf ".into()).label(), "high_conf");
        assert_eq!(BandLevel::from_token("0.90"), Some(BandLevel::Numeric(0.9)));
        assert_eq!(
            BandLevel::from_token("wide"),
            Some(BandLevel::Label("wide".into()))
        );
        assert_eq!(BandLevel::from_token("  "), None);
    }

    #[test]
    fn band_level_order_puts_labels_last() {
        let mut levels = vec![
            BandLevel::Label("wide".into()),
            BandLevel::Numeric(0.95),
            BandLevel::Label("narrow".into()),
            BandLevel::Numeric(0.5),
        ];
        levels.sort_by(|a, b| a.canonical_cmp(b));
        let labels: Vec<String> = levels.iter().map(|l| l.label()).collect();
        assert_eq!(labels, vec!["0.5", "0.95", "narrow", "wide"]);
    }

    #[test]
    fn serializes_with_type_tag_and_infinite_thresholds() {
        let v = serde_json::to_value(curve()).unwrap();
        assert_eq!(v["type"], "ROC");
        assert_eq!(v["threshold"], json!(["Infinity", 0.4, null]));
        assert_eq!(v["bands"][0]["level"], json!(0.95));
        assert!(v.get("metadata").is_none());
    }

    #[test]
    fn points_carry_thresholds() {
        let pts = curve().points();
        assert_eq!(pts.len(), 3);
        assert_eq!(pts[0].threshold, Some(f64::INFINITY));
        assert_eq!(pts[2].threshold, None);
    }

    #[test]
    fn check_accepts_canonical_and_rejects_broken() {
        assert!(curve().check("m").is_ok());

        let mut bad = curve();
        bad.tpr.pop();
        assert!(bad.check("m").is_err());

        let mut bad = curve();
        bad.fpr = vec![0.0, 0.6, 0.5];
        assert!(bad.check("m").is_err());

        let mut bad = curve();
        bad.bands[0].upper.push(1.0);
        let err = bad.check("m").unwrap_err();
        assert!(err.to_string().contains("m.bands[0].upper"));

        let mut bad = curve();
        bad.tpr[1] = f64::NAN;
        assert!(bad.check("m").is_err());
    }

    #[test]
    fn point_deserializes_string_thresholds() {
        let p: RocPoint = serde_json::from_value(json!({"fpr": 0, "tpr": 0, "threshold": "Infinity"})).unwrap();
        assert_eq!(p.threshold, Some(f64::INFINITY));
        let p: RocPoint = serde_json::from_value(json!({"fpr": 0.5, "tpr": 1})).unwrap();
        assert_eq!(p.threshold, None);
    }
}
