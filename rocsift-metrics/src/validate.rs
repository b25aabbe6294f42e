//! Curve validation and repair.
//!
//! The validator is lenient where ingestion is strict: small decreases in FPR
//! or TPR and duplicated points are repaired instead of rejected. Structural
//! problems (length mismatches, non-finite coordinates, empty curves) are
//! fatal and leave the curve alone.

use std::collections::BTreeMap;

use rocsift_core::{CurveSet, RocCurve, Summarizable};
use serde::Serialize;

/// Endpoint note attached when `(0, 0)` or `(1, 1)` is missing.
pub const ENDPOINT_NOTE: &str = "This ROC curve does not include (0,0) or (1,1). \
This is normal for heavy-tailed distributions with asymptotic CDF tails. No correction needed.";

/// Tolerances for [`validate_curve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidateOptions {
    /// A point within this distance of the previous kept point on both axes
    /// is a duplicate.
    pub duplicate_eps: f64,
    /// Distance within which a point counts as the `(0, 0)` or `(1, 1)`
    /// endpoint.
    pub endpoint_eps: f64,
    /// When set, a decrease in FPR or TPR larger than this is fatal instead
    /// of being repaired.
    pub max_decrease: Option<f64>,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            duplicate_eps: 1e-9,
            endpoint_eps: 1e-9,
            max_decrease: None,
        }
    }
}

/// Outcome of validating one curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub ok: bool,
    pub fatal: bool,
    pub fixed: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub notes: Vec<String>,
    pub curve_id: String,
}

impl ValidationReport {
    pub fn new(curve_id: impl Into<String>) -> Self {
        Self {
            ok: true,
            fatal: false,
            fixed: false,
            warnings: Vec::new(),
            errors: Vec::new(),
            notes: Vec::new(),
            curve_id: curve_id.into(),
        }
    }

    /// A report for a curve that could not be checked at all.
    pub fn failed(curve_id: impl Into<String>, error: impl Into<String>) -> Self {
        let mut report = Self::new(curve_id);
        report.fail(error);
        report
    }

    fn fail(&mut self, error: impl Into<String>) {
        self.fatal = true;
        self.ok = false;
        self.errors.push(error.into());
    }

    fn repair(&mut self, warning: String) {
        self.fixed = true;
        self.warnings.push(warning);
    }
}

impl Summarizable for ValidationReport {
    fn summary(&self) -> String {
        let status = if self.fatal {
            "fatal"
        } else if self.fixed {
            "repaired"
        } else {
            "ok"
        };
        format!(
            "{}: {status} ({} warnings, {} errors, {} notes)",
            self.curve_id,
            self.warnings.len(),
            self.errors.len(),
            self.notes.len()
        )
    }
}

/// A report together with the repaired curve, present only when the
/// validator changed something.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub report: ValidationReport,
    pub repaired: Option<RocCurve>,
}

/// Validate one curve and compute its repaired form.
///
/// `curve_id` labels the report; when blank the curve's name is used, else
/// `"curve"`. The input is never modified.
pub fn validate_curve(curve: &RocCurve, curve_id: &str, options: &ValidateOptions) -> Validation {
    let id = Some(curve_id.trim())
        .filter(|s| !s.is_empty())
        .or(curve.name.as_deref())
        .unwrap_or("curve");
    let mut report = ValidationReport::new(id);

    if let Some(error) = structural_error(curve) {
        log::warn!("curve {id} rejected: {error}");
        report.fail(error);
        return Validation {
            report,
            repaired: None,
        };
    }
    if let Some(limit) = options.max_decrease {
        if let Some(error) = decrease_error(curve, limit) {
            log::warn!("curve {id} rejected: {error}");
            report.fail(error);
            return Validation {
                report,
                repaired: None,
            };
        }
    }

    // (source index, fpr, tpr) of every kept point
    let mut kept: Vec<(usize, f64, f64)> = Vec::with_capacity(curve.len());
    for (i, (&f, &t)) in curve.fpr.iter().zip(&curve.tpr).enumerate() {
        let (mut fpr, mut tpr) = (f, t);
        if let Some(&(_, last_fpr, last_tpr)) = kept.last() {
            if (fpr - last_fpr).abs() < options.duplicate_eps
                && (tpr - last_tpr).abs() < options.duplicate_eps
            {
                report.repair(format!("Duplicate point at index {i} removed."));
                continue;
            }
            if fpr < last_fpr {
                fpr = last_fpr;
                report.repair(format!("Adjusted fpr at index {i} to maintain monotonicity."));
            }
            if tpr < last_tpr {
                tpr = last_tpr;
                report.repair(format!("Adjusted tpr at index {i} to maintain monotonicity."));
            }
        }
        kept.push((i, fpr, tpr));
    }

    let eps = options.endpoint_eps;
    let has_origin = kept
        .iter()
        .any(|&(_, f, t)| f.abs() < eps && t.abs() < eps);
    let has_corner = kept
        .iter()
        .any(|&(_, f, t)| (f - 1.0).abs() < eps && (t - 1.0).abs() < eps);
    if !has_origin || !has_corner {
        report.notes.push(ENDPOINT_NOTE.to_string());
    }

    let repaired = report.fixed.then(|| rebuild(curve, &kept));
    if report.fixed {
        log::warn!("curve {id} repaired: {}", report.warnings.join(" "));
    }
    Validation { report, repaired }
}

/// Validate every curve of a collection. The collection is not modified.
pub fn validate_collection(
    curves: &CurveSet,
    options: &ValidateOptions,
) -> BTreeMap<String, Validation> {
    curves
        .iter()
        .map(|(id, curve)| (id.clone(), validate_curve(curve, id, options)))
        .collect()
}

/// Validate every curve and replace the ones that needed repair in place.
pub fn repair_collection(
    curves: &mut CurveSet,
    options: &ValidateOptions,
) -> BTreeMap<String, ValidationReport> {
    let mut reports = BTreeMap::new();
    for (id, curve) in curves.iter_mut() {
        let Validation { report, repaired } = validate_curve(curve, id, options);
        if let Some(fixed) = repaired {
            *curve = fixed;
        }
        reports.insert(id.clone(), report);
    }
    reports
}

fn structural_error(curve: &RocCurve) -> Option<String> {
    let n = curve.fpr.len();
    if n != curve.tpr.len() {
        return Some(format!(
            "fpr/tpr length mismatch ({n} vs {}).",
            curve.tpr.len()
        ));
    }
    if n == 0 {
        return Some("Curve must contain at least one point.".into());
    }
    if let Some(i) = (0..n).find(|&i| !curve.fpr[i].is_finite() || !curve.tpr[i].is_finite()) {
        return Some(format!("Non-numeric value at index {i}."));
    }
    if let Some(thr) = &curve.threshold {
        if thr.len() != n {
            return Some(format!(
                "threshold length mismatch ({} vs {n}).",
                thr.len()
            ));
        }
    }
    for band in &curve.bands {
        if band.lower.len() != n || band.upper.len() != n {
            return Some(format!(
                "band {} length mismatch (lower {}, upper {}, expected {n}).",
                band.level.label(),
                band.lower.len(),
                band.upper.len()
            ));
        }
    }
    None
}

fn decrease_error(curve: &RocCurve, limit: f64) -> Option<String> {
    for i in 1..curve.len() {
        let (prev_fpr, fpr) = (curve.fpr[i - 1], curve.fpr[i]);
        if fpr < prev_fpr - limit {
            return Some(format!("fpr decreases at index {i} ({prev_fpr} → {fpr})."));
        }
        let (prev_tpr, tpr) = (curve.tpr[i - 1], curve.tpr[i]);
        if tpr < prev_tpr - limit {
            return Some(format!("tpr decreases at index {i} ({prev_tpr} → {tpr})."));
        }
    }
    None
}

fn rebuild(curve: &RocCurve, kept: &[(usize, f64, f64)]) -> RocCurve {
    let pick = |values: &[f64]| kept.iter().map(|&(i, _, _)| values[i]).collect::<Vec<_>>();
    let mut out = curve.clone();
    out.fpr = kept.iter().map(|&(_, f, _)| f).collect();
    out.tpr = kept.iter().map(|&(_, _, t)| t).collect();
    out.threshold = curve
        .threshold
        .as_ref()
        .map(|thr| kept.iter().map(|&(i, _, _)| thr[i]).collect());
    for (band, source) in out.bands.iter_mut().zip(&curve.bands) {
        band.lower = pick(&source.lower);
        band.upper = pick(&source.upper);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocsift_core::{BandLevel, ConfidenceBand};

    fn raw(fpr: &[f64], tpr: &[f64]) -> RocCurve {
        RocCurve::unchecked(fpr.to_vec(), tpr.to_vec())
    }

    #[test]
    fn clamps_decreasing_fpr() {
        let curve = raw(&[0.0, 0.2, 0.1, 0.5], &[0.0, 0.3, 0.3, 0.6]);
        let v = validate_curve(&curve, "m", &ValidateOptions::default());
        assert!(v.report.ok);
        assert!(v.report.fixed);
        assert_eq!(v.report.warnings.len(), 1);
        assert!(v.report.warnings[0].contains("index 2"));
        let fixed = v.repaired.unwrap();
        assert_eq!(fixed.fpr, vec![0.0, 0.2, 0.2, 0.5]);
        assert_eq!(fixed.tpr, vec![0.0, 0.3, 0.3, 0.6]);
        // the input is left as it was
        assert_eq!(curve.fpr, vec![0.0, 0.2, 0.1, 0.5]);
    }

    #[test]
    fn length_mismatch_is_fatal() {
        let curve = raw(&[0.0, 0.5, 1.0], &[0.0, 1.0]);
        let v = validate_curve(&curve, "bad", &ValidateOptions::default());
        assert!(!v.report.ok);
        assert!(v.report.fatal);
        assert_eq!(v.report.errors, vec!["fpr/tpr length mismatch (3 vs 2).".to_string()]);
        assert!(v.repaired.is_none());
    }

    #[test]
    fn structural_failures() {
        let opts = ValidateOptions::default();
        assert!(validate_curve(&raw(&[], &[]), "e", &opts).report.fatal);
        let v = validate_curve(&raw(&[0.0, f64::NAN], &[0.0, 1.0]), "n", &opts);
        assert_eq!(v.report.errors[0], "Non-numeric value at index 1.");

        let mut curve = raw(&[0.0, 1.0], &[0.0, 1.0]);
        curve.threshold = Some(vec![None]);
        assert!(validate_curve(&curve, "t", &opts).report.fatal);
    }

    #[test]
    fn clean_curve_untouched() {
        let curve = raw(&[0.0, 0.4, 1.0], &[0.0, 0.7, 1.0]);
        let v = validate_curve(&curve, "", &ValidateOptions::default());
        assert!(v.report.ok && !v.report.fixed);
        assert!(v.report.notes.is_empty());
        assert!(v.repaired.is_none());
        assert_eq!(v.report.curve_id, "curve");
    }

    #[test]
    fn endpoint_note() {
        let curve = raw(&[0.1, 0.5], &[0.2, 0.9]);
        let v = validate_curve(&curve, "tail", &ValidateOptions::default());
        assert!(v.report.ok);
        assert_eq!(v.report.notes, vec![ENDPOINT_NOTE.to_string()]);
    }

    #[test]
    fn duplicates_removed_with_thresholds_and_bands() {
        let mut curve = raw(&[0.0, 0.5, 0.5, 1.0], &[0.0, 0.8, 0.8, 1.0]);
        curve.threshold = Some(vec![Some(f64::INFINITY), Some(0.6), Some(0.5), None]);
        curve.bands = vec![ConfidenceBand {
            level: BandLevel::Numeric(0.95),
            lower: vec![0.0, 0.7, 0.71, 1.0],
            upper: vec![0.0, 0.9, 0.91, 1.0],
        }];
        let v = validate_curve(&curve, "d", &ValidateOptions::default());
        assert_eq!(v.report.warnings, vec!["Duplicate point at index 2 removed.".to_string()]);
        let fixed = v.repaired.unwrap();
        assert_eq!(fixed.fpr, vec![0.0, 0.5, 1.0]);
        assert_eq!(fixed.threshold, Some(vec![Some(f64::INFINITY), Some(0.6), None]));
        assert_eq!(fixed.bands[0].lower, vec![0.0, 0.7, 1.0]);
        assert_eq!(fixed.bands[0].upper, vec![0.0, 0.9, 1.0]);
        assert!(fixed.check("d").is_ok());
    }

    #[test]
    fn max_decrease_makes_large_drops_fatal() {
        let curve = raw(&[0.0, 0.6, 0.3, 1.0], &[0.0, 0.5, 0.6, 1.0]);
        let strict = ValidateOptions {
            max_decrease: Some(1e-6),
            ..Default::default()
        };
        let v = validate_curve(&curve, "s", &strict);
        assert!(v.report.fatal);
        assert!(v.report.errors[0].starts_with("fpr decreases at index 2"));

        let tiny = raw(&[0.0, 0.5, 0.5 - 1e-9, 1.0], &[0.0, 0.5, 0.6, 1.0]);
        let v = validate_curve(&tiny, "s", &strict);
        assert!(v.report.ok && v.report.fixed);
    }

    #[test]
    fn tpr_clamped() {
        let curve = raw(&[0.0, 0.3, 0.6, 1.0], &[0.0, 0.5, 0.4, 1.0]);
        let v = validate_curve(&curve, "t", &ValidateOptions::default());
        assert_eq!(
            v.report.warnings,
            vec!["Adjusted tpr at index 2 to maintain monotonicity.".to_string()]
        );
        assert_eq!(v.repaired.unwrap().tpr, vec![0.0, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn collections() {
        let mut set = CurveSet::new();
        set.insert("good".into(), raw(&[0.0, 1.0], &[0.0, 1.0]));
        set.insert("wobbly".into(), raw(&[0.0, 0.5, 0.4, 1.0], &[0.0, 0.5, 0.6, 1.0]));

        let checked = validate_collection(&set, &ValidateOptions::default());
        assert!(checked["wobbly"].repaired.is_some());
        assert_eq!(set["wobbly"].fpr[2], 0.4);

        let reports = repair_collection(&mut set, &ValidateOptions::default());
        assert!(reports["wobbly"].fixed);
        assert!(!reports["good"].fixed);
        assert_eq!(set["wobbly"].fpr, vec![0.0, 0.5, 0.5, 1.0]);
        assert_eq!(reports["wobbly"].summary(), "wobbly: repaired (1 warnings, 0 errors, 0 notes)");
    }

    #[test]
    fn report_serializes_camel_case() {
        let report = ValidationReport::failed("x", "boom");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["curveId"], "x");
        assert_eq!(json["ok"], false);
        assert_eq!(json["errors"][0], "boom");
    }
}
