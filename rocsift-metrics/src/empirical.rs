//! Empirical ROC curves from labeled classifier scores.

use rocsift_core::guard::parse_number_str;
use rocsift_core::{Result, RocCurve, RocError, RocPoint};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One scored observation.
///
/// Deserialization never rejects a sample for its field values: a score that
/// is not a number (or numeric string) becomes NaN, and a label that is not an
/// integral number becomes `None`. [`empirical_roc`] then drops both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(default = "missing_score", deserialize_with = "lenient_score")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient_label")]
    pub label: Option<i64>,
}

impl Sample {
    pub fn new(score: f64, label: i64) -> Self {
        Self {
            score,
            label: Some(label),
        }
    }

    /// Whether the sample takes part in an empirical ROC sweep: a finite
    /// score and a label of exactly 0 or 1.
    pub fn is_usable(&self) -> bool {
        self.score.is_finite() && matches!(self.label, Some(0) | Some(1))
    }
}

fn missing_score() -> f64 {
    f64::NAN
}

fn lenient_score<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_number_str(&s).unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

fn lenient_label<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|v| *v == 0.0 || *v == 1.0)
                .map(|v| v as i64)
        }),
        _ => None,
    })
}

/// Sweep the decision threshold from +∞ down to -∞ and record one ROC point
/// per distinct score.
///
/// Samples that are not [`Sample::is_usable`] are dropped.
/// Tied scores move FPR and TPR together in a single step. The result starts
/// at `(0, 0)` with threshold +∞, ends at `(1, 1)` with threshold -∞, and is
/// ordered by `(fpr, tpr)`.
///
/// Returns an empty vector when either class is absent after filtering.
pub fn empirical_roc(samples: &[Sample]) -> Vec<RocPoint> {
    let mut sorted: Vec<Sample> = samples
        .iter()
        .filter(|s| s.is_usable())
        .copied()
        .collect();
    if sorted.len() < samples.len() {
        log::debug!(
            "empirical ROC: dropped {} of {} samples",
            samples.len() - sorted.len(),
            samples.len()
        );
    }
    sorted.sort_by(|a, b| b.score.total_cmp(&a.score));

    let total_pos = sorted.iter().filter(|s| s.label == Some(1)).count();
    let total_neg = sorted.len() - total_pos;
    if total_pos == 0 || total_neg == 0 {
        return Vec::new();
    }
    let p = total_pos as f64;
    let n = total_neg as f64;

    let mut points = vec![RocPoint::new(0.0, 0.0, Some(f64::INFINITY))];
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut i = 0;
    while i < sorted.len() {
        let current = sorted[i].score;
        while i < sorted.len() && sorted[i].score == current {
            if sorted[i].label == Some(1) {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        points.push(RocPoint::new(fp as f64 / n, tp as f64 / p, Some(current)));
    }
    points.push(RocPoint::new(1.0, 1.0, Some(f64::NEG_INFINITY)));

    points.sort_by(|a, b| a.fpr.total_cmp(&b.fpr).then(a.tpr.total_cmp(&b.tpr)));
    points
}

/// [`empirical_roc`] wrapped into a canonical curve with thresholds.
///
/// # Errors
///
/// [`RocError::InvalidInput`] when the samples do not contain both classes.
pub fn empirical_curve(samples: &[Sample]) -> Result<RocCurve> {
    let points = empirical_roc(samples);
    if points.is_empty() {
        return Err(RocError::InvalidInput(
            "empirical ROC needs at least one positive and one negative sample with a finite score"
                .into(),
        ));
    }
    RocCurve::from_points(&points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(pairs: &[(f64, i64)]) -> Vec<Sample> {
        pairs.iter().map(|&(s, l)| Sample::new(s, l)).collect()
    }

    #[test]
    fn tie_group_moves_both_axes() {
        let pts = empirical_roc(&samples(&[(3.0, 1), (2.0, 0), (2.0, 1), (1.0, 0)]));
        let coords: Vec<(f64, f64)> = pts.iter().map(|p| (p.fpr, p.tpr)).collect();
        assert_eq!(
            coords,
            vec![(0.0, 0.0), (0.0, 0.5), (0.5, 1.0), (1.0, 1.0), (1.0, 1.0)]
        );
        assert_eq!(pts[0].threshold, Some(f64::INFINITY));
        assert_eq!(pts[1].threshold, Some(3.0));
        assert_eq!(pts[2].threshold, Some(2.0));
        // stable sort keeps the last score group ahead of the closing point
        assert_eq!(pts[3].threshold, Some(1.0));
        assert_eq!(pts[4].threshold, Some(f64::NEG_INFINITY));
    }

    #[test]
    fn perfect_separation() {
        let pts = empirical_roc(&samples(&[(0.9, 1), (0.8, 1), (0.2, 0), (0.1, 0)]));
        assert_eq!(pts.len(), 6);
        assert!(pts.iter().any(|p| p.fpr == 0.0 && p.tpr == 1.0));
    }

    #[test]
    fn single_class_is_empty() {
        assert!(empirical_roc(&samples(&[(1.0, 1), (2.0, 1)])).is_empty());
        assert!(empirical_roc(&[]).is_empty());
        assert!(empirical_curve(&samples(&[(1.0, 0)])).is_err());
    }

    #[test]
    fn invalid_samples_are_dropped() {
        let pts = empirical_roc(&samples(&[
            (f64::NAN, 1),
            (f64::INFINITY, 0),
            (0.7, 2),
            (0.6, -1),
            (0.5, 1),
            (0.4, 0),
        ]));
        assert_eq!(pts.len(), 4);
    }

    #[test]
    fn curve_keeps_thresholds() {
        let curve = empirical_curve(&samples(&[(0.8, 1), (0.3, 0)])).unwrap();
        assert_eq!(curve.fpr, vec![0.0, 0.0, 1.0, 1.0]);
        assert_eq!(curve.tpr, vec![0.0, 1.0, 1.0, 1.0]);
        let thr = curve.threshold.unwrap();
        assert_eq!(thr[0], Some(f64::INFINITY));
        assert_eq!(thr[3], Some(f64::NEG_INFINITY));
    }

    #[test]
    fn samples_deserialize() {
        let parsed: Vec<Sample> =
            serde_json::from_str(r#"[{"score": 0.4, "label": 1}, {"score": 1, "label": 0}]"#)
                .unwrap();
        assert_eq!(parsed, samples(&[(0.4, 1), (1.0, 0)]));
    }

    #[test]
    fn odd_labels_and_scores_are_dropped_not_fatal() {
        let parsed: Vec<Sample> = serde_json::from_str(
            r#"[
                {"score": 0.9, "label": 1},
                {"score": 0.5, "label": 0.5},
                {"score": 0.4, "label": "1"},
                {"score": 0.3, "label": true},
                {"score": "high", "label": 1},
                {"score": null, "label": 0},
                {"label": 1},
                {"score": 0.2},
                {"score": "0.15", "label": 1.0},
                {"score": 0.1, "label": 0}
            ]"#,
        )
        .unwrap();
        assert_eq!(parsed.len(), 10);
        assert_eq!(parsed[1].label, None);
        assert_eq!(parsed[2].label, None);
        assert!(parsed[4].score.is_nan());
        assert_eq!(parsed[8], Sample::new(0.15, 1));

        let usable: Vec<&Sample> = parsed.iter().filter(|s| s.is_usable()).collect();
        assert_eq!(usable.len(), 3);
        let pts = empirical_roc(&parsed);
        let coords: Vec<(f64, f64)> = pts.iter().map(|p| (p.fpr, p.tpr)).collect();
        assert_eq!(
            coords,
            vec![(0.0, 0.0), (0.0, 0.5), (0.0, 1.0), (1.0, 1.0), (1.0, 1.0)]
        );
    }
}
