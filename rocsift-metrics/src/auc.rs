//! Area under a ROC curve by the trapezoidal rule.

use rocsift_core::{RocCurve, RocPoint};

/// Signed trapezoidal area under consecutive points, in the order given.
///
/// Pairs with a non-finite coordinate are skipped. Fewer than two points
/// yield `0.0`. No sorting happens here; a decreasing FPR contributes
/// negative area.
pub fn auc(points: &[RocPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| segment(w[0].fpr, w[0].tpr, w[1].fpr, w[1].tpr))
        .sum()
}

/// Trapezoidal AUC over parallel FPR/TPR slices. Extra entries in the longer
/// slice are ignored.
pub fn trapezoidal_auc(fpr: &[f64], tpr: &[f64]) -> f64 {
    let n = fpr.len().min(tpr.len());
    (1..n)
        .map(|i| segment(fpr[i - 1], tpr[i - 1], fpr[i], tpr[i]))
        .sum()
}

/// AUC of a curve's FPR/TPR arrays.
pub fn curve_auc(curve: &RocCurve) -> f64 {
    trapezoidal_auc(&curve.fpr, &curve.tpr)
}

fn segment(x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
        return 0.0;
    }
    let dx = x1 - x0;
    if dx.is_finite() {
        dx * (y0 + y1) / 2.0
    } else {
        0.0
    }
}
