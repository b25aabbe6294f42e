//! Monotone (staircase) envelope of an arbitrary point cloud.

use rocsift_core::RocPoint;

/// Turn a point sequence into a non-decreasing ROC staircase.
///
/// Points with a non-finite coordinate are discarded. The rest are stably
/// sorted by FPR; points sharing an FPR collapse into the one with the
/// largest TPR (keeping its threshold); TPR is then carried forward so it
/// never decreases.
pub fn monotone_envelope(points: &[RocPoint]) -> Vec<RocPoint> {
    let mut clean: Vec<RocPoint> = points
        .iter()
        .filter(|p| p.fpr.is_finite() && p.tpr.is_finite())
        .copied()
        .collect();
    clean.sort_by(|a, b| a.fpr.total_cmp(&b.fpr));

    let mut merged: Vec<RocPoint> = Vec::with_capacity(clean.len());
    for point in clean {
        match merged.last_mut() {
            Some(last) if last.fpr == point.fpr => {
                if point.tpr > last.tpr {
                    last.tpr = point.tpr;
                    last.threshold = point.threshold;
                }
            }
            _ => merged.push(point),
        }
    }

    for i in 1..merged.len() {
        if merged[i].tpr < merged[i - 1].tpr {
            merged[i].tpr = merged[i - 1].tpr;
        }
    }
    merged
}
