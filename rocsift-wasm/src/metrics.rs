//! Empirical ROC derivation and AUC over JSON strings.

use rocsift_core::RocPoint;
use rocsift_metrics::Sample;
use serde::Serialize;

use crate::error::{wasm_err, wasm_ok};

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

/// Empirical ROC points together with their area.
#[derive(Debug, Serialize)]
pub struct JsEmpiricalRoc {
    pub points: Vec<RocPoint>,
    pub auc: f64,
}

/// Derive an empirical ROC curve from `[{"score": s, "label": 0|1}, …]`.
///
/// Returns `{"points": [...], "auc": a}`. Samples with a non-numeric score
/// or a label other than 0 or 1 are dropped rather than rejected. Points are
/// empty (and the area 0) when the remaining samples do not contain both
/// classes.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn empirical_roc_json(samples_json: &str) -> String {
    let samples: Vec<Sample> = match serde_json::from_str(samples_json) {
        Ok(s) => s,
        Err(e) => return wasm_err(format!("invalid samples: {e}")),
    };
    let points = rocsift_metrics::empirical_roc(&samples);
    let auc = rocsift_metrics::auc(&points);
    wasm_ok(&JsEmpiricalRoc { points, auc })
}

/// Trapezoidal AUC of `[{"fpr": x, "tpr": y}, …]`, taken in the given order.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn roc_auc_json(points_json: &str) -> String {
    match serde_json::from_str::<Vec<RocPoint>>(points_json) {
        Ok(points) => wasm_ok(&rocsift_metrics::auc(&points)),
        Err(e) => wasm_err(format!("invalid points: {e}")),
    }
}
