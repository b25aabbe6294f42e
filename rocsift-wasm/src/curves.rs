//! ROC curve ingestion, export and validation over JSON strings.

use std::collections::BTreeMap;

use rocsift_core::{to_canonical, to_unchecked, CurveSet, Result, RocCurve, RocError};
use rocsift_metrics::{validate_curve, ValidateOptions, ValidationReport};
use serde::Serialize;
use serde_json::Value;

use crate::error::{wasm_err, wasm_ok, wasm_result, wasm_roc_err};

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

// ── Wrapper types ────────────────────────────────────────────────────────

/// Parsed collection plus the format it was read as.
#[derive(Debug, Serialize)]
pub struct JsParsedRoc {
    pub data: CurveSet,
    #[serde(rename = "sourceType")]
    pub source_type: &'static str,
}

/// Validation report for one curve, with the repaired curve when the
/// validator changed something.
#[derive(Debug, Serialize)]
pub struct JsValidation {
    #[serde(flatten)]
    pub report: ValidationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repaired: Option<RocCurve>,
}

// ── Helpers ──────────────────────────────────────────────────────────────

/// Read a canonical `{id: curve}` map, keeping the keys as ids.
fn curve_map(json: &str) -> Result<CurveSet> {
    let raw: Value = serde_json::from_str(json)?;
    let Value::Object(map) = raw else {
        return Err(RocError::InvalidInput(
            "expected a JSON object keyed by curve id".into(),
        ));
    };
    map.iter()
        .map(|(id, value)| to_canonical(value, Some(id.as_str())).map(|curve| (id.clone(), curve)))
        .collect()
}

// ── JSON boundary functions ──────────────────────────────────────────────

/// Parse ROC CSV or JSON text into canonical curves.
///
/// `source_name` (a file name, may be empty) selects the format by extension
/// and names single JSON curves after the file stem.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn parse_roc_text(text: &str, source_name: &str) -> String {
    let source = Some(source_name).filter(|s| !s.trim().is_empty());
    wasm_result(
        rocsift_io::parse_text(text, source).map(|parsed| JsParsedRoc {
            source_type: parsed.format.as_str(),
            data: parsed.curves,
        }),
    )
}

/// Export a canonical `{id: curve}` map as long-format CSV text.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn export_roc_csv(curves_json: &str) -> String {
    wasm_result(curve_map(curves_json).and_then(|curves| rocsift_io::write_csv_string(&curves)))
}

/// Export a canonical `{id: curve}` map as pretty-printed ROC JSON text.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn export_roc_json(curves_json: &str) -> String {
    wasm_result(curve_map(curves_json).and_then(|curves| rocsift_io::write_json_string(&curves)))
}

/// Validate and repair a `{id: curve}` map.
///
/// Curves are read leniently (unordered or mismatched arrays are reported,
/// not rejected). Returns `{id: report}`; repaired reports carry the fixed
/// curve under `repaired`.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn validate_roc_json(curves_json: &str) -> String {
    let raw: Value = match serde_json::from_str(curves_json) {
        Ok(v) => v,
        Err(e) => return wasm_roc_err(&RocError::from(e)),
    };
    let Value::Object(map) = raw else {
        return wasm_err("expected a JSON object keyed by curve id");
    };

    let options = ValidateOptions::default();
    let results: BTreeMap<&str, JsValidation> = map
        .iter()
        .map(|(id, value)| {
            let js = match to_unchecked(value, Some(id.as_str())) {
                Ok(curve) => {
                    let v = validate_curve(&curve, id, &options);
                    JsValidation {
                        report: v.report,
                        repaired: v.repaired,
                    }
                }
                Err(e) => JsValidation {
                    report: ValidationReport::failed(id.as_str(), e.to_string()),
                    repaired: None,
                },
            };
            (id.as_str(), js)
        })
        .collect();
    wasm_ok(&results)
}
