//! WASM bindings for the rocsift ROC engine.
//!
//! In-memory, JSON-based wrappers around the rocsift crates for browser front
//! ends. Every public function accepts `&str` and returns a JSON `String`:
//!
//! - Success: `{"ok": <value>}`
//! - Failure: `{"error": "<message>", "kind": "<category>"}` (`kind` is
//!   omitted for argument-shape failures raised by the bindings themselves)
//!
//! `#[wasm_bindgen]` exports are enabled with the `wasm` feature.
//!
//! # Modules
//!
//! - [`curves`]: ROC CSV/JSON parsing, export, validation and repair
//! - [`metrics`]: Empirical ROC from labeled scores, AUC
//!
//! # Example
//!
//! ```
//! let json = rocsift_wasm::roc_auc_json(r#"[{"fpr": 0, "tpr": 0}, {"fpr": 1, "tpr": 1}]"#);
//! let v: serde_json::Value = serde_json::from_str(&json).unwrap();
//! assert_eq!(v["ok"], 0.5);
//! ```

pub mod curves;
pub mod error;
pub mod metrics;

/// Crate version (set from Cargo.toml at compile time).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use curves::{
    export_roc_csv, export_roc_json, parse_roc_text, validate_roc_json, JsParsedRoc, JsValidation,
};
pub use error::{wasm_err, wasm_ok, wasm_result, wasm_roc_err};
pub use metrics::{empirical_roc_json, roc_auc_json, JsEmpiricalRoc};
