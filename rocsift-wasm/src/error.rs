//! JSON result envelope for the WASM boundary.
//!
//! Every public function in `rocsift-wasm` returns a `String` containing JSON.
//! Success is `{"ok": <value>}`. Failure is `{"error": "<message>"}`, plus a
//! `"kind"` field (`parse`, `shape`, `invalid_input`, `csv`, `json`) when the
//! failure came from a [`RocError`].

use std::fmt::Display;

use rocsift_core::RocError;
use serde::Serialize;

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    ok: &'a T,
}

#[derive(Serialize)]
struct Failure<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
}

fn failure(message: &str, kind: Option<&'static str>) -> String {
    serde_json::to_string(&Failure {
        error: message,
        kind,
    })
    .unwrap_or_else(|_| r#"{"error":"serialization failed"}"#.into())
}

/// Serialize a success value as `{"ok": val}`.
pub fn wasm_ok<T: Serialize>(val: &T) -> String {
    serde_json::to_string(&Envelope { ok: val })
        .unwrap_or_else(|e| wasm_roc_err(&RocError::from(e)))
}

/// Serialize a boundary failure (bad argument shape, not a library error) as
/// `{"error": "msg"}`.
pub fn wasm_err(msg: impl Display) -> String {
    failure(&msg.to_string(), None)
}

/// Serialize a library error as `{"error": "msg", "kind": "..."}`.
pub fn wasm_roc_err(err: &RocError) -> String {
    failure(&err.to_string(), Some(err.kind()))
}

/// Map a `rocsift_core::Result<T>` into the JSON envelope.
pub fn wasm_result<T: Serialize>(r: rocsift_core::Result<T>) -> String {
    match r {
        Ok(val) => wasm_ok(&val),
        Err(e) => wasm_roc_err(&e),
    }
}
