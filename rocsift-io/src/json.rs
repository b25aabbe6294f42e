//! ROC JSON ingestion and export.
//!
//! Curves are discovered in a JSON document by an ordered list of shape
//! matchers ([`JsonShape`]). With the default options every matcher runs, so
//! a root that is itself a curve *and* carries a `curves` array *and* keyed
//! curve entries contributes all of them.

use std::collections::{BTreeMap, HashSet};

use rocsift_core::{to_canonical, CurveSet, Result, RocCurve, RocError};
use serde::Serialize;
use serde_json::Value;

/// One way a document can hold curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonShape {
    /// `[curve, curve, …]` at the root.
    Array,
    /// The root object is itself a curve.
    Single,
    /// `{"curves": [curve, …]}`.
    Wrapped,
    /// `{"<id>": curve, …}`; every root key except `curves`.
    Keyed,
}

impl JsonShape {
    /// Every matcher, in the order they are applied.
    pub const ALL: [JsonShape; 4] = [
        JsonShape::Array,
        JsonShape::Single,
        JsonShape::Wrapped,
        JsonShape::Keyed,
    ];
}

/// Options for [`normalize_json`].
#[derive(Debug, Clone)]
pub struct JsonOptions {
    /// Id candidate tried after the curve's own fields and its positional
    /// hint (typically the source file stem).
    pub default_curve_name: Option<String>,
    /// Matchers to apply. Order does not matter; they always run in
    /// [`JsonShape::ALL`] order.
    pub shapes: Vec<JsonShape>,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            default_curve_name: None,
            shapes: JsonShape::ALL.to_vec(),
        }
    }
}

impl JsonOptions {
    /// Options that only accept the given shapes.
    pub fn only(shapes: &[JsonShape]) -> Self {
        Self {
            shapes: shapes.to_vec(),
            ..Default::default()
        }
    }

    /// Set the default curve name.
    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_curve_name = Some(name.into());
        self
    }
}

/// Curve identifiers already handed out during one parse call.
///
/// Reservation takes the first unused, non-blank candidate (trimmed); when
/// every candidate is taken it falls back to `curve_N` with the lowest unused
/// `N` at or above an internal counter.
#[derive(Debug, Default)]
pub struct IdReservoir {
    used: HashSet<String>,
    counter: usize,
}

impl IdReservoir {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an id from `candidates`, tried in order.
    pub fn reserve<'a, I>(&mut self, candidates: I) -> String
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        for candidate in candidates.into_iter().flatten() {
            let trimmed = candidate.trim();
            if !trimmed.is_empty() && !self.used.contains(trimmed) {
                self.used.insert(trimmed.to_string());
                return trimmed.to_string();
            }
        }
        loop {
            self.counter += 1;
            let candidate = format!("curve_{}", self.counter);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.used.contains(id)
    }
}

/// Whether a value looks like a curve: an object with an `fpr` or `tpr` key.
pub fn looks_like_curve(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.contains_key("fpr") || obj.contains_key("tpr"))
}

/// Collect `(positional hint, curve)` pairs for one shape.
///
/// A curve-like root is hinted with the default name when there is one, else
/// `"curve"`.
fn discover<'a>(
    shape: JsonShape,
    root: &'a Value,
    default_name: Option<&str>,
) -> Vec<(String, &'a Value)> {
    match (shape, root) {
        (JsonShape::Array, Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter(|(_, v)| looks_like_curve(v))
            .map(|(i, v)| (format!("curve_{}", i + 1), v))
            .collect(),
        (JsonShape::Single, Value::Object(_)) if looks_like_curve(root) => {
            vec![(default_name.unwrap_or("curve").to_string(), root)]
        }
        (JsonShape::Wrapped, Value::Object(obj)) => match obj.get("curves") {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter(|(_, v)| looks_like_curve(v))
                .map(|(i, v)| (format!("curves_{}", i + 1), v))
                .collect(),
            _ => Vec::new(),
        },
        (JsonShape::Keyed, Value::Object(obj)) => obj
            .iter()
            .filter(|(key, v)| key.as_str() != "curves" && looks_like_curve(v))
            .map(|(key, v)| (key.clone(), v))
            .collect(),
        _ => Vec::new(),
    }
}

/// Normalize an already-parsed JSON document into a curve collection.
///
/// Ids are reserved from, in order: the curve's `curve_id`, `id` and `name`
/// fields, the positional hint (object key, `curve_<n>` for array entries,
/// `curves_<n>` inside a `curves` wrapper, the default name or `curve` for a
/// curve-like root), then [`JsonOptions::default_curve_name`]. Keyed entries
/// are visited in document order. Curves without a name are named after
/// their id.
///
/// # Errors
///
/// Fails if the root is neither an object nor an array, if no curve is found,
/// or if any discovered curve fails canonicalization.
pub fn normalize_json(raw: &Value, options: &JsonOptions) -> Result<CurveSet> {
    if !raw.is_object() && !raw.is_array() {
        return Err(RocError::Parse(
            "ROC JSON root must be an object or an array.".into(),
        ));
    }
    let default_name = options
        .default_curve_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut ids = IdReservoir::new();
    let mut curves = CurveSet::new();
    for shape in JsonShape::ALL {
        if !options.shapes.contains(&shape) {
            continue;
        }
        for (hint, value) in discover(shape, raw, default_name) {
            let field = |key: &str| value.get(key).and_then(Value::as_str);
            let id = ids.reserve([
                field("curve_id"),
                field("id"),
                field("name"),
                Some(hint.as_str()),
                default_name,
            ]);
            let mut curve = to_canonical(value, Some(id.as_str()))?;
            if curve.name.is_none() {
                curve.name = Some(id.clone());
            }
            log::debug!("ROC JSON curve {id} ({shape:?}): {} points", curve.len());
            curves.insert(id, curve);
        }
    }

    if curves.is_empty() {
        return Err(RocError::Parse(
            "No ROC curves were found in the provided ROC JSON.".into(),
        ));
    }
    Ok(curves)
}

/// Parse ROC JSON text and normalize it.
pub fn parse_json_str(text: &str, options: &JsonOptions) -> Result<CurveSet> {
    let raw: Value = serde_json::from_str(text)?;
    normalize_json(&raw, options)
}

/// A curve as written by [`write_json_string`]: its id leads the object so
/// the id survives even when the curve's name differs from it.
#[derive(Serialize)]
struct ExportedCurve<'a> {
    curve_id: &'a str,
    #[serde(flatten)]
    curve: &'a RocCurve,
}

/// Serialize a collection as pretty JSON (2-space indentation), keyed by id.
///
/// Each curve object carries its `curve_id`, so the output is accepted by
/// [`parse_json_str`] and yields the same collection.
pub fn write_json_string(curves: &CurveSet) -> Result<String> {
    if curves.is_empty() {
        return Err(RocError::InvalidInput(
            "ROC JSON export requires at least one curve.".into(),
        ));
    }
    let exported: BTreeMap<&str, ExportedCurve<'_>> = curves
        .iter()
        .map(|(id, curve)| (id.as_str(), ExportedCurve { curve_id: id, curve }))
        .collect();
    Ok(serde_json::to_string_pretty(&exported)?)
}
