//! ROC curve ingestion and export for rocsift.
//!
//! Supported formats:
//! - **CSV**: long-format, one row per curve point, via the `csv` feature
//!   (enabled by default)
//! - **JSON**: single curves, arrays, `{"curves": […]}` wrappers, and maps
//!   keyed by curve id, via the `json` feature (enabled by default)
//!
//! Every reader funnels through [`rocsift_core::canonicalize`] and fails on
//! the first malformed curve; there is no partial success.

#[cfg(feature = "csv")]
pub mod csv;

#[cfg(feature = "csv")]
pub mod csv_write;

#[cfg(feature = "json")]
pub mod json;

#[cfg(all(feature = "csv", feature = "json"))]
pub mod text;

// Re-exports for convenience.

#[cfg(feature = "csv")]
pub use csv::{parse_csv_str, split_csv_line};

#[cfg(feature = "csv")]
pub use csv_write::write_csv_string;

#[cfg(feature = "json")]
pub use json::{
    looks_like_curve, normalize_json, parse_json_str, write_json_string, IdReservoir, JsonOptions,
    JsonShape,
};

#[cfg(all(feature = "csv", feature = "json"))]
pub use text::{detect_format, parse_text, source_stem, ParsedText, SourceFormat};
