//! Format detection for text of unknown origin (uploads, pasted content).

use rocsift_core::{CurveSet, Result};

use crate::csv::parse_csv_str;
use crate::json::{parse_json_str, JsonOptions};

/// Serialization formats understood by [`parse_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Csv,
}

impl SourceFormat {
    /// Lowercase name, as reported to front ends.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Json => "json",
            SourceFormat::Csv => "csv",
        }
    }
}

/// A parsed collection together with the format it was read as.
#[derive(Debug, Clone)]
pub struct ParsedText {
    pub curves: CurveSet,
    pub format: SourceFormat,
}

fn file_name(source_name: &str) -> &str {
    source_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(source_name)
}

/// File stem of a source name: directories and the last extension removed.
pub fn source_stem(source_name: &str) -> Option<&str> {
    let name = file_name(source_name);
    let stem = match name.rfind('.') {
        Some(0) | None => name,
        Some(dot) => &name[..dot],
    };
    Some(stem.trim()).filter(|s| !s.is_empty())
}

/// Guess the format from the source name's extension, else from the first
/// non-blank character (`{` or `[` means JSON).
pub fn detect_format(text: &str, source_name: Option<&str>) -> SourceFormat {
    let ext = source_name
        .map(file_name)
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("json") => return SourceFormat::Json,
        Some("csv") => return SourceFormat::Csv,
        _ => {}
    }
    match text.trim_start_matches('\u{feff}').trim_start().chars().next() {
        Some('{') | Some('[') => SourceFormat::Json,
        _ => SourceFormat::Csv,
    }
}

/// Parse ROC text in either format.
///
/// For JSON the source name's stem becomes the default curve name, so a
/// single unnamed curve uploaded as `svm.json` can still be told apart from
/// others when ids collide.
pub fn parse_text(text: &str, source_name: Option<&str>) -> Result<ParsedText> {
    let format = detect_format(text, source_name);
    let curves = match format {
        SourceFormat::Json => {
            let mut options = JsonOptions::default();
            options.default_curve_name = source_name.and_then(source_stem).map(str::to_string);
            parse_json_str(text, &options)?
        }
        SourceFormat::Csv => parse_csv_str(text)?,
    };
    log::debug!(
        "parsed {} ROC curves as {format:?} from {}",
        curves.len(),
        source_name.unwrap_or("<text>")
    );
    Ok(ParsedText { curves, format })
}
