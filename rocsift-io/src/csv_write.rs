//! Long-format ROC CSV export, the inverse of [`crate::csv::parse_csv_str`].

use std::collections::BTreeMap;

use ::csv::{QuoteStyle, Terminator, WriterBuilder};
use rocsift_core::{BandLevel, CurveSet, Result, RocCurve, RocError};

/// Write a curve collection as long-format CSV.
///
/// Rows are ordered by curve id (byte order), then by point index. The
/// `threshold` column is emitted when any curve has thresholds; band columns
/// are the union of every curve's band levels, ordered by level. Cells a curve
/// has no value for are left empty. Infinite thresholds are written as `inf`
/// / `-inf` so the output parses back to the same collection.
///
/// Rows of a curve whose id starts with `#` are written fully quoted so they
/// do not read back as comment lines.
///
/// # Errors
///
/// - [`RocError::InvalidInput`] if `curves` is empty or an id is blank
/// - [`RocError::Shape`] if a curve violates the canonical invariants
pub fn write_csv_string(curves: &CurveSet) -> Result<String> {
    if curves.is_empty() {
        return Err(RocError::InvalidInput(
            "ROC CSV export requires at least one curve.".into(),
        ));
    }
    for (id, curve) in curves {
        if id.trim().is_empty() {
            return Err(RocError::InvalidInput(format!(
                "curve id {id:?} cannot be written as a CSV curve_id."
            )));
        }
        curve.check(id)?;
    }

    let include_threshold = curves.values().any(|c| c.threshold.is_some());
    let levels = band_levels(curves);

    let mut header = vec!["curve_id".to_string(), "fpr".into(), "tpr".into()];
    if include_threshold {
        header.push("threshold".into());
    }
    for (key, _) in &levels {
        header.push(format!("lower_{key}"));
        header.push(format!("upper_{key}"));
    }

    let mut bytes = encode_records(&[header], QuoteStyle::Necessary)?;
    let mut rows = 0usize;
    for (id, curve) in curves {
        let records = curve_rows(id, curve, include_threshold, &levels);
        let style = if id.trim_start().starts_with('#') {
            QuoteStyle::Always
        } else {
            QuoteStyle::Necessary
        };
        bytes.extend(encode_records(&records, style)?);
        rows += records.len();
    }

    log::debug!(
        "wrote ROC CSV: {} curves, {rows} rows, {} band levels",
        curves.len(),
        levels.len()
    );
    String::from_utf8(bytes).map_err(|e| RocError::Csv(e.to_string()))
}

fn encode_records(records: &[Vec<String>], style: QuoteStyle) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .quote_style(style)
        .from_writer(Vec::new());
    for record in records {
        writer.write_record(record).map_err(csv_err)?;
    }
    writer
        .into_inner()
        .map_err(|e| RocError::Csv(e.to_string()))
}

/// Union of band levels across curves, keyed by label, in canonical order.
fn band_levels(curves: &CurveSet) -> Vec<(String, BandLevel)> {
    let mut by_key: BTreeMap<String, BandLevel> = BTreeMap::new();
    for band in curves.values().flat_map(|c| &c.bands) {
        by_key
            .entry(band.level.label())
            .or_insert_with(|| band.level.clone());
    }
    let mut levels: Vec<(String, BandLevel)> = by_key.into_iter().collect();
    levels.sort_by(|a, b| a.1.canonical_cmp(&b.1));
    levels
}

fn curve_rows(
    id: &str,
    curve: &RocCurve,
    include_threshold: bool,
    levels: &[(String, BandLevel)],
) -> Vec<Vec<String>> {
    let bands: Vec<_> = levels.iter().map(|(key, _)| curve.band(key)).collect();
    (0..curve.len())
        .map(|i| {
            let mut row = vec![
                id.to_string(),
                format_number(curve.fpr[i]),
                format_number(curve.tpr[i]),
            ];
            if include_threshold {
                let thr = curve.threshold.as_ref().and_then(|t| t[i]);
                row.push(format_threshold(thr));
            }
            for band in &bands {
                match band {
                    Some(band) => {
                        row.push(format_number(band.lower[i]));
                        row.push(format_number(band.upper[i]));
                    }
                    None => {
                        row.push(String::new());
                        row.push(String::new());
                    }
                }
            }
            row
        })
        .collect()
}

/// Shortest round-trip decimal; non-finite values become empty cells.
fn format_number(value: f64) -> String {
    if value.is_finite() {
        format!("{value}")
    } else {
        String::new()
    }
}

fn format_threshold(value: Option<f64>) -> String {
    match value {
        Some(v) if v == f64::INFINITY => "inf".into(),
        Some(v) if v == f64::NEG_INFINITY => "-inf".into(),
        Some(v) => format_number(v),
        None => String::new(),
    }
}

fn csv_err(e: ::csv::Error) -> RocError {
    RocError::Csv(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::parse_csv_str;
    use rocsift_core::to_canonical;
    use serde_json::json;

    fn sample() -> CurveSet {
        let mut set = CurveSet::new();
        set.insert(
            "zeta".into(),
            to_canonical(
                &json!({
                    "name": "zeta",
                    "fpr": [0, 0.25, 1], "tpr": [0, 0.6, 1],
                    "threshold": ["Infinity", 0.7, "-Infinity"],
                    "bands": [
                        {"level": 0.95, "lower": [0, 0.5, 1], "upper": [0, 0.7, 1]},
                        {"level": "wide", "lower": [0, 0.4, 1], "upper": [0.1, 0.8, 1]}
                    ]
                }),
                Some("zeta"),
            )
            .unwrap(),
        );
        set.insert(
            "alpha".into(),
            to_canonical(
                &json!({
                    "name": "alpha",
                    "fpr": [0, 1], "tpr": [0, 1],
                    "bands": [{"level": 0.5, "lower": [0, 1], "upper": [0, 1]}]
                }),
                Some("alpha"),
            )
            .unwrap(),
        );
        set
    }

    #[test]
    fn layout_and_ordering() {
        let text = write_csv_string(&sample()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "curve_id,fpr,tpr,threshold,lower_0.5,upper_0.5,lower_0.95,upper_0.95,lower_wide,upper_wide"
        );
        assert_eq!(lines[1], "alpha,0,0,,0,0,,,,");
        assert_eq!(lines[2], "alpha,1,1,,1,1,,,,");
        assert_eq!(lines[3], "zeta,0,0,inf,,,0,0,0,0.1");
        assert_eq!(lines[4], "zeta,0.25,0.6,0.7,,,0.5,0.7,0.4,0.8");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn round_trip_through_csv() {
        let original = sample();
        let text = write_csv_string(&original).unwrap();
        let parsed = parse_csv_str(&text).unwrap();
        assert_eq!(parsed.keys().collect::<Vec<_>>(), original.keys().collect::<Vec<_>>());
        for (id, curve) in &original {
            let back = &parsed[id];
            assert_eq!(back.fpr, curve.fpr);
            assert_eq!(back.tpr, curve.tpr);
            assert_eq!(back.bands, curve.bands);
        }
        assert_eq!(parsed["zeta"].threshold, original["zeta"].threshold);
        // alpha had no thresholds; its cells are blank and stay absent.
        assert!(parsed["alpha"].threshold.is_none());
    }

    #[test]
    fn quotes_ids_that_need_it() {
        let mut set = CurveSet::new();
        set.insert(
            "svm, rbf".into(),
            RocCurve::new(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap(),
        );
        let text = write_csv_string(&set).unwrap();
        assert!(text.contains("\"svm, rbf\",0,0"));
        assert!(parse_csv_str(&text).unwrap().contains_key("svm, rbf"));
    }

    #[test]
    fn rejects_empty_sets_and_blank_ids() {
        assert!(matches!(
            write_csv_string(&CurveSet::new()),
            Err(RocError::InvalidInput(_))
        ));
        let mut set = CurveSet::new();
        set.insert("  ".into(), RocCurve::new(vec![0.0], vec![0.0]).unwrap());
        assert!(matches!(write_csv_string(&set), Err(RocError::InvalidInput(_))));
    }

    #[test]
    fn hash_ids_are_quoted_not_commented_out() {
        let parsed = parse_csv_str("curve_id,fpr,tpr,threshold\n\"#a\",0,0,inf\n\"#a\",1,1,0.2\nb,0,0,1\nb,1,1,0\n").unwrap();
        assert_eq!(parsed.keys().collect::<Vec<_>>(), vec!["#a", "b"]);

        let text = write_csv_string(&parsed).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "\"#a\",\"0\",\"0\",\"inf\"");
        assert_eq!(lines[3], "b,0,0,1");

        let back = parse_csv_str(&text).unwrap();
        assert_eq!(back, parsed);
    }

    #[test]
    fn rejects_broken_curves() {
        let mut curve = RocCurve::new(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();
        curve.fpr = vec![1.0, 0.0];
        let mut set = CurveSet::new();
        set.insert("bad".into(), curve);
        assert!(matches!(write_csv_string(&set), Err(RocError::Shape(_))));
    }
}
