//! Long-format ROC CSV parsing.
//!
//! One row per curve point, grouped by `curve_id`:
//!
//! ```text
//! curve_id,fpr,tpr,threshold,lower_0.95,upper_0.95
//! model_a,0,0,inf,0,0
//! model_a,0.5,0.8,0.4,0.7,0.9
//! model_a,1,1,-inf,1,1
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Every curve is passed
//! through [`rocsift_core::canonicalize`], so ingestion rules (ascending FPR,
//! values in `[0, 1]`) apply exactly as for JSON input.

use std::collections::{BTreeMap, HashMap};

use ::csv::{ReaderBuilder, StringRecord, Terminator};
use rocsift_core::guard::{parse_required_cell, parse_optional_cell, parse_threshold_cell};
use rocsift_core::{canonicalize, BandLevel, ConfidenceBand, CurveParts, CurveSet, Result, RocError};

/// Split one CSV line into fields.
///
/// Fields may be wrapped in double quotes; a doubled quote inside a quoted
/// field is a literal quote and commas inside quotes do not separate fields.
/// An empty line yields a single empty field. Only `\n` ends a record; a bare
/// `\r` inside the line is field content.
pub fn split_csv_line(line: &str) -> Result<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(line.as_bytes());
    let mut record = StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => Ok(record.iter().map(str::to_string).collect()),
        Ok(false) => Ok(vec![String::new()]),
        Err(e) => Err(RocError::Csv(e.to_string())),
    }
}

/// Column indices of one `lower_<label>` / `upper_<label>` pair.
#[derive(Debug)]
struct BandColumns {
    key: String,
    raw_label: String,
    level: BandLevel,
    lower: Option<usize>,
    upper: Option<usize>,
}

#[derive(Debug)]
struct Layout {
    curve_id: usize,
    fpr: usize,
    tpr: usize,
    threshold: Option<usize>,
    bands: Vec<BandColumns>,
}

impl Layout {
    fn from_header(cells: &[String]) -> Result<Self> {
        let mut index: HashMap<String, usize> = HashMap::new();
        for (idx, name) in cells.iter().enumerate() {
            if !name.is_empty() {
                index.insert(name.to_lowercase(), idx);
            }
        }
        let (Some(&curve_id), Some(&fpr), Some(&tpr)) =
            (index.get("curve_id"), index.get("fpr"), index.get("tpr"))
        else {
            return Err(RocError::Parse(
                "ROC CSV must include curve_id, fpr, and tpr columns.".into(),
            ));
        };

        let mut bands: Vec<BandColumns> = Vec::new();
        for (idx, name) in cells.iter().enumerate() {
            let lowered = name.to_lowercase();
            let is_lower = lowered.starts_with("lower_");
            if !is_lower && !lowered.starts_with("upper_") {
                continue;
            }
            let token = name.get("lower_".len()..).unwrap_or("").trim();
            let level = BandLevel::from_token(token).ok_or_else(|| {
                RocError::Parse(format!(
                    "Band column \"{name}\" must specify a level, e.g. lower_0.95."
                ))
            })?;
            let key = token.split_whitespace().collect::<Vec<_>>().join("_");
            let pos = match bands.iter().position(|b| b.key == key) {
                Some(pos) => pos,
                None => {
                    bands.push(BandColumns {
                        key,
                        raw_label: token.to_string(),
                        level,
                        lower: None,
                        upper: None,
                    });
                    bands.len() - 1
                }
            };
            if is_lower {
                bands[pos].lower = Some(idx);
            } else {
                bands[pos].upper = Some(idx);
            }
        }
        if let Some(unpaired) = bands.iter().find(|b| b.lower.is_none() || b.upper.is_none()) {
            return Err(RocError::Parse(format!(
                "Band level \"{}\" must include both lower_ and upper_ columns.",
                unpaired.raw_label
            )));
        }

        Ok(Self {
            curve_id,
            fpr,
            tpr,
            threshold: index.get("threshold").copied(),
            bands,
        })
    }
}

/// Points collected for one `curve_id`, in row order.
#[derive(Debug, Default)]
struct Group {
    rows: Vec<usize>,
    fpr: Vec<f64>,
    tpr: Vec<f64>,
    threshold: Vec<Option<f64>>,
    lower: Vec<Vec<Option<f64>>>,
    upper: Vec<Vec<Option<f64>>>,
}

impl Group {
    fn new(band_count: usize) -> Self {
        Self {
            lower: vec![Vec::new(); band_count],
            upper: vec![Vec::new(); band_count],
            ..Default::default()
        }
    }

    fn into_curve(self, id: &str, layout: &Layout) -> Result<rocsift_core::RocCurve> {
        let threshold = if layout.threshold.is_some() {
            let missing = self.threshold.iter().position(Option::is_none);
            let present = self.threshold.iter().any(Option::is_some);
            match (present, missing) {
                (false, _) => None,
                (true, None) => Some(self.threshold),
                (true, Some(pos)) => {
                    return Err(RocError::Parse(format!(
                        "{id}.threshold column must contain a numeric value for every row \
                         (missing on row {}).",
                        self.rows[pos]
                    )))
                }
            }
        } else {
            None
        };

        let mut bands = Vec::new();
        for ((cols, lower), upper) in layout.bands.iter().zip(self.lower).zip(self.upper) {
            let has_lower = lower.iter().any(Option::is_some);
            let has_upper = upper.iter().any(Option::is_some);
            if has_lower != has_upper {
                return Err(RocError::Parse(format!(
                    "{id} band level \"{}\" must include both lower and upper values.",
                    cols.raw_label
                )));
            }
            if !has_lower {
                continue;
            }
            let gap = lower
                .iter()
                .zip(&upper)
                .position(|(l, u)| l.is_none() || u.is_none());
            if let Some(pos) = gap {
                return Err(RocError::Parse(format!(
                    "{id} band level \"{}\" has missing values on row {}.",
                    cols.raw_label, self.rows[pos]
                )));
            }
            bands.push(ConfidenceBand {
                level: cols.level.clone(),
                lower: lower.into_iter().flatten().collect(),
                upper: upper.into_iter().flatten().collect(),
            });
        }

        canonicalize(
            CurveParts {
                name: Some(id.to_string()),
                fpr: self.fpr,
                tpr: self.tpr,
                threshold,
                bands,
                metadata: None,
            },
            id,
        )
    }
}

/// Parse long-format ROC CSV text into a curve collection.
///
/// Row numbers in error messages are 1-based physical line numbers.
///
/// # Errors
///
/// Fails on the first problem: missing required columns, an unpaired band
/// column, a missing `curve_id`, a non-numeric cell, partially present
/// thresholds or bands within one curve, or any canonical shape violation.
/// No partial collection is returned.
pub fn parse_csv_str(text: &str) -> Result<CurveSet> {
    if text.trim().is_empty() {
        return Err(RocError::Parse("ROC CSV text must be a non-empty string.".into()));
    }

    let mut lines = text
        .split('\n')
        .enumerate()
        .map(|(i, line)| (i + 1, line.strip_suffix('\r').unwrap_or(line)))
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        });

    let Some((_, header_line)) = lines.next() else {
        return Err(RocError::Parse(
            "ROC CSV text does not contain any data rows.".into(),
        ));
    };
    let header: Vec<String> = split_csv_line(header_line.trim_start_matches('\u{feff}'))?
        .into_iter()
        .map(|cell| cell.trim().to_string())
        .collect();
    let layout = Layout::from_header(&header)?;

    let mut groups: BTreeMap<String, Group> = BTreeMap::new();
    let mut row_count = 0usize;
    for (row_no, line) in lines {
        let row = split_csv_line(line)?;
        let cell = |idx: usize| row.get(idx).map(String::as_str);

        let curve_id = cell(layout.curve_id).unwrap_or("").trim().to_string();
        if curve_id.is_empty() {
            return Err(RocError::Parse(format!("curve_id is required on row {row_no}.")));
        }

        let fpr = parse_required_cell(cell(layout.fpr), &format!("{curve_id}.fpr"), row_no)?;
        let tpr = parse_required_cell(cell(layout.tpr), &format!("{curve_id}.tpr"), row_no)?;
        let threshold = match layout.threshold {
            Some(idx) => parse_threshold_cell(cell(idx), &format!("{curve_id}.threshold"), row_no)?,
            None => None,
        };

        let group = groups
            .entry(curve_id.clone())
            .or_insert_with(|| Group::new(layout.bands.len()));
        group.rows.push(row_no);
        group.fpr.push(fpr);
        group.tpr.push(tpr);
        group.threshold.push(threshold);
        for (b, cols) in layout.bands.iter().enumerate() {
            let lower = parse_optional_cell(
                cols.lower.and_then(cell),
                &format!("{curve_id}.lower_{}", cols.key),
                row_no,
            )?;
            let upper = parse_optional_cell(
                cols.upper.and_then(cell),
                &format!("{curve_id}.upper_{}", cols.key),
                row_no,
            )?;
            group.lower[b].push(lower);
            group.upper[b].push(upper);
        }
        row_count += 1;
    }

    if groups.is_empty() {
        return Err(RocError::Parse(
            "ROC CSV must include at least one data row.".into(),
        ));
    }

    let mut curves = CurveSet::new();
    for (id, group) in groups {
        let curve = group.into_curve(&id, &layout)?;
        log::debug!("ROC CSV curve {id}: {} points", curve.len());
        curves.insert(id, curve);
    }
    log::debug!(
        "parsed ROC CSV: {} curves from {row_count} rows",
        curves.len()
    );
    Ok(curves)
}
