//! Display-facing trait definitions shared across rocsift crates.

use crate::curve::RocCurve;

/// A type that carries a human-readable label.
pub trait Annotated {
    /// A human-readable name, if one was supplied.
    fn name(&self) -> Option<&str>;

    /// An optional description.
    fn description(&self) -> Option<&str> {
        None
    }
}

/// A type that can produce a summary of its contents.
pub trait Summarizable {
    /// A one-line summary suitable for display.
    fn summary(&self) -> String;
}

impl Annotated for RocCurve {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("description"))
            .and_then(|d| d.as_str())
    }
}

impl Summarizable for RocCurve {
    fn summary(&self) -> String {
        let mut out = format!(
            "{}: {} points",
            self.name.as_deref().unwrap_or("ROC"),
            self.len()
        );
        if self.threshold.is_some() {
            out.push_str(", thresholds");
        }
        if !self.bands.is_empty() {
            let levels: Vec<String> = self.bands.iter().map(|b| b.level.label()).collect();
            out.push_str(&format!(", bands [{}]", levels.join(", ")));
        }
        out
    }
}
