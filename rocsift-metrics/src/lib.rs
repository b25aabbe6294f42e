//! ROC metrics for rocsift.
//!
//! Derivation of empirical ROC curves from labeled scores, monotone
//! envelopes, trapezoidal AUC, and the curve validator/repairer.

pub mod auc;
pub mod empirical;
pub mod envelope;
pub mod validate;

pub use auc::{auc, curve_auc, trapezoidal_auc};
pub use empirical::{empirical_curve, empirical_roc, Sample};
pub use envelope::monotone_envelope;
pub use validate::{
    repair_collection, validate_collection, validate_curve, ValidateOptions, Validation,
    ValidationReport,
};
