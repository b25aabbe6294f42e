//! Shared primitives for the rocsift ROC curve engine.
//!
//! `rocsift-core` provides the foundation the other rocsift crates build on:
//!
//! - **Error types**: [`RocError`] and [`Result`] for structured error handling
//! - **Data model**: [`RocCurve`], [`ConfidenceBand`], [`BandLevel`], [`CurveSet`]
//! - **Guards**: numeric coercion and array assertions shared by all parsers
//! - **Canonicalization**: [`to_canonical`] and [`canonicalize`], the single
//!   choke point every ingestion path goes through
//! - **Traits**: [`Annotated`] and [`Summarizable`] for display layers

pub mod error;
pub mod guard;
pub mod curve;
pub mod canonical;
pub mod traits;

pub use canonical::{canonicalize, to_canonical, to_unchecked, CurveParts};
pub use curve::{BandLevel, ConfidenceBand, CurveKind, CurveSet, RocCurve, RocPoint};
pub use error::{Result, RocError};
pub use traits::*;
