//! # time-grain-detector
//!
//! Infer the coarsest uniform time grain a set of timestamps is aligned to.
//!
//! Given `["2000-01-01", "2000-02-01"]` the detector reports `1 month`; given
//! five-minute readings it reports `5 minutes`. Only the points themselves are
//! used, so the bucketing interval of a series can be recovered without
//! metadata.
//!
//! All checks read UTC calendar fields. Points written at local midnight in a
//! zone with a fixed offset or a single daylight-saving hour are still
//! recognised as daily, monthly, quarterly or yearly.
//!
//! ## Modules
//!
//! - [`instant`] — Timestamp inputs → UTC instants
//! - [`grain`] — `GrainUnit` / `GrainSpec` values
//! - [`catalog`] — Ordered candidate grains and their alignment checks
//! - [`detect`] — Selection rule, `detect_grain`, `explain_grain`
//! - [`error`] — Error types
//!
//! ## Example
//!
//! ```
//! use time_grain_detector::{detect_grain, GrainSpec, GrainUnit};
//!
//! let grain = detect_grain(["2000-01-01", "2010-01-01"]).unwrap();
//! assert_eq!(grain, GrainSpec::new(GrainUnit::Year, 10));
//! ```

pub mod catalog;
pub mod detect;
pub mod error;
pub mod grain;
pub mod instant;

pub use catalog::{GrainDescriptor, CATALOG};
pub use detect::{
    detect_grain, detect_grain_from_instants, explain_grain, GrainCheck, GrainReport,
};
pub use error::{GrainError, Result};
pub use grain::{GrainSpec, GrainUnit};
pub use instant::{parse_instant, parse_points, Instant, TimestampLike};
