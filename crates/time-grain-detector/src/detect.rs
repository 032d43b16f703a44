//! Grain selection over the catalog.
//!
//! # Selection rule
//!
//! Every descriptor is evaluated against the parsed instants. Two indices are
//! then taken: the first failing row overall, and the first failing row that
//! is not skippable. When the two are more than one row apart the skippable
//! failure is bridged and the later index wins; otherwise the first failure
//! stands. The reported grain is the row just before the chosen index.
//!
//! In practice this means a weekly cadence is reported when every point
//! shares a weekday and month alignment fails, while daily data that also
//! happens to fall on month starts keeps climbing past the failed week row.

use serde::Serialize;

use crate::catalog::{GrainDescriptor, CATALOG};
use crate::error::Result;
use crate::grain::{GrainSpec, GrainUnit};
use crate::instant::{parse_points, Instant, TimestampLike};

const FINEST: GrainSpec = GrainSpec::new(GrainUnit::Millisecond, 1);

/// Outcome of one catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GrainCheck {
    /// `None` for the sentinel row.
    pub grain: Option<GrainSpec>,
    pub aligned: bool,
    pub skippable: bool,
}

/// Every check behind a detection, with the grain it selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrainReport {
    /// The detected grain.
    pub grain: GrainSpec,
    /// Index of the first failing row.
    pub first_mismatch: usize,
    /// Index of the first failing non-skippable row.
    pub first_mismatch_with_skips: usize,
    /// One entry per catalog row, in catalog order.
    pub checks: Vec<GrainCheck>,
}

/// Detect the coarsest grain a set of timestamps is aligned to.
///
/// # Arguments
///
/// * `points` — Timestamps as text, pre-parsed instants, or epoch
///   milliseconds (anything convertible into [`TimestampLike`])
///
/// # Returns
///
/// The coarsest [`GrainSpec`] whose alignment holds for every point under the
/// selection rule. An empty input satisfies every check and yields the
/// coarsest grain, `10 years`; a single point yields the coarsest grain its
/// own fields allow.
///
/// # Errors
///
/// Returns [`GrainError::InvalidDate`](crate::GrainError::InvalidDate) for
/// the first input that cannot be parsed. Nothing is classified in that case.
///
/// # Examples
///
/// ```
/// use time_grain_detector::{detect_grain, GrainSpec, GrainUnit};
///
/// let grain = detect_grain(["2000-01-01", "2000-04-01"]).unwrap();
/// assert_eq!(grain, GrainSpec::new(GrainUnit::Month, 3));
///
/// // Local midnight in New York, either side of the spring DST change.
/// let grain = detect_grain(["2022-03-13T05:00:00Z", "2022-03-14T04:00:00Z"]).unwrap();
/// assert_eq!(grain.to_string(), "1 day");
/// ```
pub fn detect_grain<'a, I, T>(points: I) -> Result<GrainSpec>
where
    I: IntoIterator<Item = T>,
    T: Into<TimestampLike<'a>>,
{
    let instants = parse_points(points)?;
    Ok(detect_grain_from_instants(&instants))
}

/// Like [`detect_grain`], returning every catalog check alongside the grain.
///
/// # Errors
///
/// Same as [`detect_grain`].
pub fn explain_grain<'a, I, T>(points: I) -> Result<GrainReport>
where
    I: IntoIterator<Item = T>,
    T: Into<TimestampLike<'a>>,
{
    let instants = parse_points(points)?;
    Ok(explain_instants(&instants))
}

/// Detect the grain of already-resolved instants.
pub fn detect_grain_from_instants(instants: &[Instant]) -> GrainSpec {
    explain_instants(instants).grain
}

fn explain_instants(instants: &[Instant]) -> GrainReport {
    let checks: Vec<GrainCheck> = CATALOG
        .iter()
        .map(|descriptor| evaluate(descriptor, instants))
        .collect();

    let (grain, first_mismatch, first_mismatch_with_skips) = select(&checks);
    tracing::debug!(
        points = instants.len(),
        first_mismatch,
        first_mismatch_with_skips,
        %grain,
        "detected time grain"
    );

    GrainReport {
        grain,
        first_mismatch,
        first_mismatch_with_skips,
        checks,
    }
}

fn evaluate(descriptor: &GrainDescriptor, instants: &[Instant]) -> GrainCheck {
    let aligned = (descriptor.is_aligned)(instants);
    tracing::trace!(grain = ?descriptor.grain, aligned, "grain check");
    GrainCheck {
        grain: descriptor.grain,
        aligned,
        skippable: descriptor.skippable,
    }
}

/// Apply the selection rule to evaluated checks.
///
/// Returns the selected grain and both mismatch indices.
fn select(checks: &[GrainCheck]) -> (GrainSpec, usize, usize) {
    let first_mismatch = position_of_mismatch(checks, |_| true);
    let first_mismatch_with_skips = position_of_mismatch(checks, |c| !c.skippable);

    let mismatch = if first_mismatch_with_skips > first_mismatch + 1 {
        first_mismatch_with_skips
    } else {
        first_mismatch
    };

    // Row 0 always aligns and the sentinel never does, so `mismatch` is in
    // 1..len and the row before it carries a grain.
    let grain = mismatch
        .checked_sub(1)
        .and_then(|i| checks.get(i))
        .and_then(|c| c.grain)
        .unwrap_or(FINEST);

    (grain, first_mismatch, first_mismatch_with_skips)
}

fn position_of_mismatch(checks: &[GrainCheck], counts: impl Fn(&GrainCheck) -> bool) -> usize {
    checks
        .iter()
        .position(|c| counts(c) && !c.aligned)
        .unwrap_or(checks.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checks(aligned: &[bool]) -> Vec<GrainCheck> {
        CATALOG
            .iter()
            .zip(aligned)
            .map(|(d, &aligned)| GrainCheck {
                grain: d.grain,
                aligned,
                skippable: d.skippable,
            })
            .collect()
    }

    fn select_grain(aligned: &[bool]) -> GrainSpec {
        select(&checks(aligned)).0
    }

    /// Every grain row aligned; the sentinel never is.
    const ALL_TRUE: [bool; 13] = {
        let mut aligned = [true; 13];
        aligned[12] = false;
        aligned
    };

    #[test]
    fn test_select_everything_aligned_is_decade() {
        assert_eq!(select_grain(&ALL_TRUE), GrainSpec::new(GrainUnit::Year, 10));
    }

    #[test]
    fn test_select_stops_at_first_non_skippable_failure() {
        let mut aligned = ALL_TRUE;
        aligned[5] = false; // hour
        assert_eq!(select_grain(&aligned), GrainSpec::new(GrainUnit::Minute, 10));
    }

    #[test]
    fn test_select_week_when_month_fails() {
        let mut aligned = ALL_TRUE;
        aligned[8] = false;
        aligned[9] = false;
        assert_eq!(select_grain(&aligned), GrainSpec::new(GrainUnit::Week, 1));
    }

    #[test]
    fn test_select_day_when_week_and_month_fail() {
        let mut aligned = ALL_TRUE;
        aligned[7] = false;
        aligned[8] = false;
        let (grain, first, with_skips) = select(&checks(&aligned));
        assert_eq!((first, with_skips), (7, 8));
        assert_eq!(grain, GrainSpec::new(GrainUnit::Day, 1));
    }

    #[test]
    fn test_select_bridges_week_failure_when_month_aligns() {
        let mut aligned = ALL_TRUE;
        aligned[7] = false;
        aligned[9] = false;
        let (grain, first, with_skips) = select(&checks(&aligned));
        assert_eq!((first, with_skips), (7, 9));
        assert_eq!(grain, GrainSpec::new(GrainUnit::Month, 1));
    }

    #[test]
    fn test_select_bridges_week_failure_up_to_sentinel() {
        let mut aligned = ALL_TRUE;
        aligned[7] = false;
        assert_eq!(select_grain(&aligned), GrainSpec::new(GrainUnit::Year, 10));
    }

    #[test]
    fn test_report_lists_every_row() {
        let instants: Vec<Instant> = ["2000-01-01", "2000-01-02"]
            .iter()
            .map(|p| crate::instant::parse_instant(p).unwrap())
            .collect();
        let report = explain_instants(&instants);
        assert_eq!(report.checks.len(), CATALOG.len());
        assert_eq!(report.grain, GrainSpec::new(GrainUnit::Day, 1));
        assert_eq!(report.first_mismatch, 7);
        assert_eq!(report.first_mismatch_with_skips, 8);
        assert!(report.checks[7].skippable);
        assert!(!report.checks[7].aligned);
    }

    #[test]
    fn test_report_serializes_with_null_sentinel() {
        let report = explain_grain(["2000-01-01", "2010-01-01"]).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["grain"]["unit"], "year");
        assert_eq!(json["grain"]["count"], 10);
        assert!(json["checks"][12]["grain"].is_null());
    }
}
