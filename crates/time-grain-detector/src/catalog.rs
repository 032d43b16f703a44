//! The ordered table of candidate grains.
//!
//! Each [`GrainDescriptor`] pairs a grain with a predicate over the whole set
//! of instants. Rows run from the finest grain (millisecond) to the coarsest
//! (decade) and end with a sentinel that never aligns, so a scan for the
//! first failing row always finds one.
//!
//! All predicates read UTC fields. Instants produced by local midnight in a
//! zone away from UTC land on other UTC hours or dates; the day and
//! month-family checks tolerate the shapes that fixed offsets and a single
//! daylight-saving hour produce, and nothing more.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, Timelike};

use crate::grain::{GrainSpec, GrainUnit};
use crate::instant::{next_day, next_hour, Instant};

/// One row of the catalog.
#[derive(Debug, Clone, Copy)]
pub struct GrainDescriptor {
    /// `None` only for the terminal sentinel.
    pub grain: Option<GrainSpec>,
    /// Whether every instant in the set is consistent with `grain`.
    pub is_aligned: fn(&[Instant]) -> bool,
    /// A failing skippable row does not by itself end the aligned run.
    pub skippable: bool,
}

impl GrainDescriptor {
    const fn new(unit: GrainUnit, count: u32, is_aligned: fn(&[Instant]) -> bool) -> Self {
        Self {
            grain: Some(GrainSpec::new(unit, count)),
            is_aligned,
            skippable: false,
        }
    }

    const fn skippable(mut self) -> Self {
        self.skippable = true;
        self
    }

    const fn sentinel() -> Self {
        Self {
            grain: None,
            is_aligned: never,
            skippable: false,
        }
    }
}

/// Candidate grains, finest first, terminated by the sentinel.
pub static CATALOG: [GrainDescriptor; 13] = [
    GrainDescriptor::new(GrainUnit::Millisecond, 1, always),
    GrainDescriptor::new(GrainUnit::Second, 1, whole_seconds),
    GrainDescriptor::new(GrainUnit::Minute, 1, whole_minutes),
    GrainDescriptor::new(GrainUnit::Minute, 5, five_minutes),
    GrainDescriptor::new(GrainUnit::Minute, 10, ten_minutes),
    GrainDescriptor::new(GrainUnit::Hour, 1, same_minute),
    GrainDescriptor::new(GrainUnit::Day, 1, daily),
    GrainDescriptor::new(GrainUnit::Week, 1, same_weekday).skippable(),
    GrainDescriptor::new(GrainUnit::Month, 1, month_starts),
    GrainDescriptor::new(GrainUnit::Month, 3, quarter_starts),
    GrainDescriptor::new(GrainUnit::Year, 1, year_starts),
    GrainDescriptor::new(GrainUnit::Year, 10, decade_starts),
    GrainDescriptor::sentinel(),
];

// ── Sub-day grains ──────────────────────────────────────────────────────────

fn always(_: &[Instant]) -> bool {
    true
}

fn never(_: &[Instant]) -> bool {
    false
}

fn whole_seconds(instants: &[Instant]) -> bool {
    instants.iter().all(|d| d.timestamp_subsec_millis() == 0)
}

fn whole_minutes(instants: &[Instant]) -> bool {
    instants.iter().all(|d| d.second() == 0)
}

fn five_minutes(instants: &[Instant]) -> bool {
    instants.iter().all(|d| d.minute() % 5 == 0)
}

fn ten_minutes(instants: &[Instant]) -> bool {
    instants.iter().all(|d| d.minute() % 10 == 0)
}

/// Hourly data may sit at any fixed minute (offsets like +05:30), but only one.
fn same_minute(instants: &[Instant]) -> bool {
    distinct(instants, |d| d.minute()).len() <= 1
}

// ── Days and weeks ──────────────────────────────────────────────────────────

/// Daily points sit at one UTC hour, or at two hours one DST shift apart.
///
/// Two distinct hours are accepted when they differ by 1 or 23, and any two
/// points that share a UTC date are exactly 23 hours apart on the clock
/// (00:00 and 23:00 of the same date after a shift across midnight).
fn daily(instants: &[Instant]) -> bool {
    let hours = distinct(instants, |d| d.hour());
    if hours.len() <= 1 {
        return true;
    }
    if hours.len() > 2 {
        return false;
    }

    let mut hours_by_date: BTreeMap<NaiveDate, Vec<u32>> = BTreeMap::new();
    for d in instants {
        hours_by_date.entry(d.date_naive()).or_default().push(d.hour());
    }
    let same_date_consistent = hours_by_date.values().all(|same_date| {
        same_date.iter().enumerate().all(|(i, a)| {
            same_date[i + 1..].iter().all(|b| a.abs_diff(*b) == 23)
        })
    });
    if !same_date_consistent {
        return false;
    }

    let mut pair = hours.iter();
    match (pair.next(), pair.next()) {
        (Some(h1), Some(h2)) => matches!(h1.abs_diff(*h2), 1 | 23),
        _ => false,
    }
}

fn same_weekday(instants: &[Instant]) -> bool {
    distinct(instants, |d| d.weekday().num_days_from_sunday()).len() <= 1
}

// ── Month-family grains ─────────────────────────────────────────────────────

/// Which shifted readings of an instant may land on the 1st.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shifts {
    /// Unshifted and next-day readings.
    DayOnly,
    /// Additionally the next-hour reading.
    DayAndHour,
}

/// Whether the set looks like local midnight on the 1st of some period.
///
/// Behind UTC that instant is the 1st in UTC; ahead of UTC it is the last day
/// of the previous month, which a one-day shift moves onto the 1st. Zones at
/// UTC+0 that move to UTC+1 for daylight saving flip between the two, and a
/// one-hour shift catches them. Each reading must hold for every instant on
/// its own; `period` is checked on the same reading.
fn starts_period(instants: &[Instant], shifts: Shifts, period: fn(&Instant) -> bool) -> bool {
    let on_first = |d: Option<Instant>| d.is_some_and(|d| d.day() == 1 && period(&d));

    instants.iter().all(|d| on_first(Some(*d)))
        || instants.iter().all(|d| on_first(next_day(d)))
        || (shifts == Shifts::DayAndHour && instants.iter().all(|d| on_first(next_hour(d))))
}

fn month_starts(instants: &[Instant]) -> bool {
    starts_period(instants, Shifts::DayAndHour, |_| true)
}

fn quarter_starts(instants: &[Instant]) -> bool {
    starts_period(instants, Shifts::DayAndHour, |d| d.month0() % 3 == 0)
}

// Years always anchor on January 1st, where the hour-shift ambiguity does not arise.
fn year_starts(instants: &[Instant]) -> bool {
    starts_period(instants, Shifts::DayOnly, |d| d.month0() == 0)
}

fn decade_starts(instants: &[Instant]) -> bool {
    starts_period(instants, Shifts::DayOnly, |d| d.year().rem_euclid(10) == 0)
}

fn distinct<T: Ord>(instants: &[Instant], field: impl Fn(&Instant) -> T) -> BTreeSet<T> {
    instants.iter().map(field).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instant::parse_instant;

    fn instants(points: &[&str]) -> Vec<Instant> {
        points.iter().map(|p| parse_instant(p).unwrap()).collect()
    }

    fn row(unit: GrainUnit, count: u32) -> &'static GrainDescriptor {
        CATALOG
            .iter()
            .find(|d| d.grain == Some(GrainSpec::new(unit, count)))
            .unwrap()
    }

    fn aligned(unit: GrainUnit, count: u32, points: &[&str]) -> bool {
        (row(unit, count).is_aligned)(&instants(points))
    }

    // ── Table shape ─────────────────────────────────────────────────────

    #[test]
    fn test_catalog_is_ordered_finest_first() {
        let grains: Vec<GrainSpec> = CATALOG.iter().filter_map(|d| d.grain).collect();
        assert_eq!(grains.len(), CATALOG.len() - 1);
        assert!(grains
            .windows(2)
            .all(|w| (w[0].unit, w[0].count) < (w[1].unit, w[1].count)));
        assert_eq!(grains[0], GrainSpec::new(GrainUnit::Millisecond, 1));
        assert_eq!(grains[grains.len() - 1], GrainSpec::new(GrainUnit::Year, 10));
    }

    #[test]
    fn test_only_week_is_skippable() {
        let skippable: Vec<_> = CATALOG.iter().filter(|d| d.skippable).collect();
        assert_eq!(skippable.len(), 1);
        assert_eq!(skippable[0].grain, Some(GrainSpec::new(GrainUnit::Week, 1)));
    }

    #[test]
    fn test_sentinel_is_last_and_never_aligned() {
        let last = CATALOG.last().unwrap();
        assert!(last.grain.is_none());
        assert!(!(last.is_aligned)(&[]));
        assert!(!(last.is_aligned)(&instants(&["2000-01-01"])));
    }

    // ── Sub-day ─────────────────────────────────────────────────────────

    #[test]
    fn test_seconds_reject_milliseconds() {
        assert!(aligned(GrainUnit::Second, 1, &["2000-01-01T00:00:01"]));
        assert!(!aligned(GrainUnit::Second, 1, &["2000-01-01T00:00:01.001"]));
    }

    #[test]
    fn test_five_and_ten_minutes() {
        let points = ["2000-01-01T00:05", "2000-01-01T00:15"];
        assert!(aligned(GrainUnit::Minute, 5, &points));
        assert!(!aligned(GrainUnit::Minute, 10, &points));
    }

    #[test]
    fn test_hours_allow_one_fixed_minute() {
        assert!(aligned(GrainUnit::Hour, 1, &["2000-01-01T00:30", "2000-01-01T07:30"]));
        assert!(!aligned(GrainUnit::Hour, 1, &["2000-01-01T00:00", "2000-01-01T00:10"]));
    }

    // ── Days ────────────────────────────────────────────────────────────

    #[test]
    fn test_days_single_hour() {
        assert!(aligned(GrainUnit::Day, 1, &["2000-01-01T06:00Z", "2000-03-01T06:00Z"]));
    }

    #[test]
    fn test_days_dst_shift_of_one_hour() {
        assert!(aligned(
            GrainUnit::Day,
            1,
            &["2022-03-13T05:00:00Z", "2022-03-14T04:00:00Z"]
        ));
    }

    #[test]
    fn test_days_dst_shift_across_midnight() {
        assert!(aligned(
            GrainUnit::Day,
            1,
            &["2022-05-08T00:00:00Z", "2022-05-08T23:00:00Z", "2022-05-09T23:00:00Z"]
        ));
    }

    #[test]
    fn test_days_reject_three_hours() {
        assert!(!aligned(
            GrainUnit::Day,
            1,
            &["2000-01-01T01:00Z", "2000-01-02T02:00Z", "2000-01-03T03:00Z"]
        ));
    }

    #[test]
    fn test_days_reject_gap_other_than_one_or_twenty_three() {
        assert!(!aligned(GrainUnit::Day, 1, &["2000-01-01T01:00Z", "2000-01-02T03:00Z"]));
    }

    #[test]
    fn test_days_reject_same_date_one_hour_apart() {
        assert!(!aligned(GrainUnit::Day, 1, &["2000-01-01T04:00Z", "2000-01-01T05:00Z"]));
    }

    #[test]
    fn test_days_reject_repeated_hour_on_same_date() {
        assert!(!aligned(
            GrainUnit::Day,
            1,
            &["2000-01-01T00:00Z", "2000-01-01T00:00Z", "2000-01-02T23:00Z"]
        ));
    }

    #[test]
    fn test_weeks_need_one_weekday() {
        assert!(aligned(GrainUnit::Week, 1, &["2000-01-02", "2000-01-09", "2000-01-30"]));
        assert!(!aligned(GrainUnit::Week, 1, &["2000-01-02", "2000-01-10"]));
    }

    // ── Month family ────────────────────────────────────────────────────

    #[test]
    fn test_months_behind_utc() {
        assert!(aligned(
            GrainUnit::Month,
            1,
            &["2000-01-01T00:00:00-1200", "2000-02-01T00:00:00-1200"]
        ));
    }

    #[test]
    fn test_months_ahead_of_utc_use_day_shift() {
        assert!(aligned(
            GrainUnit::Month,
            1,
            &["2000-01-01T00:00:00+1200", "2000-02-01T00:00:00+1200"]
        ));
    }

    #[test]
    fn test_months_mixed_readings_use_hour_shift() {
        assert!(aligned(
            GrainUnit::Month,
            1,
            &["2022-02-28T23:00:00Z", "2022-04-01T00:00:00Z"]
        ));
    }

    #[test]
    fn test_months_do_not_mix_unshifted_and_day_shifted() {
        // The 1st at noon and the last day at noon: each reading fails for one point.
        assert!(!aligned(
            GrainUnit::Month,
            1,
            &["2000-01-01T12:00Z", "2000-02-29T12:00Z"]
        ));
    }

    #[test]
    fn test_quarters_check_month_on_shifted_reading() {
        assert!(aligned(
            GrainUnit::Month,
            3,
            &["2000-01-01T00:00:00+1200", "2000-04-01T00:00:00+1200"]
        ));
        assert!(!aligned(GrainUnit::Month, 3, &["2000-01-01", "2000-02-01"]));
    }

    #[test]
    fn test_years_and_decades() {
        assert!(aligned(GrainUnit::Year, 1, &["2000-01-01", "2001-01-01"]));
        assert!(!aligned(GrainUnit::Year, 1, &["2000-01-01", "2000-04-01"]));
        assert!(aligned(GrainUnit::Year, 10, &["2000-01-01", "2010-01-01"]));
        assert!(!aligned(GrainUnit::Year, 10, &["2000-01-01", "2001-01-01"]));
    }

    #[test]
    fn test_years_have_no_hour_shift() {
        assert!(!aligned(
            GrainUnit::Year,
            1,
            &["2021-12-31T23:00:00Z", "2023-01-01T00:00:00Z"]
        ));
    }

    #[test]
    fn test_decades_ahead_of_utc() {
        assert!(aligned(
            GrainUnit::Year,
            10,
            &["2000-01-01T00:00:00+1200", "2010-01-01T00:00:00+1200"]
        ));
    }

    #[test]
    fn test_empty_set_is_vacuously_aligned() {
        assert!(CATALOG
            .iter()
            .filter(|d| d.grain.is_some())
            .all(|d| (d.is_aligned)(&[])));
    }
}
