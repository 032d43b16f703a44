//! Grain values: a calendar unit paired with a positive multiplier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The calendar unit of a [`GrainSpec`].
///
/// Serializes as the lowercase unit name (`"minute"`, `"month"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrainUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl GrainUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            GrainUnit::Millisecond => "millisecond",
            GrainUnit::Second => "second",
            GrainUnit::Minute => "minute",
            GrainUnit::Hour => "hour",
            GrainUnit::Day => "day",
            GrainUnit::Week => "week",
            GrainUnit::Month => "month",
            GrainUnit::Year => "year",
        }
    }
}

impl fmt::Display for GrainUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A uniform time grain, e.g. `{ unit: Minute, count: 5 }` for five-minute buckets.
///
/// Serialized as a plain record: `{"unit":"month","count":3}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrainSpec {
    /// The calendar unit.
    pub unit: GrainUnit,
    /// How many units make up one step. Always positive for catalog grains.
    pub count: u32,
}

impl GrainSpec {
    pub const fn new(unit: GrainUnit, count: u32) -> Self {
        Self { unit, count }
    }
}

impl fmt::Display for GrainSpec {
    /// Renders as `"1 month"`, `"5 minutes"`, `"10 years"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.count == 1 { "" } else { "s" };
        write!(f, "{} {}{}", self.count, self.unit, plural)
    }
}
