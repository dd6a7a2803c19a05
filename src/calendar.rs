//! Calendar partitioning of event timestamps into (year, week) buckets

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use thiserror::Error;

/// Date and whole-second part of `event_time`, e.g. `2017-01-06T12:55:55`
pub const EVENT_TIME_SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Maximum digits accepted after the seconds' decimal point
pub const MAX_FRACTION_DIGITS: usize = 6;

#[derive(Debug, Error)]
pub enum EventTimeError {
    #[error("missing trailing `Z`")]
    MissingZulu,

    #[error("expected `.` followed by 1 to 6 fractional digits")]
    Fraction,

    #[error(transparent)]
    Parse(#[from] chrono::ParseError),
}

/// Calendar partition of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearWeek {
    pub year: i32,
    pub week: u32,
}

/// Parse an `event_time` string in strict `YYYY-MM-DDThh:mm:ss.sssZ` form.
///
/// The decimal point is mandatory and the fraction holds 1 to 6 digits.
pub fn parse_event_time(raw: &str) -> Result<NaiveDateTime, EventTimeError> {
    let body = raw.strip_suffix('Z').ok_or(EventTimeError::MissingZulu)?;
    let (seconds, fraction) = body.rsplit_once('.').ok_or(EventTimeError::Fraction)?;
    if fraction.is_empty()
        || fraction.len() > MAX_FRACTION_DIGITS
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(EventTimeError::Fraction);
    }

    let time = NaiveDateTime::parse_from_str(seconds, EVENT_TIME_SECONDS_FORMAT)?;
    let nanos: u32 = format!("{fraction:0<9}")
        .parse()
        .map_err(|_| EventTimeError::Fraction)?;
    time.with_nanosecond(nanos).ok_or(EventTimeError::Fraction)
}

/// Monday-based week of year.
///
/// Counts the Mondays that have occurred since January 1st; days before the
/// first Monday fall in week 0. This is the `%W` numbering, not ISO weeks.
pub fn week_of_year(date: NaiveDate) -> u32 {
    (date.ordinal0() + 7 - date.weekday().num_days_from_monday()) / 7
}

/// Parse a timestamp and derive its calendar partition
pub fn year_week(raw: &str) -> Result<YearWeek, EventTimeError> {
    let date = parse_event_time(raw)?.date();
    Ok(YearWeek {
        year: date.year(),
        week: week_of_year(date),
    })
}

/// Observed week window for one year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWeekRange {
    pub min_week: u32,
    pub max_week: u32,
}

impl YearWeekRange {
    pub fn weeks(&self) -> RangeInclusive<u32> {
        self.min_week..=self.max_week
    }

    pub fn len(&self) -> u32 {
        self.max_week - self.min_week + 1
    }
}

/// Dataset-wide min/max week per year. Ranges only ever widen.
#[derive(Debug, Clone, Default)]
pub struct YearWeekTracker {
    ranges: BTreeMap<i32, YearWeekRange>,
}

impl YearWeekTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Widen the range of `at.year` to include `at.week`
    pub fn observe(&mut self, at: YearWeek) {
        self.ranges
            .entry(at.year)
            .and_modify(|range| {
                range.min_week = range.min_week.min(at.week);
                range.max_week = range.max_week.max(at.week);
            })
            .or_insert(YearWeekRange {
                min_week: at.week,
                max_week: at.week,
            });
    }

    pub fn get(&self, year: i32) -> Option<&YearWeekRange> {
        self.ranges.get(&year)
    }

    /// Years in ascending order with their ranges
    pub fn iter(&self) -> impl Iterator<Item = (i32, &YearWeekRange)> {
        self.ranges.iter().map(|(year, range)| (*year, range))
    }

    /// Every (year, week) inside the tracked windows, in calendar order
    pub fn partitions(&self) -> impl Iterator<Item = YearWeek> + '_ {
        self.iter()
            .flat_map(|(year, range)| range.weeks().map(move |week| YearWeek { year, week }))
    }

    /// Number of distinct weeks across all tracked years
    pub fn total_weeks(&self) -> u32 {
        self.ranges.values().map(YearWeekRange::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }
}
