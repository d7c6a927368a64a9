//! FILENAME: engine/src/temporal/unit.rs
//! PURPOSE: Calendar and clock units and the signed distance between two date-times.
//! CONTEXT: Time-based units measure the exact elapsed duration. Date-based
//! units count whole calendar periods, so a month is "same day-of-month next
//! month" rather than a fixed number of days.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemporalUnit {
    Millis,
    Seconds,
    Minutes,
    Hours,
    HalfDays,
    Days,
    Weeks,
    Months,
    Years,
    Decades,
    Centuries,
    Millennia,
}

impl TemporalUnit {
    pub const ALL: [TemporalUnit; 12] = [
        TemporalUnit::Millis,
        TemporalUnit::Seconds,
        TemporalUnit::Minutes,
        TemporalUnit::Hours,
        TemporalUnit::HalfDays,
        TemporalUnit::Days,
        TemporalUnit::Weeks,
        TemporalUnit::Months,
        TemporalUnit::Years,
        TemporalUnit::Decades,
        TemporalUnit::Centuries,
        TemporalUnit::Millennia,
    ];

    /// Canonical upper-case name, as used in generated column names.
    pub fn name(self) -> &'static str {
        match self {
            TemporalUnit::Millis => "MILLIS",
            TemporalUnit::Seconds => "SECONDS",
            TemporalUnit::Minutes => "MINUTES",
            TemporalUnit::Hours => "HOURS",
            TemporalUnit::HalfDays => "HALF_DAYS",
            TemporalUnit::Days => "DAYS",
            TemporalUnit::Weeks => "WEEKS",
            TemporalUnit::Months => "MONTHS",
            TemporalUnit::Years => "YEARS",
            TemporalUnit::Decades => "DECADES",
            TemporalUnit::Centuries => "CENTURIES",
            TemporalUnit::Millennia => "MILLENNIA",
        }
    }

    pub fn is_date_based(self) -> bool {
        !self.is_time_based()
    }

    pub fn is_time_based(self) -> bool {
        matches!(
            self,
            TemporalUnit::Millis
                | TemporalUnit::Seconds
                | TemporalUnit::Minutes
                | TemporalUnit::Hours
                | TemporalUnit::HalfDays
        )
    }

    /// Number of whole units from `start` to `end`, negative when `end` is
    /// earlier. Partial units are truncated toward zero.
    pub fn between(self, start: NaiveDateTime, end: NaiveDateTime) -> i64 {
        match self {
            TemporalUnit::Millis => end.signed_duration_since(start).num_milliseconds(),
            TemporalUnit::Seconds => end.signed_duration_since(start).num_seconds(),
            TemporalUnit::Minutes => end.signed_duration_since(start).num_minutes(),
            TemporalUnit::Hours => end.signed_duration_since(start).num_hours(),
            TemporalUnit::HalfDays => end.signed_duration_since(start).num_hours() / 12,
            TemporalUnit::Days => days_between(start.date(), calendar_end_date(start, end)),
            TemporalUnit::Weeks => days_between(start.date(), calendar_end_date(start, end)) / 7,
            TemporalUnit::Months => months_between(start.date(), calendar_end_date(start, end)),
            TemporalUnit::Years => months_between(start.date(), calendar_end_date(start, end)) / 12,
            TemporalUnit::Decades => months_between(start.date(), calendar_end_date(start, end)) / 120,
            TemporalUnit::Centuries => months_between(start.date(), calendar_end_date(start, end)) / 1_200,
            TemporalUnit::Millennia => months_between(start.date(), calendar_end_date(start, end)) / 12_000,
        }
    }
}

impl fmt::Display for TemporalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The end date used for calendar units: a day that has not yet reached the
/// start's time-of-day does not count as complete.
fn calendar_end_date(start: NaiveDateTime, end: NaiveDateTime) -> NaiveDate {
    let end_date = end.date();
    if end_date > start.date() && end.time() < start.time() {
        end_date.pred_opt().unwrap_or(end_date)
    } else if end_date < start.date() && end.time() > start.time() {
        end_date.succ_opt().unwrap_or(end_date)
    } else {
        end_date
    }
}

fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    end.signed_duration_since(start).num_days()
}

fn months_between(start: NaiveDate, end: NaiveDate) -> i64 {
    // 32 slots per month keep the day-of-month below the month digit
    let packed_start = proleptic_month(start) * 32 + start.day() as i64;
    let packed_end = proleptic_month(end) * 32 + end.day() as i64;
    (packed_end - packed_start) / 32
}

fn proleptic_month(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}
