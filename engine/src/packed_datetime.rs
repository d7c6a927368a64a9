//! FILENAME: engine/src/packed_datetime.rs
//! PURPOSE: Encodes a calendar date-time as a single ordered i64.
//! CONTEXT: Date-time columns store one packed value per row. The layout is
//!
//! ```text
//!  63          48 47     40 39     32 31                    0
//! +--------------+---------+---------+-----------------------+
//! | year (i16)   | month   | day     | millisecond of day    |
//! +--------------+---------+---------+-----------------------+
//! ```
//!
//! Every field sits above the fields it dominates chronologically, so comparing
//! two packed values compares the date-times they encode. `MISSING` is
//! `i64::MIN`, which no real date-time can produce because month is never 0.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{EngineError, EngineResult};

/// Sentinel for a missing date-time.
pub const MISSING: i64 = i64::MIN;

pub const MILLIS_PER_SECOND: u32 = 1_000;
pub const MILLIS_PER_MINUTE: u32 = 60 * MILLIS_PER_SECOND;
pub const MILLIS_PER_HOUR: u32 = 60 * MILLIS_PER_MINUTE;
pub const MILLIS_PER_DAY: u32 = 24 * MILLIS_PER_HOUR;

const YEAR_SHIFT: u32 = 48;
const MONTH_SHIFT: u32 = 40;
const DAY_SHIFT: u32 = 32;
const FIELD_MASK: i64 = 0xFF;
const MILLIS_MASK: i64 = 0xFFFF_FFFF;

/// Packs a date-time. Precision below one millisecond is truncated.
/// Fails for years that do not fit in 16 bits.
pub fn pack(value: NaiveDateTime) -> EngineResult<i64> {
    let year = i16::try_from(value.year()).map_err(|_| EngineError::DateTimeOutOfRange(value))?;

    Ok(((year as i64) << YEAR_SHIFT)
        + ((value.month() as i64) << MONTH_SHIFT)
        + ((value.day() as i64) << DAY_SHIFT)
        + millis_of_time(value.time()) as i64)
}

/// Decodes a packed value. Returns None for `MISSING` and for values that do
/// not describe a real calendar date-time.
pub fn unpack(packed: i64) -> Option<NaiveDateTime> {
    if is_missing(packed) {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year(packed), month(packed), day(packed))?;
    let millis = millis_of_day(packed);
    let time = NaiveTime::from_num_seconds_from_midnight_opt(
        millis / MILLIS_PER_SECOND,
        (millis % MILLIS_PER_SECOND) * 1_000_000,
    )?;
    Some(date.and_time(time))
}

#[inline]
pub fn is_missing(packed: i64) -> bool {
    packed == MISSING
}

// Field accessors read the bits directly; callers check for MISSING first.

#[inline]
pub fn year(packed: i64) -> i32 {
    (packed >> YEAR_SHIFT) as i32
}

#[inline]
pub fn month(packed: i64) -> u32 {
    ((packed >> MONTH_SHIFT) & FIELD_MASK) as u32
}

#[inline]
pub fn day(packed: i64) -> u32 {
    ((packed >> DAY_SHIFT) & FIELD_MASK) as u32
}

#[inline]
pub fn millis_of_day(packed: i64) -> u32 {
    (packed & MILLIS_MASK) as u32
}

#[inline]
pub fn hour(packed: i64) -> u32 {
    millis_of_day(packed) / MILLIS_PER_HOUR
}

#[inline]
pub fn minute_of_day(packed: i64) -> u32 {
    millis_of_day(packed) / MILLIS_PER_MINUTE
}

#[inline]
pub fn second_of_day(packed: i64) -> u32 {
    millis_of_day(packed) / MILLIS_PER_SECOND
}

fn millis_of_time(time: NaiveTime) -> u32 {
    // chrono reports a leap second as nanos >= 1e9; it folds into x.999
    let millis = (time.nanosecond() / 1_000_000).min(MILLIS_PER_SECOND - 1);
    time.num_seconds_from_midnight() * MILLIS_PER_SECOND + millis
}
