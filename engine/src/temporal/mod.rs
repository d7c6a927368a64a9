//! FILENAME: engine/src/temporal/mod.rs
//! PURPOSE: Row-wise transforms over date-time columns.
//! CONTEXT: Any type that can hand out packed values by row implements
//! `TemporalColumn` and picks up every transform through `DateTimeTransforms`.
//! The transforms never mutate their inputs; each call builds a fresh
//! `NumberColumn`.

pub mod transform;
pub mod unit;

use chrono::NaiveDateTime;

pub use transform::{
    difference, difference_in_days, difference_in_hours, difference_in_milliseconds,
    difference_in_minutes, difference_in_seconds, difference_in_years, hour, minute_of_day,
    second_of_day, time_window, time_window_from_min, DateTimeTransforms, WINDOW_UNITS,
};
pub use unit::TemporalUnit;

/// Read access to a column of packed date-times.
pub trait TemporalColumn {
    fn name(&self) -> &str;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Packed value at `row`, or `packed_datetime::MISSING`.
    /// `row` must be below `len()`.
    fn packed_at(&self, row: usize) -> i64;

    /// Earliest non-missing value.
    fn min(&self) -> Option<NaiveDateTime>;
}
