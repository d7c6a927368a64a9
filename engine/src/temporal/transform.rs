//! FILENAME: engine/src/temporal/transform.rs
//! PURPOSE: Difference, field extraction and time-window transforms.
//! CONTEXT: A missing value in any input row makes that output row missing.

use chrono::NaiveDateTime;

use super::{TemporalColumn, TemporalUnit};
use crate::column::NumberColumn;
use crate::error::{EngineError, EngineResult};
use crate::number_format::NumberFormat;
use crate::packed_datetime::{self, unpack};

/// Units accepted by `time_window`.
pub const WINDOW_UNITS: [TemporalUnit; 4] = [
    TemporalUnit::Days,
    TemporalUnit::Weeks,
    TemporalUnit::Months,
    TemporalUnit::Years,
];

// ============================================================================
// DIFFERENCES
// ============================================================================

/// Per row, the number of whole `unit`s from `this` to `other`; positive when
/// `other` is later. The result is named `"<this> - <other>"`.
pub fn difference<A, B>(this: &A, other: &B, unit: TemporalUnit) -> EngineResult<NumberColumn>
where
    A: TemporalColumn + ?Sized,
    B: TemporalColumn + ?Sized,
{
    ensure_same_length(this, other)?;

    let mut result = NumberColumn::with_capacity(
        format!("{} - {}", this.name(), other.name()),
        this.len(),
    );
    for row in 0..this.len() {
        match (unpack(this.packed_at(row)), unpack(other.packed_at(row))) {
            (Some(start), Some(end)) => result.append(unit.between(start, end)),
            _ => result.append_missing(),
        }
    }
    Ok(result)
}

pub fn difference_in_milliseconds<A, B>(this: &A, other: &B) -> EngineResult<NumberColumn>
where
    A: TemporalColumn + ?Sized,
    B: TemporalColumn + ?Sized,
{
    difference(this, other, TemporalUnit::Millis)
}

pub fn difference_in_seconds<A, B>(this: &A, other: &B) -> EngineResult<NumberColumn>
where
    A: TemporalColumn + ?Sized,
    B: TemporalColumn + ?Sized,
{
    difference(this, other, TemporalUnit::Seconds)
}

pub fn difference_in_minutes<A, B>(this: &A, other: &B) -> EngineResult<NumberColumn>
where
    A: TemporalColumn + ?Sized,
    B: TemporalColumn + ?Sized,
{
    difference(this, other, TemporalUnit::Minutes)
}

pub fn difference_in_hours<A, B>(this: &A, other: &B) -> EngineResult<NumberColumn>
where
    A: TemporalColumn + ?Sized,
    B: TemporalColumn + ?Sized,
{
    difference(this, other, TemporalUnit::Hours)
}

pub fn difference_in_days<A, B>(this: &A, other: &B) -> EngineResult<NumberColumn>
where
    A: TemporalColumn + ?Sized,
    B: TemporalColumn + ?Sized,
{
    difference(this, other, TemporalUnit::Days)
}

pub fn difference_in_years<A, B>(this: &A, other: &B) -> EngineResult<NumberColumn>
where
    A: TemporalColumn + ?Sized,
    B: TemporalColumn + ?Sized,
{
    difference(this, other, TemporalUnit::Years)
}

fn ensure_same_length<A, B>(this: &A, other: &B) -> EngineResult<()>
where
    A: TemporalColumn + ?Sized,
    B: TemporalColumn + ?Sized,
{
    if this.len() != other.len() {
        return Err(EngineError::LengthMismatch {
            left: this.name().to_string(),
            left_len: this.len(),
            right: other.name().to_string(),
            right_len: other.len(),
        });
    }
    Ok(())
}

// ============================================================================
// FIELD EXTRACTION
// ============================================================================

pub fn hour<C: TemporalColumn + ?Sized>(column: &C) -> NumberColumn {
    extract_field(column, "hour", packed_datetime::hour)
}

pub fn minute_of_day<C: TemporalColumn + ?Sized>(column: &C) -> NumberColumn {
    extract_field(column, "minute-of-day", packed_datetime::minute_of_day)
}

pub fn second_of_day<C: TemporalColumn + ?Sized>(column: &C) -> NumberColumn {
    extract_field(column, "second-of-day", packed_datetime::second_of_day)
}

fn extract_field<C, F>(column: &C, label: &str, field: F) -> NumberColumn
where
    C: TemporalColumn + ?Sized,
    F: Fn(i64) -> u32,
{
    let mut result = NumberColumn::with_capacity(format!("{}[{}]", column.name(), label), column.len());
    for row in 0..column.len() {
        let packed = column.packed_at(row);
        if unpack(packed).is_none() {
            result.append_missing();
        } else {
            result.append(field(packed) as i64);
        }
    }
    result
}

// ============================================================================
// TIME WINDOWS
// ============================================================================

/// Assigns each row the 0-based index of the `n`-unit window it falls into,
/// counting whole `unit`s from `start`.
///
/// Example: with `Days` and `n = 5`, a value 2 days after `start` lands in
/// window 0 and a value 7 days after lands in window 1. Values before `start`
/// get negative window indices, so every window spans exactly `n` units.
pub fn time_window<C: TemporalColumn + ?Sized>(
    column: &C,
    unit: TemporalUnit,
    n: u32,
    start: NaiveDateTime,
) -> EngineResult<NumberColumn> {
    if !WINDOW_UNITS.contains(&unit) {
        return Err(EngineError::UnsupportedTemporalUnit(unit));
    }
    if n == 0 {
        return Err(EngineError::InvalidWindowSize(n));
    }

    let width = n as i64;
    let mut result = NumberColumn::with_capacity(
        format!("{} {} window [{}]", n, unit, column.name()),
        column.len(),
    );
    for row in 0..column.len() {
        match unpack(column.packed_at(row)) {
            Some(value) => result.append(unit.between(start, value).div_euclid(width)),
            None => result.append_missing(),
        }
    }
    result.set_print_formatter(NumberFormat::Ints);

    log::debug!(
        "time window '{}': {} rows, origin {}",
        result.name(),
        result.len(),
        start
    );
    Ok(result)
}

/// `time_window` anchored at the column's earliest value.
pub fn time_window_from_min<C: TemporalColumn + ?Sized>(
    column: &C,
    unit: TemporalUnit,
    n: u32,
) -> EngineResult<NumberColumn> {
    // With no minimum every row is missing, so the origin is never read.
    let start = column.min().unwrap_or(NaiveDateTime::MIN);
    time_window(column, unit, n, start)
}

// ============================================================================
// METHOD SYNTAX
// ============================================================================

/// Method-call access to the transforms for every `TemporalColumn`.
pub trait DateTimeTransforms: TemporalColumn {
    fn difference<O: TemporalColumn + ?Sized>(
        &self,
        other: &O,
        unit: TemporalUnit,
    ) -> EngineResult<NumberColumn> {
        difference(self, other, unit)
    }

    fn difference_in_milliseconds<O: TemporalColumn + ?Sized>(&self, other: &O) -> EngineResult<NumberColumn> {
        difference(self, other, TemporalUnit::Millis)
    }

    fn difference_in_seconds<O: TemporalColumn + ?Sized>(&self, other: &O) -> EngineResult<NumberColumn> {
        difference(self, other, TemporalUnit::Seconds)
    }

    fn difference_in_minutes<O: TemporalColumn + ?Sized>(&self, other: &O) -> EngineResult<NumberColumn> {
        difference(self, other, TemporalUnit::Minutes)
    }

    fn difference_in_hours<O: TemporalColumn + ?Sized>(&self, other: &O) -> EngineResult<NumberColumn> {
        difference(self, other, TemporalUnit::Hours)
    }

    fn difference_in_days<O: TemporalColumn + ?Sized>(&self, other: &O) -> EngineResult<NumberColumn> {
        difference(self, other, TemporalUnit::Days)
    }

    fn difference_in_years<O: TemporalColumn + ?Sized>(&self, other: &O) -> EngineResult<NumberColumn> {
        difference(self, other, TemporalUnit::Years)
    }

    fn hour(&self) -> NumberColumn {
        hour(self)
    }

    fn minute_of_day(&self) -> NumberColumn {
        minute_of_day(self)
    }

    fn second_of_day(&self) -> NumberColumn {
        second_of_day(self)
    }

    fn time_window(&self, unit: TemporalUnit, n: u32, start: NaiveDateTime) -> EngineResult<NumberColumn> {
        time_window(self, unit, n, start)
    }

    fn time_window_from_min(&self, unit: TemporalUnit, n: u32) -> EngineResult<NumberColumn> {
        time_window_from_min(self, unit, n)
    }
}

impl<T: TemporalColumn + ?Sized> DateTimeTransforms for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::DateTimeColumn;
    use chrono::{Duration, NaiveDate};

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn column(name: &str, values: &[Option<NaiveDateTime>]) -> DateTimeColumn {
        DateTimeColumn::from_values(name, values.iter().copied()).unwrap()
    }

    fn daily(name: &str, first: NaiveDateTime, count: i64) -> DateTimeColumn {
        column(
            name,
            &(0..count).map(|i| Some(first + Duration::days(i))).collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_difference_names_result_this_minus_other() {
        let start = column("start", &[Some(dt(2020, 1, 1, 0, 0, 0))]);
        let end = column("end", &[Some(dt(2020, 1, 11, 0, 0, 0))]);
        let result = start.difference_in_days(&end).unwrap();
        assert_eq!(result.name(), "start - end");
        assert_eq!(result.to_vec(), vec![Some(10)]);
    }

    #[test]
    fn test_difference_is_positive_when_other_is_later() {
        let a = column("a", &[Some(dt(2020, 1, 1, 0, 0, 0)), Some(dt(2020, 1, 1, 6, 0, 0))]);
        let b = column("b", &[Some(dt(2020, 1, 1, 3, 0, 0)), Some(dt(2020, 1, 1, 0, 0, 0))]);
        assert_eq!(a.difference_in_hours(&b).unwrap().to_vec(), vec![Some(3), Some(-6)]);
        assert_eq!(a.difference_in_minutes(&b).unwrap().to_vec(), vec![Some(180), Some(-360)]);
        assert_eq!(a.difference_in_seconds(&b).unwrap().to_vec(), vec![Some(10_800), Some(-21_600)]);
        assert_eq!(
            a.difference_in_milliseconds(&b).unwrap().to_vec(),
            vec![Some(10_800_000), Some(-21_600_000)]
        );
    }

    #[test]
    fn test_difference_in_years_uses_calendar_truncation() {
        let a = column("a", &[Some(dt(2019, 1, 31, 0, 0, 0)), Some(dt(2020, 2, 29, 0, 0, 0))]);
        let b = column("b", &[Some(dt(2020, 1, 30, 0, 0, 0)), Some(dt(2024, 2, 29, 0, 0, 0))]);
        assert_eq!(difference_in_years(&a, &b).unwrap().to_vec(), vec![Some(0), Some(4)]);
    }

    #[test]
    fn test_missing_poisons_every_difference() {
        let a = column("a", &[None, Some(dt(2020, 1, 1, 0, 0, 0)), None]);
        let b = column("b", &[Some(dt(2020, 1, 1, 0, 0, 0)), None, None]);
        for unit in TemporalUnit::ALL {
            let result = difference(&a, &b, unit).unwrap();
            assert_eq!(result.to_vec(), vec![None, None, None], "unit {}", unit);
            assert_eq!(result.values(), &[NumberColumn::MISSING_VALUE; 3]);
        }
    }

    #[test]
    fn test_difference_rejects_length_mismatch() {
        let a = daily("a", dt(2020, 1, 1, 0, 0, 0), 3);
        let b = daily("b", dt(2020, 1, 1, 0, 0, 0), 2);
        assert_eq!(
            a.difference_in_days(&b),
            Err(EngineError::LengthMismatch {
                left: "a".to_string(),
                left_len: 3,
                right: "b".to_string(),
                right_len: 2,
            })
        );
    }

    #[test]
    fn test_field_extraction() {
        let c = column("ts", &[Some(dt(2021, 3, 4, 13, 45, 30)), None, Some(dt(2021, 3, 4, 0, 0, 1))]);

        let hours = c.hour();
        assert_eq!(hours.name(), "ts[hour]");
        assert_eq!(hours.to_vec(), vec![Some(13), None, Some(0)]);

        let minutes = c.minute_of_day();
        assert_eq!(minutes.name(), "ts[minute-of-day]");
        assert_eq!(minutes.to_vec(), vec![Some(825), None, Some(0)]);

        let seconds = c.second_of_day();
        assert_eq!(seconds.name(), "ts[second-of-day]");
        assert_eq!(seconds.to_vec(), vec![Some(49_530), None, Some(1)]);
    }

    #[test]
    fn test_undecodable_values_are_missing_everywhere() {
        // Month 13 decodes to no date at all
        let bad = packed_datetime::pack(dt(2021, 1, 1, 5, 0, 0)).unwrap() + (12_i64 << 40);
        let mut c = column("ts", &[Some(dt(2021, 3, 4, 13, 0, 0))]);
        c.append_packed(bad);
        let other = column("other", &[Some(dt(2021, 3, 5, 13, 0, 0)), Some(dt(2021, 3, 5, 13, 0, 0))]);

        assert_eq!(c.hour().to_vec(), vec![Some(13), None]);
        assert_eq!(c.minute_of_day().to_vec(), vec![Some(780), None]);
        assert_eq!(c.second_of_day().to_vec(), vec![Some(46_800), None]);
        assert_eq!(c.difference_in_days(&other).unwrap().to_vec(), vec![Some(1), None]);
        let start = dt(2021, 3, 1, 0, 0, 0);
        assert_eq!(c.time_window(TemporalUnit::Days, 1, start).unwrap().to_vec(), vec![Some(3), None]);
    }

    #[test]
    fn test_day_windows_partition_consecutive_days() {
        let day0 = dt(2022, 6, 1, 0, 0, 0);
        let c = daily("day", day0, 10);
        let windows = c.time_window(TemporalUnit::Days, 5, day0).unwrap();
        assert_eq!(windows.name(), "5 DAYS window [day]");
        assert_eq!(
            windows.to_vec(),
            vec![Some(0), Some(0), Some(0), Some(0), Some(0), Some(1), Some(1), Some(1), Some(1), Some(1)]
        );
        assert_eq!(windows.print_formatter(), &NumberFormat::Ints);
    }

    #[test]
    fn test_week_month_year_windows() {
        let origin = dt(2020, 1, 15, 0, 0, 0);
        let c = column(
            "when",
            &[
                Some(dt(2020, 1, 15, 0, 0, 0)),
                Some(dt(2020, 1, 28, 0, 0, 0)),
                Some(dt(2020, 1, 29, 0, 0, 0)),
                Some(dt(2020, 4, 14, 0, 0, 0)),
                Some(dt(2020, 4, 15, 0, 0, 0)),
                Some(dt(2022, 1, 15, 0, 0, 0)),
            ],
        );
        assert_eq!(
            time_window(&c, TemporalUnit::Weeks, 2, origin).unwrap().to_vec(),
            vec![Some(0), Some(0), Some(1), Some(6), Some(6), Some(52)]
        );
        assert_eq!(
            time_window(&c, TemporalUnit::Months, 3, origin).unwrap().to_vec(),
            vec![Some(0), Some(0), Some(0), Some(0), Some(1), Some(8)]
        );
        assert_eq!(
            time_window(&c, TemporalUnit::Years, 2, origin).unwrap().to_vec(),
            vec![Some(0), Some(0), Some(0), Some(0), Some(0), Some(1)]
        );
    }

    #[test]
    fn test_windows_before_origin_are_negative() {
        let origin = dt(2022, 6, 10, 0, 0, 0);
        let c = daily("day", dt(2022, 6, 5, 0, 0, 0), 6);
        assert_eq!(
            time_window(&c, TemporalUnit::Days, 5, origin).unwrap().to_vec(),
            vec![Some(-1), Some(-1), Some(-1), Some(-1), Some(-1), Some(0)]
        );
    }

    #[test]
    fn test_unsupported_window_unit() {
        let c = daily("day", dt(2022, 6, 1, 0, 0, 0), 3);
        for unit in [TemporalUnit::Hours, TemporalUnit::Minutes, TemporalUnit::Millis, TemporalUnit::Decades] {
            let err = c.time_window(unit, 3, dt(2022, 6, 1, 0, 0, 0)).unwrap_err();
            assert_eq!(err, EngineError::UnsupportedTemporalUnit(unit));
            assert!(err.to_string().contains(unit.name()));
        }
    }

    #[test]
    fn test_zero_width_window_is_rejected() {
        let c = daily("day", dt(2022, 6, 1, 0, 0, 0), 3);
        assert_eq!(
            c.time_window_from_min(TemporalUnit::Days, 0),
            Err(EngineError::InvalidWindowSize(0))
        );
    }

    #[test]
    fn test_window_from_min_anchors_at_earliest_value() {
        let c = column(
            "d",
            &[
                Some(dt(2022, 6, 9, 0, 0, 0)),
                None,
                Some(dt(2022, 6, 1, 0, 0, 0)),
                Some(dt(2022, 6, 4, 0, 0, 0)),
            ],
        );
        assert_eq!(
            c.time_window_from_min(TemporalUnit::Days, 3).unwrap().to_vec(),
            vec![Some(2), None, Some(0), Some(1)]
        );
    }

    #[test]
    fn test_window_from_min_on_all_missing_column() {
        let c = column("d", &[None, None]);
        let result = c.time_window_from_min(TemporalUnit::Months, 1).unwrap();
        assert_eq!(result.to_vec(), vec![None, None]);

        let empty = column("d", &[]);
        assert!(empty.time_window_from_min(TemporalUnit::Months, 1).unwrap().is_empty());
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let a = daily("a", dt(2020, 1, 1, 0, 0, 0), 4);
        let b = daily("b", dt(2021, 1, 1, 0, 0, 0), 4);
        let before = (a.clone(), b.clone());
        let _ = a.difference_in_days(&b).unwrap();
        let _ = a.time_window_from_min(TemporalUnit::Weeks, 1).unwrap();
        assert_eq!((a, b), before);
    }
}
