//! FILENAME: engine/src/column/date_time.rs
//! PURPOSE: Column of packed date-time values.
//! CONTEXT: Rows are stored packed (see `packed_datetime`) so min/max and
//! sorting compare plain integers.

use chrono::NaiveDateTime;

use crate::error::EngineResult;
use crate::packed_datetime::{self, pack, unpack};
use crate::temporal::TemporalColumn;

/// Display pattern used by `get_string`.
pub const DATE_TIME_DISPLAY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeColumn {
    name: String,
    values: Vec<i64>,
}

impl DateTimeColumn {
    /// Sentinel stored for a missing row.
    pub const MISSING_VALUE: i64 = packed_datetime::MISSING;

    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, 0)
    }

    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        DateTimeColumn {
            name: name.into(),
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn from_values(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<NaiveDateTime>>,
    ) -> EngineResult<Self> {
        let mut column = Self::new(name);
        for value in values {
            match value {
                Some(v) => column.append(v)?,
                None => column.append_missing(),
            }
        }
        Ok(column)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn append(&mut self, value: NaiveDateTime) -> EngineResult<()> {
        self.values.push(pack(value)?);
        Ok(())
    }

    pub fn append_missing(&mut self) {
        self.values.push(Self::MISSING_VALUE);
    }

    /// Appends an already packed value.
    pub fn append_packed(&mut self, packed: i64) {
        self.values.push(packed);
    }

    pub fn get(&self, row: usize) -> Option<NaiveDateTime> {
        self.values.get(row).copied().and_then(unpack)
    }

    /// Packed value at `row`; `MISSING_VALUE` when out of range.
    pub fn packed(&self, row: usize) -> i64 {
        self.values.get(row).copied().unwrap_or(Self::MISSING_VALUE)
    }

    pub fn is_missing(&self, row: usize) -> bool {
        self.values.get(row) == Some(&Self::MISSING_VALUE)
    }

    pub fn count_missing(&self) -> usize {
        self.values.iter().filter(|v| **v == Self::MISSING_VALUE).count()
    }

    pub fn min(&self) -> Option<NaiveDateTime> {
        self.present().min().and_then(unpack)
    }

    pub fn max(&self) -> Option<NaiveDateTime> {
        self.present().max().and_then(unpack)
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<NaiveDateTime>> + '_ {
        self.values.iter().map(|v| unpack(*v))
    }

    pub fn get_string(&self, row: usize) -> String {
        self.get(row)
            .map(|v| v.format(DATE_TIME_DISPLAY_FORMAT).to_string())
            .unwrap_or_default()
    }

    fn present(&self) -> impl Iterator<Item = i64> + '_ {
        self.values
            .iter()
            .copied()
            .filter(|v| *v != Self::MISSING_VALUE)
    }
}

impl TemporalColumn for DateTimeColumn {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn packed_at(&self, row: usize) -> i64 {
        self.values[row]
    }

    fn min(&self) -> Option<NaiveDateTime> {
        DateTimeColumn::min(self)
    }
}
