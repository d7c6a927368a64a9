//! FILENAME: engine/src/column/number.rs
//! PURPOSE: Integer column, the output type of every temporal transform.

use crate::number_format::{format_integer, NumberFormat};

#[derive(Debug, Clone, PartialEq)]
pub struct NumberColumn {
    name: String,
    values: Vec<i64>,
    print_formatter: NumberFormat,
}

impl NumberColumn {
    /// Sentinel stored for a missing row.
    pub const MISSING_VALUE: i64 = i64::MIN;

    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, 0)
    }

    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        NumberColumn {
            name: name.into(),
            values: Vec::with_capacity(capacity),
            print_formatter: NumberFormat::General,
        }
    }

    pub fn from_values(name: impl Into<String>, values: impl IntoIterator<Item = Option<i64>>) -> Self {
        let mut column = Self::new(name);
        for value in values {
            match value {
                Some(v) => column.append(v),
                None => column.append_missing(),
            }
        }
        column
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

    pub fn append(&mut self, value: i64) {
        self.values.push(value);
    }

    pub fn append_missing(&mut self) {
        self.values.push(Self::MISSING_VALUE);
    }

    /// Value at `row`; None when the row is missing or out of range.
    pub fn get(&self, row: usize) -> Option<i64> {
        self.values
            .get(row)
            .copied()
            .filter(|v| *v != Self::MISSING_VALUE)
    }

    pub fn is_missing(&self, row: usize) -> bool {
        self.values.get(row) == Some(&Self::MISSING_VALUE)
    }

    pub fn count_missing(&self) -> usize {
        self.values.iter().filter(|v| **v == Self::MISSING_VALUE).count()
    }

    /// Raw storage, sentinels included.
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<i64>> + '_ {
        self.values
            .iter()
            .map(|v| if *v == Self::MISSING_VALUE { None } else { Some(*v) })
    }

    pub fn to_vec(&self) -> Vec<Option<i64>> {
        self.iter().collect()
    }

    pub fn print_formatter(&self) -> &NumberFormat {
        &self.print_formatter
    }

    pub fn set_print_formatter(&mut self, format: NumberFormat) {
        self.print_formatter = format;
    }

    /// Display text for `row`. Missing rows render as the empty string.
    pub fn get_string(&self, row: usize) -> String {
        match self.get(row) {
            Some(value) => format_integer(value, &self.print_formatter),
            None => String::new(),
        }
    }
}
