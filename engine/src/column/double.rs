//! FILENAME: engine/src/column/double.rs
//! PURPOSE: Floating point column. NaN marks a missing row.

use crate::number_format::{format_number, NumberFormat};

#[derive(Debug, Clone, PartialEq)]
pub struct DoubleColumn {
    name: String,
    values: Vec<f64>,
    print_formatter: NumberFormat,
}

impl DoubleColumn {
    pub const MISSING_VALUE: f64 = f64::NAN;

    pub fn new(name: impl Into<String>) -> Self {
        DoubleColumn {
            name: name.into(),
            values: Vec::new(),
            print_formatter: NumberFormat::General,
        }
    }

    pub fn from_values(name: impl Into<String>, values: impl IntoIterator<Item = Option<f64>>) -> Self {
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

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn append(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn append_missing(&mut self) {
        self.values.push(Self::MISSING_VALUE);
    }

    pub fn get(&self, row: usize) -> Option<f64> {
        self.values.get(row).copied().filter(|v| !v.is_nan())
    }

    pub fn count_missing(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    pub fn to_vec(&self) -> Vec<Option<f64>> {
        (0..self.len()).map(|row| self.get(row)).collect()
    }

    pub fn print_formatter(&self) -> &NumberFormat {
        &self.print_formatter
    }

    pub fn set_print_formatter(&mut self, format: NumberFormat) {
        self.print_formatter = format;
    }

    pub fn get_string(&self, row: usize) -> String {
        self.get(row)
            .map(|v| format_number(v, &self.print_formatter))
            .unwrap_or_default()
    }
}
