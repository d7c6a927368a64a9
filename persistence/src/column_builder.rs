//! FILENAME: persistence/src/column_builder.rs
//! PURPOSE: Collects parsed cells for one column and picks its column type.
//! CONTEXT: Shared by the CSV, JSON and XLSX readers. A column becomes the
//! narrowest type every non-missing cell fits: integers, then doubles, then
//! date-times; anything mixed or textual falls back to strings.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use engine::column::date_time::DATE_TIME_DISPLAY_FORMAT;
use engine::{Column, ColumnType, DateTimeColumn, DoubleColumn, EngineResult, NumberColumn, StringColumn};

/// Patterns tried, in order, when a text cell might be a date-time.
/// Date-only patterns yield midnight.
pub const DEFAULT_DATE_TIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d",
];

pub fn default_date_time_formats() -> Vec<String> {
    DEFAULT_DATE_TIME_FORMATS.iter().map(|f| f.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Missing,
    Integer(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    Text(String),
}

impl CellValue {
    /// Classifies a text cell. Blank cells and `missing_tokens` are missing.
    pub fn infer(text: &str, missing_tokens: &[String], date_time_formats: &[String]) -> CellValue {
        let trimmed = text.trim();
        if trimmed.is_empty() || missing_tokens.iter().any(|token| token == trimmed) {
            return CellValue::Missing;
        }
        if let Ok(value) = trimmed.parse::<i64>() {
            return CellValue::integer(value);
        }
        // "nan" and "inf" parse as f64 but are words here
        if let Ok(value) = trimmed.parse::<f64>() {
            if value.is_finite() {
                return CellValue::Float(value);
            }
        }
        match parse_date_time(trimmed, date_time_formats) {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Text(text.to_string()),
        }
    }

    /// An integer cell. `i64::MIN` is the number column's missing marker, so
    /// that one value is kept as a float instead.
    pub fn integer(value: i64) -> CellValue {
        if value == NumberColumn::MISSING_VALUE {
            CellValue::Float(value as f64)
        } else {
            CellValue::Integer(value)
        }
    }

    fn to_text(&self) -> String {
        match self {
            CellValue::Missing => String::new(),
            CellValue::Integer(v) => v.to_string(),
            CellValue::Float(v) => v.to_string(),
            CellValue::DateTime(v) => v.format(DATE_TIME_DISPLAY_FORMAT).to_string(),
            CellValue::Text(v) => v.clone(),
        }
    }
}

pub fn parse_date_time(text: &str, formats: &[String]) -> Option<NaiveDateTime> {
    formats.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(text, format)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, format)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
    })
}

/// Makes header names unique. The first occurrence keeps its name; later
/// ones get the lowest `_2`, `_3`, ... suffix not used by any header.
pub fn unique_column_names(names: Vec<String>) -> Vec<String> {
    let original: HashSet<String> = names.iter().cloned().collect();
    let mut used: HashSet<String> = HashSet::with_capacity(names.len());
    names
        .into_iter()
        .map(|name| {
            if used.insert(name.clone()) {
                return name;
            }
            let mut suffix = 2;
            loop {
                let candidate = format!("{}_{}", name, suffix);
                if !original.contains(&candidate) && used.insert(candidate.clone()) {
                    return candidate;
                }
                suffix += 1;
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
struct Entry {
    value: CellValue,
    /// Source text, kept so a string column shows exactly what was read.
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    name: String,
    entries: Vec<Entry>,
}

impl ColumnBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        ColumnBuilder {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, value: CellValue) {
        self.entries.push(Entry { value, text: None });
    }

    pub fn push_text(&mut self, value: CellValue, text: impl Into<String>) {
        self.entries.push(Entry {
            value,
            text: Some(text.into()),
        });
    }

    /// Pads with missing cells up to `len` rows.
    pub fn pad_to(&mut self, len: usize) {
        while self.entries.len() < len {
            self.push(CellValue::Missing);
        }
    }

    pub fn inferred_type(&self) -> ColumnType {
        let (mut ints, mut floats, mut date_times, mut texts) = (false, false, false, false);
        for entry in &self.entries {
            match entry.value {
                CellValue::Missing => {}
                CellValue::Integer(_) => ints = true,
                CellValue::Float(_) => floats = true,
                CellValue::DateTime(_) => date_times = true,
                CellValue::Text(_) => texts = true,
            }
        }

        let numeric = ints || floats;
        if texts || (date_times && numeric) {
            ColumnType::String
        } else if date_times {
            ColumnType::DateTime
        } else if floats {
            ColumnType::Double
        } else if ints {
            ColumnType::Number
        } else {
            ColumnType::String
        }
    }

    pub fn build(self) -> EngineResult<Column> {
        let column = match self.inferred_type() {
            ColumnType::Number => {
                let values = self.entries.iter().map(|e| match e.value {
                    CellValue::Integer(v) => Some(v),
                    _ => None,
                });
                Column::Number(NumberColumn::from_values(self.name, values))
            }
            ColumnType::Double => {
                let values = self.entries.iter().map(|e| match e.value {
                    CellValue::Integer(v) => Some(v as f64),
                    CellValue::Float(v) => Some(v),
                    _ => None,
                });
                Column::Double(DoubleColumn::from_values(self.name, values))
            }
            ColumnType::DateTime => {
                let values = self.entries.iter().map(|e| match e.value {
                    CellValue::DateTime(v) => Some(v),
                    _ => None,
                });
                Column::DateTime(DateTimeColumn::from_values(self.name, values)?)
            }
            ColumnType::String => {
                let values = self.entries.into_iter().map(|e| match e.value {
                    CellValue::Missing => String::new(),
                    value => e.text.unwrap_or_else(|| value.to_text()),
                });
                Column::String(StringColumn::from_values(self.name, values))
            }
        };
        Ok(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(text: &str) -> CellValue {
        CellValue::infer(text, &["NA".to_string()], &default_date_time_formats())
    }

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_infer_cells() {
        assert_eq!(infer(""), CellValue::Missing);
        assert_eq!(infer("  "), CellValue::Missing);
        assert_eq!(infer("NA"), CellValue::Missing);
        assert_eq!(infer("42"), CellValue::Integer(42));
        assert_eq!(infer("-3.5"), CellValue::Float(-3.5));
        assert_eq!(infer("nan"), CellValue::Text("nan".to_string()));
        assert_eq!(infer("2024-03-01T08:15"), CellValue::DateTime(dt(2024, 3, 1, 8, 15)));
        assert_eq!(infer("2024-03-01 08:15:00.250"), CellValue::DateTime(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_milli_opt(8, 15, 0, 250).unwrap()
        ));
        assert_eq!(infer("2024-03-01"), CellValue::DateTime(dt(2024, 3, 1, 0, 0)));
        assert_eq!(infer("hello"), CellValue::Text("hello".to_string()));
    }

    #[test]
    fn test_smallest_integer_is_not_read_as_missing() {
        assert_eq!(infer("-9223372036854775808"), CellValue::Float(i64::MIN as f64));
        assert_eq!(infer("-9223372036854775807"), CellValue::Integer(i64::MIN + 1));

        let mut builder = ColumnBuilder::new("v");
        builder.push(infer("-9223372036854775808"));
        builder.push(infer("5"));
        let column = builder.build().unwrap();
        assert_eq!(column.column_type(), ColumnType::Double);
        assert_eq!(column.count_missing(), 0);
        assert_eq!(column.as_double().unwrap().to_vec(), vec![Some(i64::MIN as f64), Some(5.0)]);
    }

    #[test]
    fn test_infers_narrowest_type() {
        let mut ints = ColumnBuilder::new("a");
        ints.push(CellValue::Integer(1));
        ints.push(CellValue::Missing);
        assert_eq!(ints.inferred_type(), ColumnType::Number);

        let mut mixed = ColumnBuilder::new("b");
        mixed.push(CellValue::Integer(1));
        mixed.push(CellValue::Float(2.5));
        assert_eq!(mixed.inferred_type(), ColumnType::Double);

        let mut dates = ColumnBuilder::new("c");
        dates.push(CellValue::DateTime(dt(2020, 1, 1, 0, 0)));
        dates.push(CellValue::Missing);
        assert_eq!(dates.inferred_type(), ColumnType::DateTime);

        let mut clash = ColumnBuilder::new("d");
        clash.push(CellValue::DateTime(dt(2020, 1, 1, 0, 0)));
        clash.push(CellValue::Integer(3));
        assert_eq!(clash.inferred_type(), ColumnType::String);

        assert_eq!(ColumnBuilder::new("e").inferred_type(), ColumnType::String);
    }

    #[test]
    fn test_string_fallback_keeps_source_text() {
        let mut builder = ColumnBuilder::new("code");
        builder.push_text(CellValue::Integer(7), "007");
        builder.push_text(CellValue::Text("x1".to_string()), "x1");
        builder.push(CellValue::Missing);
        let column = builder.build().unwrap();
        let strings = column.as_string().unwrap();
        assert_eq!(strings.get(0), Some("007"));
        assert_eq!(strings.get(1), Some("x1"));
        assert_eq!(strings.get(2), None);
    }

    #[test]
    fn test_unique_column_names() {
        fn names(v: &[&str]) -> Vec<String> {
            v.iter().map(|s| s.to_string()).collect()
        }
        assert_eq!(unique_column_names(names(&["a", "b"])), names(&["a", "b"]));
        assert_eq!(unique_column_names(names(&["a", "a", "a"])), names(&["a", "a_2", "a_3"]));
        assert_eq!(unique_column_names(names(&["a", "a", "a_2"])), names(&["a", "a_3", "a_2"]));
    }

    #[test]
    fn test_pad_to() {
        let mut builder = ColumnBuilder::new("x");
        builder.push(CellValue::Integer(1));
        builder.pad_to(3);
        let column = builder.build().unwrap();
        assert_eq!(column.as_number().unwrap().to_vec(), vec![Some(1), None, None]);
    }
}
