//! FILENAME: engine/src/column/mod.rs
//! PURPOSE: Typed columns and the `Column` enum tables are built from.
//! CONTEXT: Each column type reserves one sentinel value for missing rows,
//! so a column always has exactly one slot per table row.

pub mod date_time;
pub mod double;
pub mod number;
pub mod string;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use date_time::DateTimeColumn;
pub use double::DoubleColumn;
pub use number::NumberColumn;
pub use string::StringColumn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    Number,
    Double,
    DateTime,
    String,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Number => "NUMBER",
            ColumnType::Double => "DOUBLE",
            ColumnType::DateTime => "DATE_TIME",
            ColumnType::String => "STRING",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Number(NumberColumn),
    Double(DoubleColumn),
    DateTime(DateTimeColumn),
    String(StringColumn),
}

impl Column {
    pub fn name(&self) -> &str {
        match self {
            Column::Number(c) => c.name(),
            Column::Double(c) => c.name(),
            Column::DateTime(c) => c.name(),
            Column::String(c) => c.name(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Number(c) => c.len(),
            Column::Double(c) => c.len(),
            Column::DateTime(c) => c.len(),
            Column::String(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Number(_) => ColumnType::Number,
            Column::Double(_) => ColumnType::Double,
            Column::DateTime(_) => ColumnType::DateTime,
            Column::String(_) => ColumnType::String,
        }
    }

    pub fn count_missing(&self) -> usize {
        match self {
            Column::Number(c) => c.count_missing(),
            Column::Double(c) => c.count_missing(),
            Column::DateTime(c) => c.count_missing(),
            Column::String(c) => c.count_missing(),
        }
    }

    /// Display text for `row`; missing rows render as the empty string.
    pub fn get_string(&self, row: usize) -> String {
        match self {
            Column::Number(c) => c.get_string(row),
            Column::Double(c) => c.get_string(row),
            Column::DateTime(c) => c.get_string(row),
            Column::String(c) => c.get_string(row),
        }
    }

    pub fn as_number(&self) -> Option<&NumberColumn> {
        match self {
            Column::Number(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<&DoubleColumn> {
        match self {
            Column::Double(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<&DateTimeColumn> {
        match self {
            Column::DateTime(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&StringColumn> {
        match self {
            Column::String(c) => Some(c),
            _ => None,
        }
    }
}

impl From<NumberColumn> for Column {
    fn from(column: NumberColumn) -> Self {
        Column::Number(column)
    }
}

impl From<DoubleColumn> for Column {
    fn from(column: DoubleColumn) -> Self {
        Column::Double(column)
    }
}

impl From<DateTimeColumn> for Column {
    fn from(column: DateTimeColumn) -> Self {
        Column::DateTime(column)
    }
}

impl From<StringColumn> for Column {
    fn from(column: StringColumn) -> Self {
        Column::String(column)
    }
}
