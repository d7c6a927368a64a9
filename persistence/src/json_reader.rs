//! FILENAME: persistence/src/json_reader.rs
//! PURPOSE: Reads a JSON array of flat objects into a table.
//! CONTEXT: Each object is a row and each key a column. Columns appear in the
//! order their keys are first seen; rows lacking a key get a missing cell.

use std::any::Any;
use std::collections::HashMap;

use engine::Table;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::column_builder::{default_date_time_formats, parse_date_time, CellValue, ColumnBuilder};
use crate::error::PersistenceError;
use crate::reader::{downcast_options, ReadOptions, TableReader};
use crate::source::Source;

pub const JSON_EXTENSION: &str = "json";
pub const JSON_MIME_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonReadOptions {
    pub table_name: Option<String>,
    /// Patterns tried on string values before they are kept as text.
    pub date_time_formats: Vec<String>,
}

impl Default for JsonReadOptions {
    fn default() -> Self {
        JsonReadOptions {
            table_name: None,
            date_time_formats: default_date_time_formats(),
        }
    }
}

impl JsonReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    pub fn with_date_time_formats(mut self, formats: Vec<String>) -> Self {
        self.date_time_formats = formats;
        self
    }
}

impl ReadOptions for JsonReadOptions {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsonReader {
    defaults: JsonReadOptions,
}

impl JsonReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: JsonReadOptions) -> Self {
        JsonReader { defaults }
    }
}

impl TableReader for JsonReader {
    fn read(&self, source: &Source) -> Result<Table, PersistenceError> {
        read_json(source, &self.defaults)
    }

    fn read_with(&self, source: &Source, options: &dyn ReadOptions) -> Result<Table, PersistenceError> {
        read_json(source, downcast_options::<JsonReadOptions>(options)?)
    }
}

pub fn read_json(source: &Source, options: &JsonReadOptions) -> Result<Table, PersistenceError> {
    let document: Value = serde_json::from_reader(source.open()?)?;
    let rows = match document {
        Value::Array(rows) => rows,
        other => {
            return Err(PersistenceError::InvalidFormat(format!(
                "expected a JSON array of objects, found {}",
                kind(&other)
            )))
        }
    };

    let mut builders: Vec<ColumnBuilder> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (row_index, row) in rows.iter().enumerate() {
        let object = row.as_object().ok_or_else(|| {
            PersistenceError::InvalidFormat(format!(
                "row {} is {}, expected an object",
                row_index,
                kind(row)
            ))
        })?;

        for (key, value) in object {
            let position = *positions.entry(key.clone()).or_insert_with(|| {
                let mut builder = ColumnBuilder::new(key.clone());
                builder.pad_to(row_index);
                builders.push(builder);
                builders.len() - 1
            });
            builders[position].push(json_cell(value, &options.date_time_formats));
        }
        for builder in builders.iter_mut() {
            builder.pad_to(row_index + 1);
        }
    }

    let name = options
        .table_name
        .clone()
        .unwrap_or_else(|| source.table_name());
    let mut table = Table::new(name);
    for builder in builders {
        table.add_column(builder.build()?)?;
    }

    log::debug!(
        "read json '{}' from {}: {} rows, {} columns",
        table.name(),
        source.describe(),
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

fn json_cell(value: &Value, formats: &[String]) -> CellValue {
    match value {
        Value::Null => CellValue::Missing,
        Value::Number(n) => match n.as_i64() {
            Some(i) => CellValue::integer(i),
            None => n.as_f64().map_or(CellValue::Missing, CellValue::Float),
        },
        Value::String(s) if s.trim().is_empty() => CellValue::Missing,
        Value::String(s) => match parse_date_time(s.trim(), formats) {
            Some(dt) => CellValue::DateTime(dt),
            None => CellValue::Text(s.clone()),
        },
        Value::Bool(b) => CellValue::Text(b.to_string()),
        nested => CellValue::Text(nested.to_string()),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use engine::ColumnType;

    #[test]
    fn test_reads_rows_in_key_order() {
        let source = Source::from_text(
            r#"[
                {"id": 1, "at": "2024-02-01T10:00:00", "score": 1.5},
                {"id": 2, "tag": "x", "score": null},
                {"at": "2024-02-03T12:30:00", "id": 3}
            ]"#,
        )
        .with_name("events");
        let table = JsonReader::new().read(&source).unwrap();

        assert_eq!(table.name(), "events");
        assert_eq!(table.column_names(), vec!["id", "at", "score", "tag"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column("id").unwrap().column_type(), ColumnType::Number);
        assert_eq!(table.column("score").unwrap().column_type(), ColumnType::Double);

        let at = table.date_time_column("at").unwrap();
        assert!(at.is_missing(1));
        assert_eq!(
            at.get(2),
            Some(NaiveDate::from_ymd_opt(2024, 2, 3).unwrap().and_hms_opt(12, 30, 0).unwrap())
        );

        let tag = table.column("tag").unwrap();
        assert_eq!(tag.get_string(0), "");
        assert_eq!(tag.get_string(1), "x");
        assert_eq!(tag.count_missing(), 2);
    }

    #[test]
    fn test_booleans_and_nested_values_are_text() {
        let table = JsonReader::new()
            .read(&Source::from_text(r#"[{"flag": true, "meta": {"a": 1}}]"#))
            .unwrap();
        assert_eq!(table.column("flag").unwrap().get_string(0), "true");
        assert_eq!(table.column("meta").unwrap().get_string(0), r#"{"a":1}"#);
    }

    #[test]
    fn test_smallest_integer_stays_a_value() {
        let table = JsonReader::new()
            .read(&Source::from_text(r#"[{"v": -9223372036854775808}, {"v": 5}]"#))
            .unwrap();
        let v = table.column("v").unwrap();
        assert_eq!(v.column_type(), ColumnType::Double);
        assert_eq!(v.count_missing(), 0);
    }

    #[test]
    fn test_empty_array_is_empty_table() {
        let options = JsonReadOptions::new().with_table_name("nothing");
        let table = JsonReader::new()
            .read_with(&Source::from_text("[]"), &options)
            .unwrap();
        assert_eq!(table.name(), "nothing");
        assert!(table.is_empty());
    }

    #[test]
    fn test_rejects_non_tabular_documents() {
        let reader = JsonReader::new();
        let err = reader.read(&Source::from_text(r#"{"id": 1}"#)).unwrap_err();
        assert!(matches!(err, PersistenceError::InvalidFormat(_)));

        let err = reader.read(&Source::from_text("[1, 2]")).unwrap_err();
        assert!(matches!(err, PersistenceError::InvalidFormat(msg) if msg.contains("row 0")));

        let err = reader.read(&Source::from_text("[{")).unwrap_err();
        assert!(matches!(err, PersistenceError::Json(_)));
    }
}
