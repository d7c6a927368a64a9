//! FILENAME: engine/src/table.rs
//! PURPOSE: A named, ordered set of equally long columns.
//! CONTEXT: Readers produce tables; transforms read columns out of them and
//! the results can be added back as new columns.

use crate::column::{Column, DateTimeColumn};
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Appends a column. Its length must match the existing row count and its
    /// name must be unused.
    pub fn add_column(&mut self, column: impl Into<Column>) -> EngineResult<()> {
        let column = column.into();

        if self.column(column.name()).is_some() {
            return Err(EngineError::DuplicateColumn(column.name().to_string()));
        }
        if let Some(first) = self.columns.first() {
            if first.len() != column.len() {
                return Err(EngineError::RowCountMismatch {
                    table: self.name.clone(),
                    column: column.name().to_string(),
                    expected: first.len(),
                    actual: column.len(),
                });
            }
        }

        self.columns.push(column);
        Ok(())
    }

    /// Builder-style `add_column`.
    pub fn with_column(mut self, column: impl Into<Column>) -> EngineResult<Self> {
        self.add_column(column)?;
        Ok(self)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn require_column(&self, name: &str) -> EngineResult<&Column> {
        self.column(name)
            .ok_or_else(|| EngineError::ColumnNotFound(name.to_string()))
    }

    /// The named column, if it exists and holds date-times.
    pub fn date_time_column(&self, name: &str) -> EngineResult<&DateTimeColumn> {
        self.require_column(name)?
            .as_date_time()
            .ok_or_else(|| EngineError::ColumnNotFound(name.to_string()))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{NumberColumn, StringColumn};

    #[test]
    fn test_add_and_find_columns() {
        let table = Table::new("people")
            .with_column(StringColumn::from_values("name", ["ada", "grace"]))
            .unwrap()
            .with_column(NumberColumn::from_values("age", [Some(36), None]))
            .unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.column_names(), vec!["name", "age"]);
        assert!(table.column("age").is_some());
        assert!(table.column("Age").is_none());
        assert_eq!(table.column_at(0).map(Column::name), Some("name"));
    }

    #[test]
    fn test_rejects_mismatched_row_count() {
        let mut table = Table::new("t");
        table.add_column(NumberColumn::from_values("a", [Some(1), Some(2)])).unwrap();
        let err = table
            .add_column(NumberColumn::from_values("b", [Some(1)]))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::RowCountMismatch {
                table: "t".to_string(),
                column: "b".to_string(),
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let mut table = Table::new("t");
        table.add_column(NumberColumn::new("a")).unwrap();
        assert_eq!(
            table.add_column(NumberColumn::new("a")),
            Err(EngineError::DuplicateColumn("a".to_string()))
        );
    }

    #[test]
    fn test_typed_lookup() {
        let table = Table::new("t")
            .with_column(NumberColumn::from_values("n", [Some(1)]))
            .unwrap();
        assert_eq!(
            table.date_time_column("n"),
            Err(EngineError::ColumnNotFound("n".to_string()))
        );
        assert_eq!(
            table.require_column("missing").unwrap_err(),
            EngineError::ColumnNotFound("missing".to_string())
        );
    }
}
