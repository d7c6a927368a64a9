//! FILENAME: engine/src/column/string.rs
//! PURPOSE: Text column. The empty string marks a missing row.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringColumn {
    name: String,
    values: Vec<String>,
}

impl StringColumn {
    pub const MISSING_VALUE: &'static str = "";

    pub fn new(name: impl Into<String>) -> Self {
        StringColumn {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn from_values<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        StringColumn {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
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

    pub fn append(&mut self, value: impl Into<String>) {
        self.values.push(value.into());
    }

    pub fn append_missing(&mut self) {
        self.values.push(Self::MISSING_VALUE.to_string());
    }

    pub fn get(&self, row: usize) -> Option<&str> {
        self.values
            .get(row)
            .map(String::as_str)
            .filter(|v| *v != Self::MISSING_VALUE)
    }

    pub fn count_missing(&self) -> usize {
        self.values.iter().filter(|v| v.is_empty()).count()
    }

    pub fn get_string(&self, row: usize) -> String {
        self.get(row).unwrap_or_default().to_string()
    }
}
