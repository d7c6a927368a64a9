//! FILENAME: persistence/src/source.rs
//! PURPOSE: Describes where a table is read from.
//! CONTEXT: A source is a file path, an in-memory byte buffer or a string,
//! optionally tagged with a MIME type. The registry uses the MIME type and
//! the path's extension to pick a reader.

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek};
use std::path::{Path, PathBuf};

/// Anything a reader can both stream and seek in.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceData {
    File(PathBuf),
    Bytes(Vec<u8>),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    data: SourceData,
    mime_type: Option<String>,
    name: Option<String>,
}

impl Source {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::from_data(SourceData::File(path.into()))
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::from_data(SourceData::Bytes(bytes.into()))
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_data(SourceData::Text(text.into()))
    }

    fn from_data(data: SourceData) -> Self {
        Source {
            data,
            mime_type: None,
            name: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Overrides the table name readers derive from the source.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn data(&self) -> &SourceData {
        &self.data
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.data {
            SourceData::File(path) => Some(path),
            _ => None,
        }
    }

    /// File extension without the leading dot, exactly as spelled in the path.
    pub fn extension(&self) -> Option<&str> {
        self.path()?.extension()?.to_str()
    }

    /// Explicit name, else the file stem, else "table".
    pub fn table_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.path()
            .and_then(Path::file_stem)
            .and_then(|stem| stem.to_str())
            .unwrap_or("table")
            .to_string()
    }

    pub fn open(&self) -> io::Result<Box<dyn ReadSeek + '_>> {
        Ok(match &self.data {
            SourceData::File(path) => Box::new(BufReader::new(File::open(path)?)),
            SourceData::Bytes(bytes) => Box::new(Cursor::new(bytes.as_slice())),
            SourceData::Text(text) => Box::new(Cursor::new(text.as_bytes())),
        })
    }

    /// Short description for log lines and errors.
    pub fn describe(&self) -> String {
        match &self.data {
            SourceData::File(path) => path.display().to_string(),
            SourceData::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
            SourceData::Text(text) => format!("<{} chars of text>", text.chars().count()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_bare_and_case_preserving() {
        assert_eq!(Source::from_path("data/trips.csv").extension(), Some("csv"));
        assert_eq!(Source::from_path("data/TRIPS.CSV").extension(), Some("CSV"));
        assert_eq!(Source::from_path("archive.tar.gz").extension(), Some("gz"));
        assert_eq!(Source::from_path("README").extension(), None);
        assert_eq!(Source::from_text("a,b").extension(), None);
    }

    #[test]
    fn test_table_name() {
        assert_eq!(Source::from_path("/tmp/trips.csv").table_name(), "trips");
        assert_eq!(Source::from_text("a").table_name(), "table");
        assert_eq!(Source::from_path("x.csv").with_name("named").table_name(), "named");
    }

    #[test]
    fn test_open_in_memory() {
        let source = Source::from_bytes(b"hello".to_vec()).with_mime_type("text/plain");
        let mut text = String::new();
        source.open().unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "hello");
        assert_eq!(source.mime_type(), Some("text/plain"));
        assert_eq!(source.describe(), "<5 bytes>");
    }
}
