//! FILENAME: persistence/src/registry.rs
//! PURPOSE: Maps options types, file extensions and MIME types to readers.
//! CONTEXT: Each of the three key spaces holds, per key, at most one single
//! table reader and at most one multi table reader; the two never displace
//! each other. Registering again under the same key and kind replaces the
//! previous reader. Lookups are exact string matches and a miss is `None`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use engine::Table;
use parking_lot::RwLock;

use crate::csv_reader::{CsvReadOptions, CsvReader, CSV_EXTENSION, CSV_MIME_TYPE, TSV_EXTENSION, TSV_MIME_TYPE};
use crate::error::PersistenceError;
use crate::json_reader::{JsonReadOptions, JsonReader, JSON_EXTENSION, JSON_MIME_TYPE};
use crate::reader::{options_type_key, MultiTableReader, ReadOptions, TableReader};
use crate::source::Source;
use crate::xlsx_reader::{XlsxReadOptions, XlsxReader, XLSX_EXTENSION, XLSX_MIME_TYPE};

// ============================================================================
// KEYS AND ENTRIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Fully qualified type name of a `ReadOptions` implementation.
    OptionsType,
    /// Bare file extension, e.g. "csv".
    Extension,
    MimeType,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeyKind::OptionsType => write!(f, "options type"),
            KeyKind::Extension => write!(f, "extension"),
            KeyKind::MimeType => write!(f, "MIME type"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReaderKind {
    Single,
    Multi,
}

#[derive(Clone)]
pub enum RegisteredReader {
    Single(Arc<dyn TableReader>),
    Multi(Arc<dyn MultiTableReader>),
}

impl RegisteredReader {
    pub fn single(reader: impl TableReader + 'static) -> Self {
        RegisteredReader::Single(Arc::new(reader))
    }

    pub fn multi(reader: impl MultiTableReader + 'static) -> Self {
        RegisteredReader::Multi(Arc::new(reader))
    }

    pub fn kind(&self) -> ReaderKind {
        match self {
            RegisteredReader::Single(_) => ReaderKind::Single,
            RegisteredReader::Multi(_) => ReaderKind::Multi,
        }
    }

    pub fn as_single(&self) -> Option<&Arc<dyn TableReader>> {
        match self {
            RegisteredReader::Single(reader) => Some(reader),
            RegisteredReader::Multi(_) => None,
        }
    }

    pub fn as_multi(&self) -> Option<&Arc<dyn MultiTableReader>> {
        match self {
            RegisteredReader::Multi(reader) => Some(reader),
            RegisteredReader::Single(_) => None,
        }
    }
}

impl fmt::Debug for RegisteredReader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RegisteredReader::Single(_) => write!(f, "RegisteredReader::Single"),
            RegisteredReader::Multi(_) => write!(f, "RegisteredReader::Multi"),
        }
    }
}

#[derive(Clone, Default)]
struct KeySlot {
    single: Option<Arc<dyn TableReader>>,
    multi: Option<Arc<dyn MultiTableReader>>,
}

#[derive(Clone, Default)]
struct KeyStore {
    entries: HashMap<String, KeySlot>,
}

impl KeyStore {
    /// Returns true when a reader of the same kind was replaced.
    fn insert(&mut self, key: String, reader: RegisteredReader) -> bool {
        let slot = self.entries.entry(key).or_default();
        match reader {
            RegisteredReader::Single(reader) => slot.single.replace(reader).is_some(),
            RegisteredReader::Multi(reader) => slot.multi.replace(reader).is_some(),
        }
    }

    fn single(&self, key: &str) -> Option<Arc<dyn TableReader>> {
        self.entries.get(key)?.single.clone()
    }

    fn multi(&self, key: &str) -> Option<Arc<dyn MultiTableReader>> {
        self.entries.get(key)?.multi.clone()
    }

    fn keys(&self, kind: ReaderKind) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, slot)| match kind {
                ReaderKind::Single => slot.single.is_some(),
                ReaderKind::Multi => slot.multi.is_some(),
            })
            .map(|(key, _)| key.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Reader lookup tables. Build one at startup (see `with_builtin_readers`)
/// and pass it to whatever loads sources.
#[derive(Clone, Default)]
pub struct ReaderRegistry {
    options: KeyStore,
    extensions: KeyStore,
    mime_types: KeyStore,
}

impl ReaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the CSV, TSV, JSON and XLSX readers.
    pub fn with_builtin_readers() -> Self {
        let mut registry = Self::new();
        register_builtin_readers(&mut registry);
        registry
    }

    fn store(&self, kind: KeyKind) -> &KeyStore {
        match kind {
            KeyKind::OptionsType => &self.options,
            KeyKind::Extension => &self.extensions,
            KeyKind::MimeType => &self.mime_types,
        }
    }

    fn store_mut(&mut self, kind: KeyKind) -> &mut KeyStore {
        match kind {
            KeyKind::OptionsType => &mut self.options,
            KeyKind::Extension => &mut self.extensions,
            KeyKind::MimeType => &mut self.mime_types,
        }
    }

    /// Registers `reader` under `key`, replacing any reader of the same kind.
    pub fn register(&mut self, kind: KeyKind, key: impl Into<String>, reader: RegisteredReader) {
        let key = key.into();
        let reader_kind = reader.kind();
        if self.store_mut(kind).insert(key.clone(), reader) {
            log::debug!("replaced {:?} reader for {} '{}'", reader_kind, kind, key);
        } else {
            log::debug!("registered {:?} reader for {} '{}'", reader_kind, kind, key);
        }
    }

    pub fn lookup(&self, kind: KeyKind, key: &str, reader_kind: ReaderKind) -> Option<RegisteredReader> {
        let store = self.store(kind);
        match reader_kind {
            ReaderKind::Single => store.single(key).map(RegisteredReader::Single),
            ReaderKind::Multi => store.multi(key).map(RegisteredReader::Multi),
        }
    }

    /// Registered keys of one kind, sorted.
    pub fn keys(&self, kind: KeyKind, reader_kind: ReaderKind) -> Vec<&str> {
        self.store(kind).keys(reader_kind)
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    pub fn register_options<O: ReadOptions>(&mut self, reader: impl TableReader + 'static) {
        self.register(KeyKind::OptionsType, options_type_key::<O>(), RegisteredReader::single(reader));
    }

    pub fn register_multi_options<O: ReadOptions>(&mut self, reader: impl MultiTableReader + 'static) {
        self.register(KeyKind::OptionsType, options_type_key::<O>(), RegisteredReader::multi(reader));
    }

    /// `extension` is bare ("csv", not ".csv").
    pub fn register_extension(&mut self, extension: impl Into<String>, reader: impl TableReader + 'static) {
        self.register(KeyKind::Extension, extension, RegisteredReader::single(reader));
    }

    pub fn register_multi_extension(
        &mut self,
        extension: impl Into<String>,
        reader: impl MultiTableReader + 'static,
    ) {
        self.register(KeyKind::Extension, extension, RegisteredReader::multi(reader));
    }

    pub fn register_mime_type(&mut self, mime_type: impl Into<String>, reader: impl TableReader + 'static) {
        self.register(KeyKind::MimeType, mime_type, RegisteredReader::single(reader));
    }

    pub fn register_multi_mime_type(
        &mut self,
        mime_type: impl Into<String>,
        reader: impl MultiTableReader + 'static,
    ) {
        self.register(KeyKind::MimeType, mime_type, RegisteredReader::multi(reader));
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    /// Reader registered for the runtime type of `options`.
    pub fn reader_for_options(&self, options: &dyn ReadOptions) -> Option<Arc<dyn TableReader>> {
        self.options.single(options.type_key())
    }

    pub fn multi_reader_for_options(&self, options: &dyn ReadOptions) -> Option<Arc<dyn MultiTableReader>> {
        self.options.multi(options.type_key())
    }

    pub fn reader_for_extension(&self, extension: &str) -> Option<Arc<dyn TableReader>> {
        self.extensions.single(extension)
    }

    pub fn multi_reader_for_extension(&self, extension: &str) -> Option<Arc<dyn MultiTableReader>> {
        self.extensions.multi(extension)
    }

    pub fn reader_for_mime_type(&self, mime_type: &str) -> Option<Arc<dyn TableReader>> {
        self.mime_types.single(mime_type)
    }

    pub fn multi_reader_for_mime_type(&self, mime_type: &str) -> Option<Arc<dyn MultiTableReader>> {
        self.mime_types.multi(mime_type)
    }

    // ------------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------------

    /// Single reader for a source: by MIME type first, then by extension.
    pub fn resolve(&self, source: &Source) -> Result<Arc<dyn TableReader>, PersistenceError> {
        source
            .mime_type()
            .and_then(|mime| self.reader_for_mime_type(mime))
            .or_else(|| source.extension().and_then(|ext| self.reader_for_extension(ext)))
            .ok_or_else(|| PersistenceError::NoReader(source.describe()))
    }

    pub fn resolve_multi(&self, source: &Source) -> Result<Arc<dyn MultiTableReader>, PersistenceError> {
        source
            .mime_type()
            .and_then(|mime| self.multi_reader_for_mime_type(mime))
            .or_else(|| source.extension().and_then(|ext| self.multi_reader_for_extension(ext)))
            .ok_or_else(|| PersistenceError::NoReader(source.describe()))
    }

    pub fn read(&self, source: &Source) -> Result<Table, PersistenceError> {
        self.resolve(source)?.read(source)
    }

    /// Reads with the reader registered for the options' type.
    pub fn read_with(&self, source: &Source, options: &dyn ReadOptions) -> Result<Table, PersistenceError> {
        self.reader_for_options(options)
            .ok_or_else(|| PersistenceError::NoReader(options.type_key().to_string()))?
            .read_with(source, options)
    }

    pub fn read_all(&self, source: &Source) -> Result<Vec<Table>, PersistenceError> {
        self.resolve_multi(source)?.read_all(source)
    }

    pub fn read_all_with(
        &self,
        source: &Source,
        options: &dyn ReadOptions,
    ) -> Result<Vec<Table>, PersistenceError> {
        self.multi_reader_for_options(options)
            .ok_or_else(|| PersistenceError::NoReader(options.type_key().to_string()))?
            .read_all_with(source, options)
    }
}

impl fmt::Debug for ReaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ReaderRegistry")
            .field("options", &self.options.keys(ReaderKind::Single))
            .field("multi_options", &self.options.keys(ReaderKind::Multi))
            .field("extensions", &self.extensions.keys(ReaderKind::Single))
            .field("multi_extensions", &self.extensions.keys(ReaderKind::Multi))
            .field("mime_types", &self.mime_types.keys(ReaderKind::Single))
            .field("multi_mime_types", &self.mime_types.keys(ReaderKind::Multi))
            .finish()
    }
}

/// Registers the built-in readers:
///
/// | reader | extension | MIME type | options |
/// |--------|-----------|-----------|---------|
/// | CSV | `csv` | `text/csv` | `CsvReadOptions` |
/// | TSV | `tsv` | `text/tab-separated-values` | |
/// | JSON | `json` | `application/json` | `JsonReadOptions` |
/// | XLSX (single and multi) | `xlsx` | spreadsheetml | `XlsxReadOptions` |
pub fn register_builtin_readers(registry: &mut ReaderRegistry) {
    registry.register_extension(CSV_EXTENSION, CsvReader::new());
    registry.register_mime_type(CSV_MIME_TYPE, CsvReader::new());
    registry.register_options::<CsvReadOptions>(CsvReader::new());

    let tsv = CsvReader::with_defaults(CsvReadOptions::tsv());
    registry.register_extension(TSV_EXTENSION, tsv.clone());
    registry.register_mime_type(TSV_MIME_TYPE, tsv);

    registry.register_extension(JSON_EXTENSION, JsonReader::new());
    registry.register_mime_type(JSON_MIME_TYPE, JsonReader::new());
    registry.register_options::<JsonReadOptions>(JsonReader::new());

    registry.register_extension(XLSX_EXTENSION, XlsxReader::new());
    registry.register_mime_type(XLSX_MIME_TYPE, XlsxReader::new());
    registry.register_options::<XlsxReadOptions>(XlsxReader::new());
    registry.register_multi_extension(XLSX_EXTENSION, XlsxReader::new());
    registry.register_multi_mime_type(XLSX_MIME_TYPE, XlsxReader::new());
    registry.register_multi_options::<XlsxReadOptions>(XlsxReader::new());
}

// ============================================================================
// SHARED REGISTRY
// ============================================================================

/// A registry behind a read-write lock, for hosts that register readers
/// after startup while other threads read. Readers are cloned out of the
/// lock before they run, so a slow read never blocks registration.
#[derive(Clone, Default)]
pub struct SharedReaderRegistry {
    inner: Arc<RwLock<ReaderRegistry>>,
}

impl SharedReaderRegistry {
    pub fn new(registry: ReaderRegistry) -> Self {
        SharedReaderRegistry {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    pub fn with_builtin_readers() -> Self {
        Self::new(ReaderRegistry::with_builtin_readers())
    }

    pub fn with_read<R>(&self, f: impl FnOnce(&ReaderRegistry) -> R) -> R {
        f(&self.inner.read())
    }

    pub fn with_write<R>(&self, f: impl FnOnce(&mut ReaderRegistry) -> R) -> R {
        f(&mut self.inner.write())
    }

    pub fn register(&self, kind: KeyKind, key: impl Into<String>, reader: RegisteredReader) {
        self.inner.write().register(kind, key, reader);
    }

    pub fn lookup(&self, kind: KeyKind, key: &str, reader_kind: ReaderKind) -> Option<RegisteredReader> {
        self.inner.read().lookup(kind, key, reader_kind)
    }

    pub fn read(&self, source: &Source) -> Result<Table, PersistenceError> {
        let reader = self.inner.read().resolve(source)?;
        reader.read(source)
    }

    pub fn read_with(&self, source: &Source, options: &dyn ReadOptions) -> Result<Table, PersistenceError> {
        let reader = self
            .inner
            .read()
            .reader_for_options(options)
            .ok_or_else(|| PersistenceError::NoReader(options.type_key().to_string()))?;
        reader.read_with(source, options)
    }

    pub fn read_all(&self, source: &Source) -> Result<Vec<Table>, PersistenceError> {
        let reader = self.inner.read().resolve_multi(source)?;
        reader.read_all(source)
    }
}

impl fmt::Debug for SharedReaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner.read(), f)
    }
}
