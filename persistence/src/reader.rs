//! FILENAME: persistence/src/reader.rs
//! PURPOSE: Reader capabilities stored in the registry.
//! CONTEXT: Options travel as `&dyn ReadOptions` so readers with different
//! option types fit behind one trait object; each reader downcasts to the
//! options type it understands.

use std::any::{type_name, Any};
use std::fmt::Debug;

use engine::Table;

use crate::error::PersistenceError;
use crate::source::Source;

/// Configuration for one reader format.
pub trait ReadOptions: Any + Send + Sync + Debug {
    fn as_any(&self) -> &dyn Any;

    /// Fully qualified name of the concrete options type. This is the key
    /// options-based registry lookups use.
    fn type_key(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// Registry key for an options type.
pub fn options_type_key<O: ReadOptions>() -> &'static str {
    type_name::<O>()
}

/// Downcasts options handed to a reader, failing when they belong to
/// another format.
pub fn downcast_options<O: ReadOptions>(options: &dyn ReadOptions) -> Result<&O, PersistenceError> {
    options
        .as_any()
        .downcast_ref::<O>()
        .ok_or_else(|| PersistenceError::OptionsMismatch {
            expected: type_name::<O>(),
            found: options.type_key(),
        })
}

/// Parses a source into a single table.
pub trait TableReader: Send + Sync {
    fn read(&self, source: &Source) -> Result<Table, PersistenceError>;

    fn read_with(&self, source: &Source, options: &dyn ReadOptions) -> Result<Table, PersistenceError>;
}

/// Parses a source that holds several tables (one per sheet, stream, ...).
pub trait MultiTableReader: Send + Sync {
    fn read_all(&self, source: &Source) -> Result<Vec<Table>, PersistenceError>;

    fn read_all_with(
        &self,
        source: &Source,
        options: &dyn ReadOptions,
    ) -> Result<Vec<Table>, PersistenceError>;
}
