//! Where posting lists come from.

mod block_directory_source;
mod errors;
mod memory_source;

pub use block_directory_source::BlockDirectorySource;
pub use errors::SourceError;
pub use memory_source::MemorySource;

use crate::RowId;

/// Read access to an inverted index: label names, their values and the
/// posting list of each `(name, value)` pair.
pub trait PostingsSource {
    fn label_names(&self) -> Result<Vec<String>, SourceError>;

    fn label_values(&self, name: &str) -> Result<Vec<String>, SourceError>;

    /// Row ids of one label pair, in index order.
    fn postings(&self, name: &str, value: &str) -> Result<Box<dyn Iterator<Item = RowId> + Send + '_>, SourceError>;
}
