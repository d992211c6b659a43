use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::common::file_operations::FileOperationError;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to open storage {path:?}: {source}")]
    OpenStorage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No block `{block_id}` with a postings index under {storage:?}")]
    BlockNotFound { storage: PathBuf, block_id: String },

    #[error("Failed to read postings index {path:?}: {source}")]
    ReadIndex {
        path: PathBuf,
        #[source]
        source: FileOperationError,
    },

    #[error("Unknown label name '{0}'")]
    UnknownLabelName(String),

    #[error("No postings for `{name}={value}`")]
    UnknownPostings { name: String, value: String },
}
