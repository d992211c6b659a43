use thiserror::Error;

use crate::common::file_operations::FileOperationError;
use crate::core::CodecError;
use crate::source::SourceError;

/// The library's error enum
#[derive(Debug, Error)]
pub enum BenchError {
    /// Posting list source could not be opened or enumerated.
    #[error("Source error: {0}")]
    SourceError(#[from] SourceError),

    /// A codec failed while measuring a posting list.
    #[error("Codec evaluation failed for `{label_name}={label_value}`: {source}")]
    CodecEvaluation {
        label_name: String,
        label_value: String,
        #[source]
        source: CodecError,
    },

    /// Invalid benchmark configuration.
    #[error("Invalid config: '{0}'")]
    InvalidConfig(String),

    /// System error. (e.g.: We failed spawning the worker pool).
    #[error("System error.'{0}'")]
    SystemError(String),

    #[error("File operation failed: {0}")]
    FileOperationError(#[from] FileOperationError),
}

impl From<rayon::ThreadPoolBuildError> for BenchError {
    fn from(error: rayon::ThreadPoolBuildError) -> BenchError {
        BenchError::SystemError(error.to_string())
    }
}
