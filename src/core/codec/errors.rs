use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to serialize bitmap: '{0}'")]
    BitmapSerialization(#[source] io::Error),

    #[error("Temporary file I/O failed at {path:?}: '{source}'")]
    TempFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to spawn external encoder {encoder:?}: '{source}'")]
    ExternalSpawn {
        encoder: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("External encoder {encoder:?} exited with {status}: {stderr}")]
    ExternalExit { encoder: PathBuf, status: ExitStatus, stderr: String },

    #[error("External encoder {encoder:?} left no readable output at {path:?}: '{source}'")]
    ExternalOutput {
        encoder: PathBuf,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
