use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::{MemorySource, PostingsSource, SourceError};
use crate::common::constants::BLOCK_POSTINGS_FILE;
use crate::common::file_operations::{atomic_save_json, read_json, FileOperationError};
use crate::core::LabeledPostings;
use crate::RowId;

/// Postings index of one block inside a storage directory.
///
/// Layout: `<storage>/<block_id>/postings.json`, a JSON array of
/// `{"name", "value", "refs"}` objects. Block ids sort by creation time,
/// so the greatest id is the most recent block.
#[derive(Debug, Clone)]
pub struct BlockDirectorySource {
    block_dir: PathBuf,
    postings: MemorySource,
}

impl BlockDirectorySource {
    /// Open `block_id` under `storage`; an empty id opens the latest block.
    pub fn open(storage: impl AsRef<Path>, block_id: &str) -> Result<Self, SourceError> {
        let storage = storage.as_ref();
        let block_id = if block_id.is_empty() { Self::latest_block(storage)? } else { block_id.to_string() };

        let block_dir = storage.join(&block_id);
        let index_path = block_dir.join(BLOCK_POSTINGS_FILE);
        if !index_path.is_file() {
            return Err(SourceError::BlockNotFound { storage: storage.to_path_buf(), block_id });
        }

        let lists: Vec<LabeledPostings> = read_json(&index_path).map_err(|source| SourceError::ReadIndex { path: index_path.clone(), source })?;
        info!("[BlockDirectorySource] opened block {:?} with {} label pairs", block_dir, lists.len());
        Ok(Self { block_dir, postings: lists.into_iter().collect() })
    }

    /// Greatest block id under `storage` that holds a postings index.
    pub fn latest_block(storage: &Path) -> Result<String, SourceError> {
        let open_error = |source| SourceError::OpenStorage { path: storage.to_path_buf(), source };
        let mut latest: Option<String> = None;
        for entry in fs::read_dir(storage).map_err(open_error)? {
            let entry = entry.map_err(open_error)?;
            if !entry.path().join(BLOCK_POSTINGS_FILE).is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                debug!("[BlockDirectorySource] skipping non utf-8 entry {:?}", entry.path());
                continue;
            };
            if latest.as_ref().map_or(true, |current| name > *current) {
                latest = Some(name);
            }
        }
        latest.ok_or_else(|| SourceError::BlockNotFound { storage: storage.to_path_buf(), block_id: String::new() })
    }

    /// Write `lists` as the postings index of `<storage>/<block_id>`.
    pub fn write_block(storage: &Path, block_id: &str, lists: &[LabeledPostings]) -> Result<PathBuf, FileOperationError> {
        let block_dir = storage.join(block_id);
        fs::create_dir_all(&block_dir)?;
        atomic_save_json(&block_dir.join(BLOCK_POSTINGS_FILE), &lists)?;
        Ok(block_dir)
    }

    pub fn block_dir(&self) -> &Path {
        &self.block_dir
    }
}

impl PostingsSource for BlockDirectorySource {
    fn label_names(&self) -> Result<Vec<String>, SourceError> {
        self.postings.label_names()
    }

    fn label_values(&self, name: &str) -> Result<Vec<String>, SourceError> {
        self.postings.label_values(name)
    }

    fn postings(&self, name: &str, value: &str) -> Result<Box<dyn Iterator<Item = RowId> + Send + '_>, SourceError> {
        self.postings.postings(name, value)
    }
}
