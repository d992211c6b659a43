use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use atomicwrites::{AtomicFile, OverwriteBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Write `object` as pretty JSON, replacing `path` atomically.
pub fn atomic_save_json<T: Serialize>(path: &Path, object: &T) -> Result<(), FileOperationError> {
    let af = AtomicFile::new(path, OverwriteBehavior::AllowOverwrite);
    af.write(|f| {
        let mut writer = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut writer, object)?;
        writer.write_all(b"\n").map_err(serde_json::Error::io)?;
        writer.flush().map_err(serde_json::Error::io)
    })?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, FileOperationError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let data = serde_json::from_reader(reader)?;
    Ok(data)
}

#[derive(Debug, Error)]
pub enum FileOperationError {
    #[error(transparent)]
    IoError(#[from] io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),

    #[error(transparent)]
    AtomicWriteSerdeJsonError(#[from] atomicwrites::Error<serde_json::Error>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct TestData {
        name: String,
        lists: u32,
    }

    #[test]
    fn test_atomic_save_and_read_json() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("test.json");

        let data = TestData { name: "job".to_string(), lists: 30 };

        atomic_save_json(&file_path, &data).unwrap();
        assert!(file_path.exists());

        let loaded_data: TestData = read_json(&file_path).unwrap();
        assert_eq!(data, loaded_data);

        // Overwrite keeps the latest content.
        let data = TestData { name: "job".to_string(), lists: 31 };
        atomic_save_json(&file_path, &data).unwrap();
        let loaded_data: TestData = read_json(&file_path).unwrap();
        assert_eq!(loaded_data.lists, 31);
    }

    #[test]
    fn test_read_json_missing_file() {
        let temp_dir = tempdir().unwrap();
        let result: Result<TestData, _> = read_json(&temp_dir.path().join("absent.json"));
        assert!(matches!(result, Err(FileOperationError::IoError(_))));
    }
}
