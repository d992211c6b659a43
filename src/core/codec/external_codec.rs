use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, error};

use super::{CodecError, CodecKind, PostingCodec};
use crate::common::types::ByteSize;
use crate::RowId;

const INPUT_FILE: &str = "input.txt";
const OUTPUT_FILE: &str = "output.bin";

/// Delegates block packing to an external encoder process.
///
/// The encoder is called as `<encoder> <input> <output>`. Input holds one
/// decimal row id per line; the byte length of the output is the measured
/// size. Every call works in its own temporary directory, so concurrent
/// workers never share file names.
#[derive(Debug, Clone)]
pub struct ExternalBlockPackedCodec {
    encoder: PathBuf,
    temp_root: PathBuf,
}

impl ExternalBlockPackedCodec {
    pub fn new(encoder: impl Into<PathBuf>, temp_root: Option<PathBuf>) -> Self {
        Self { encoder: encoder.into(), temp_root: temp_root.unwrap_or_else(std::env::temp_dir) }
    }

    fn write_input(path: &Path, refs: &[RowId]) -> Result<(), CodecError> {
        let temp_file_error = |source| CodecError::TempFile { path: path.to_path_buf(), source };
        let file = File::create(path).map_err(temp_file_error)?;
        let mut writer = BufWriter::new(file);
        for row_id in refs {
            writeln!(writer, "{}", row_id).map_err(temp_file_error)?;
        }
        writer.flush().map_err(temp_file_error)
    }
}

impl PostingCodec for ExternalBlockPackedCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::ExternalBlockPacked
    }

    fn encoded_size(&self, refs: &[RowId]) -> Result<ByteSize, CodecError> {
        let work_dir = tempfile::Builder::new()
            .prefix("posting-bench-")
            .tempdir_in(&self.temp_root)
            .map_err(|source| CodecError::TempFile { path: self.temp_root.clone(), source })?;
        let input_path = work_dir.path().join(INPUT_FILE);
        let output_path = work_dir.path().join(OUTPUT_FILE);

        Self::write_input(&input_path, refs)?;

        let output = Command::new(&self.encoder)
            .arg(&input_path)
            .arg(&output_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| CodecError::ExternalSpawn { encoder: self.encoder.clone(), source })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("[ExternalBlockPackedCodec] encoder {:?} failed with {}: {}", self.encoder, output.status, stderr);
            return Err(CodecError::ExternalExit { encoder: self.encoder.clone(), status: output.status, stderr });
        }

        let encoded = fs::read(&output_path).map_err(|source| CodecError::ExternalOutput {
            encoder: self.encoder.clone(),
            path: output_path.clone(),
            source,
        })?;
        debug!("[ExternalBlockPackedCodec] {} row ids encoded into {} bytes", refs.len(), encoded.len());
        Ok(encoded.len() as ByteSize)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_external_size_is_output_length() {
        let dir = tempfile::tempdir().unwrap();
        // Echo the decimal input back: "1\n2\n3\n" is 6 bytes.
        let codec = ExternalBlockPackedCodec::new("cp", Some(dir.path().to_path_buf()));
        assert_eq!(codec.encoded_size(&[1, 2, 3]).unwrap(), 6);
        assert_eq!(codec.encoded_size(&[]).unwrap(), 0);
        assert_eq!(codec.encoded_size(&[10, 200]).unwrap(), 7);
    }

    #[test]
    fn test_external_work_dirs_are_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let codec = ExternalBlockPackedCodec::new("cp", Some(dir.path().to_path_buf()));
        codec.encoded_size(&[5, 6]).unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_external_non_zero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let codec = ExternalBlockPackedCodec::new("false", Some(dir.path().to_path_buf()));
        match codec.encoded_size(&[1, 2]) {
            Err(CodecError::ExternalExit { status, .. }) => assert!(!status.success()),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_external_missing_output() {
        let dir = tempfile::tempdir().unwrap();
        let codec = ExternalBlockPackedCodec::new("true", Some(dir.path().to_path_buf()));
        assert!(matches!(codec.encoded_size(&[1]), Err(CodecError::ExternalOutput { .. })));
    }

    #[test]
    fn test_external_missing_encoder() {
        let dir = tempfile::tempdir().unwrap();
        let codec = ExternalBlockPackedCodec::new(dir.path().join("absent-encoder"), Some(dir.path().to_path_buf()));
        assert!(matches!(codec.encoded_size(&[1]), Err(CodecError::ExternalSpawn { .. })));
    }
}
