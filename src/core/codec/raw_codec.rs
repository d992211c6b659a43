use std::mem::size_of;

use super::{CodecError, CodecKind, PostingCodec};
use crate::common::types::ByteSize;
use crate::RowId;

/// Uncompressed baseline: a `u32` length prefix plus one `u32` per row id.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

impl RawCodec {
    pub fn size_for_len(len: usize) -> ByteSize {
        (size_of::<u32>() + len * size_of::<RowId>()) as ByteSize
    }
}

impl PostingCodec for RawCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Raw
    }

    fn encoded_size(&self, refs: &[RowId]) -> Result<ByteSize, CodecError> {
        Ok(Self::size_for_len(refs.len()))
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn test_raw_size() {
        assert_eq!(RawCodec.encoded_size(&[]).unwrap(), 4);
        assert_eq!(RawCodec.encoded_size(&[1, 2, 3]).unwrap(), 16);
        assert_eq!(RawCodec.encoded_size(&[10, 20, 30, 40]).unwrap(), 20);
    }

    #[test]
    fn test_raw_size_random_lengths() {
        let mut rng = rand::thread_rng();
        for _ in 0..32 {
            let len = rng.gen_range(1..5000usize);
            let refs: Vec<RowId> = (0..len as u32).collect();
            assert_eq!(RawCodec.encoded_size(&refs).unwrap(), 4 + 4 * len as u64);
        }
    }
}
