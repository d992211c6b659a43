use roaring::RoaringBitmap;

use super::{CodecError, CodecKind, PostingCodec};
use crate::common::types::ByteSize;
use crate::RowId;

/// Roaring bitmap in its portable serialization, without run containers.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapCodec;

/// Build a bitmap over the row ids; `refs` itself is left untouched.
pub(super) fn build_bitmap(refs: &[RowId]) -> RoaringBitmap {
    refs.iter().copied().collect()
}

impl PostingCodec for BitmapCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Bitmap
    }

    fn encoded_size(&self, refs: &[RowId]) -> Result<ByteSize, CodecError> {
        let bitmap = build_bitmap(refs);
        let mut bytes = Vec::with_capacity(bitmap.serialized_size());
        bitmap.serialize_into(&mut bytes).map_err(CodecError::BitmapSerialization)?;
        Ok(bytes.len() as ByteSize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_size_sparse() {
        // cookie + container count + (key, cardinality) + offset + 3 * u16
        assert_eq!(BitmapCodec.encoded_size(&[1, 5, 9]).unwrap(), 22);
    }

    #[test]
    fn test_bitmap_size_empty() {
        assert_eq!(BitmapCodec.encoded_size(&[]).unwrap(), 8);
    }

    #[test]
    fn test_bitmap_size_switches_to_bitset() {
        let dense: Vec<RowId> = (0..5000).collect();
        assert_eq!(BitmapCodec.encoded_size(&dense).unwrap(), 8 + 8 + 8192);
    }

    #[test]
    fn test_bitmap_size_is_deterministic() {
        let refs: Vec<RowId> = (0..10_000).map(|i| i * 7 + (i % 3)).collect();
        let first = BitmapCodec.encoded_size(&refs).unwrap();
        for _ in 0..3 {
            assert_eq!(BitmapCodec.encoded_size(&refs).unwrap(), first);
        }
    }

    #[test]
    fn test_bitmap_does_not_reorder_input() {
        let refs: Vec<RowId> = vec![9, 1, 5];
        let copy = refs.clone();
        BitmapCodec.encoded_size(&refs).unwrap();
        assert_eq!(refs, copy);
        assert_eq!(BitmapCodec.encoded_size(&refs).unwrap(), BitmapCodec.encoded_size(&[1, 5, 9]).unwrap());
    }
}
