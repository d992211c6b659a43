use std::path::PathBuf;

use super::{
    BitmapCodec, BitmapRleCodec, BlockPackedCodec, CodecError, CodecKind, CodecResult, ExternalBlockPackedCodec, GenericCodec, PostingCodec, RawCodec,
};
use crate::RowId;

/// Ordered collection of the codecs measured for every posting list.
///
/// Result vectors produced by [`CodecSet::evaluate`] follow the same order
/// as [`CodecSet::kinds`].
#[derive(Debug, Clone)]
pub struct CodecSet {
    codecs: Vec<GenericCodec>,
}

impl Default for CodecSet {
    /// Raw, Bitmap, Bitmap-RLE and in-process Block-Packed.
    fn default() -> Self {
        Self::new(vec![RawCodec.into(), BitmapCodec.into(), BitmapRleCodec.into(), BlockPackedCodec.into()])
    }
}

impl CodecSet {
    pub fn new(codecs: Vec<GenericCodec>) -> Self {
        Self { codecs }
    }

    /// Default set, plus the external encoder when one is configured.
    pub fn with_external_encoder(encoder: Option<PathBuf>, temp_root: Option<PathBuf>) -> Self {
        let mut codec_set = Self::default();
        if let Some(encoder) = encoder {
            codec_set.push(ExternalBlockPackedCodec::new(encoder, temp_root).into());
        }
        codec_set
    }

    pub fn push(&mut self, codec: GenericCodec) {
        self.codecs.push(codec);
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    pub fn kinds(&self) -> Vec<CodecKind> {
        self.codecs.iter().map(|codec| codec.kind()).collect()
    }

    pub fn position(&self, kind: CodecKind) -> Option<usize> {
        self.codecs.iter().position(|codec| codec.kind() == kind)
    }

    /// Run every codec against `refs`, stopping at the first failure.
    pub fn evaluate(&self, refs: &[RowId]) -> Result<Vec<CodecResult>, CodecError> {
        self.codecs
            .iter()
            .map(|codec| Ok(CodecResult { codec: codec.kind(), size_bytes: codec.encoded_size(refs)? }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_codec_set() {
        let codec_set = CodecSet::default();
        assert_eq!(codec_set.kinds(), vec![CodecKind::Raw, CodecKind::Bitmap, CodecKind::BitmapRle, CodecKind::BlockPacked]);
        assert_eq!(codec_set.position(CodecKind::BitmapRle), Some(2));
        assert_eq!(codec_set.position(CodecKind::ExternalBlockPacked), None);
    }

    #[test]
    fn test_external_encoder_is_appended() {
        let codec_set = CodecSet::with_external_encoder(Some(PathBuf::from("/usr/bin/encoder")), None);
        assert_eq!(codec_set.len(), 5);
        assert_eq!(codec_set.kinds().last(), Some(&CodecKind::ExternalBlockPacked));
        assert_eq!(CodecSet::with_external_encoder(None, None).len(), 4);
    }

    #[test]
    fn test_evaluate_keeps_codec_order() {
        let results = CodecSet::default().evaluate(&[1, 2, 3]).unwrap();
        assert_eq!(results.iter().map(|r| r.codec).collect::<Vec<_>>(), CodecSet::default().kinds());
        assert_eq!(results[0], CodecResult { codec: CodecKind::Raw, size_bytes: 16 });
    }

    #[cfg(unix)]
    #[test]
    fn test_evaluate_propagates_codec_failure() {
        let codec_set = CodecSet::with_external_encoder(Some(PathBuf::from("false")), None);
        assert!(matches!(codec_set.evaluate(&[1, 2, 3]), Err(CodecError::ExternalExit { .. })));
    }
}
