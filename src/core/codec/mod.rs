mod bitmap_codec;
mod bitmap_rle_codec;
mod block_packed_codec;
mod codec_set;
mod errors;
mod external_codec;
mod raw_codec;

pub use bitmap_codec::BitmapCodec;
pub use bitmap_rle_codec::BitmapRleCodec;
pub use block_packed_codec::BlockPackedCodec;
pub use codec_set::CodecSet;
pub use errors::CodecError;
pub use external_codec::ExternalBlockPackedCodec;
pub use raw_codec::RawCodec;

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::common::types::ByteSize;
use crate::RowId;

/// Measures how many bytes a posting list occupies once encoded.
///
/// Implementations keep no state between calls, so one instance is shared by
/// every worker thread.
#[enum_dispatch]
pub trait PostingCodec {
    fn kind(&self) -> CodecKind;

    /// Encoded size of `refs` in bytes. `refs` is never reordered.
    fn encoded_size(&self, refs: &[RowId]) -> Result<ByteSize, CodecError>;
}

#[derive(Debug, Clone)]
#[enum_dispatch(PostingCodec)]
pub enum GenericCodec {
    RawCodec(RawCodec),
    BitmapCodec(BitmapCodec),
    BitmapRleCodec(BitmapRleCodec),
    BlockPackedCodec(BlockPackedCodec),
    ExternalBlockPackedCodec(ExternalBlockPackedCodec),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecKind {
    Raw,
    Bitmap,
    BitmapRle,
    BlockPacked,
    ExternalBlockPacked,
}

impl CodecKind {
    /// Heading used by the text report.
    pub fn title(&self) -> &'static str {
        match self {
            CodecKind::Raw => "RAW",
            CodecKind::Bitmap => "Roaring",
            CodecKind::BitmapRle => "Roaring RLE",
            CodecKind::BlockPacked => "S4BP128D4",
            CodecKind::ExternalBlockPacked => "S4BP128D4 (external)",
        }
    }
}

impl std::fmt::Display for CodecKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecKind::Raw => write!(f, "raw"),
            CodecKind::Bitmap => write!(f, "bitmap"),
            CodecKind::BitmapRle => write!(f, "bitmap_rle"),
            CodecKind::BlockPacked => write!(f, "block_packed"),
            CodecKind::ExternalBlockPacked => write!(f, "external_block_packed"),
        }
    }
}

/// Size of one posting list under one codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecResult {
    pub codec: CodecKind,
    pub size_bytes: ByteSize,
}
