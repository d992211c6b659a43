use bitpacking::{BitPacker, BitPacker4x};

use super::{CodecError, CodecKind, PostingCodec};
use crate::common::types::ByteSize;
use crate::RowId;

type BitPackerImpl = BitPacker4x;

/// Deltas are taken against the value this many positions back (`D4`).
const DELTA_STRIDE: usize = 4;

/// In-process take on the S4-BP128-D4 layout.
///
/// - `u32` element count
/// - per full block of 128: one bit-width byte, then the block's `D4` deltas
///   bit-packed at that width
/// - trailing partial block: `D1` deltas as variable-byte integers
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockPackedCodec;

impl BlockPackedCodec {
    pub fn encode(refs: &[RowId]) -> Vec<u8> {
        let bitpacker = BitPackerImpl::new();
        let mut output: Vec<u8> = Vec::with_capacity(4 + refs.len());
        output.extend_from_slice(&(refs.len() as u32).to_le_bytes());

        // 前一个分块的最后 4 个 row_id, 用于计算 D4 差分
        let mut previous = [0 as RowId; DELTA_STRIDE];
        let mut deltas = [0 as RowId; BitPackerImpl::BLOCK_LEN];
        let mut compressed = [0u8; 4 * BitPackerImpl::BLOCK_LEN];

        let mut blocks = refs.chunks_exact(BitPackerImpl::BLOCK_LEN);
        for block in &mut blocks {
            for (i, &row_id) in block.iter().enumerate() {
                let base = if i < DELTA_STRIDE { previous[i] } else { block[i - DELTA_STRIDE] };
                deltas[i] = row_id.wrapping_sub(base);
            }
            let num_bits = bitpacker.num_bits(&deltas);
            let written = bitpacker.compress(&deltas, &mut compressed, num_bits);
            output.push(num_bits);
            output.extend_from_slice(&compressed[..written]);
            previous.copy_from_slice(&block[BitPackerImpl::BLOCK_LEN - DELTA_STRIDE..]);
        }

        let mut last = previous[DELTA_STRIDE - 1];
        for &row_id in blocks.remainder() {
            write_vint(row_id.wrapping_sub(last), &mut output);
            last = row_id;
        }
        output
    }
}

/// 7 bits per byte, high bit set on the last byte.
fn write_vint(mut value: u32, output: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            output.push(byte | 0x80);
            return;
        }
        output.push(byte);
    }
}

impl PostingCodec for BlockPackedCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::BlockPacked
    }

    fn encoded_size(&self, refs: &[RowId]) -> Result<ByteSize, CodecError> {
        Ok(Self::encode(refs).len() as ByteSize)
    }
}
