//! Roaring bitmap with a run-compaction pass before serialization.
//!
//! The container partition is the one [`BitmapCodec`](super::BitmapCodec)
//! produces. Every container is then offered a run encoding and keeps it when
//! that is strictly smaller, the same rule CRoaring's `runOptimize` applies.
//! Output follows the portable Roaring format, switching to the run-aware
//! cookie only when at least one run container survives.

use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use super::bitmap_codec::build_bitmap;
use super::{CodecError, CodecKind, PostingCodec};
use crate::common::types::ByteSize;
use crate::RowId;

const SERIAL_COOKIE_NO_RUNCONTAINER: u32 = 12346;
const SERIAL_COOKIE: u32 = 12347;
/// Below this many containers the run-aware format carries no offset table.
const NO_OFFSET_THRESHOLD: usize = 4;
/// Containers holding more values than this are stored as bitsets.
const ARRAY_MAX_CARDINALITY: usize = 4096;
const BITSET_WORDS: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Store {
    Array(Vec<u16>),
    Bitset(Box<[u64; BITSET_WORDS]>),
    /// `(start, length - 1)` pairs.
    Run(Vec<(u16, u16)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Container {
    key: u16,
    cardinality: usize,
    store: Store,
}

impl Container {
    /// Choose the smallest encoding for the sorted, distinct `values`.
    fn compact(key: u16, values: Vec<u16>) -> Self {
        let cardinality = values.len();
        let runs = collect_runs(&values);
        let run_size = run_payload_size(runs.len());
        let store = if cardinality <= ARRAY_MAX_CARDINALITY {
            if run_size < array_payload_size(cardinality) {
                Store::Run(runs)
            } else {
                Store::Array(values)
            }
        } else if run_size < bitset_payload_size() {
            Store::Run(runs)
        } else {
            let mut words = Box::new([0u64; BITSET_WORDS]);
            for value in values {
                words[value as usize / 64] |= 1u64 << (value % 64);
            }
            Store::Bitset(words)
        };
        Container { key, cardinality, store }
    }

    fn is_run(&self) -> bool {
        matches!(self.store, Store::Run(_))
    }

    fn payload_size(&self) -> usize {
        match &self.store {
            Store::Array(values) => array_payload_size(values.len()),
            Store::Bitset(_) => bitset_payload_size(),
            Store::Run(runs) => run_payload_size(runs.len()),
        }
    }

    fn write_payload<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match &self.store {
            Store::Array(values) => {
                for &value in values {
                    writer.write_u16::<LittleEndian>(value)?;
                }
            }
            Store::Bitset(words) => {
                for &word in words.iter() {
                    writer.write_u64::<LittleEndian>(word)?;
                }
            }
            Store::Run(runs) => {
                writer.write_u16::<LittleEndian>(runs.len() as u16)?;
                for &(start, length_minus_one) in runs {
                    writer.write_u16::<LittleEndian>(start)?;
                    writer.write_u16::<LittleEndian>(length_minus_one)?;
                }
            }
        }
        Ok(())
    }
}

fn array_payload_size(cardinality: usize) -> usize {
    2 * cardinality
}

fn bitset_payload_size() -> usize {
    8 * BITSET_WORDS
}

fn run_payload_size(runs: usize) -> usize {
    2 + 4 * runs
}

fn collect_runs(values: &[u16]) -> Vec<(u16, u16)> {
    let mut runs: Vec<(u16, u16)> = Vec::new();
    for &value in values {
        match runs.last_mut() {
            Some((start, length_minus_one)) if u32::from(*start) + u32::from(*length_minus_one) + 1 == u32::from(value) => {
                *length_minus_one += 1;
            }
            _ => runs.push((value, 0)),
        }
    }
    runs
}

/// Split the bitmap's values by their high 16 bits and compact each group.
fn run_optimized_containers(refs: &[RowId]) -> Vec<Container> {
    let bitmap = build_bitmap(refs);
    let mut containers = Vec::new();
    let mut current_key: Option<u16> = None;
    let mut current_values: Vec<u16> = Vec::new();

    for value in bitmap.iter() {
        let key = (value >> 16) as u16;
        if current_key != Some(key) {
            if let Some(prev_key) = current_key {
                containers.push(Container::compact(prev_key, std::mem::take(&mut current_values)));
            }
            current_key = Some(key);
        }
        current_values.push(value as u16);
    }
    if let Some(key) = current_key {
        containers.push(Container::compact(key, current_values));
    }
    containers
}

fn serialize_containers<W: Write>(containers: &[Container], writer: &mut W) -> io::Result<()> {
    let size = containers.len();
    let has_run = containers.iter().any(Container::is_run);

    let header_size = if has_run {
        let offsets = if size >= NO_OFFSET_THRESHOLD { 4 * size } else { 0 };
        4 + (size + 7) / 8 + 4 * size + offsets
    } else {
        4 + 4 + 4 * size + 4 * size
    };

    if has_run {
        writer.write_u32::<LittleEndian>(SERIAL_COOKIE | (((size - 1) as u32) << 16))?;
        let mut run_flags = vec![0u8; (size + 7) / 8];
        for (index, container) in containers.iter().enumerate() {
            if container.is_run() {
                run_flags[index / 8] |= 1 << (index % 8);
            }
        }
        writer.write_all(&run_flags)?;
    } else {
        writer.write_u32::<LittleEndian>(SERIAL_COOKIE_NO_RUNCONTAINER)?;
        writer.write_u32::<LittleEndian>(size as u32)?;
    }

    for container in containers {
        writer.write_u16::<LittleEndian>(container.key)?;
        writer.write_u16::<LittleEndian>((container.cardinality - 1) as u16)?;
    }

    if !has_run || size >= NO_OFFSET_THRESHOLD {
        let mut offset = header_size;
        for container in containers {
            writer.write_u32::<LittleEndian>(offset as u32)?;
            offset += container.payload_size();
        }
    }

    for container in containers {
        container.write_payload(writer)?;
    }
    Ok(())
}

/// Roaring bitmap after run compaction, in the portable serialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapRleCodec;

impl PostingCodec for BitmapRleCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::BitmapRle
    }

    fn encoded_size(&self, refs: &[RowId]) -> Result<ByteSize, CodecError> {
        let containers = run_optimized_containers(refs);
        let mut bytes = Vec::new();
        serialize_containers(&containers, &mut bytes).map_err(CodecError::BitmapSerialization)?;
        Ok(bytes.len() as ByteSize)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::core::codec::BitmapCodec;

    #[test]
    fn test_collect_runs() {
        assert_eq!(collect_runs(&[]), Vec::<(u16, u16)>::new());
        assert_eq!(collect_runs(&[1, 2, 3, 7, 9, 10]), vec![(1, 2), (7, 0), (9, 1)]);
        assert_eq!(collect_runs(&[65534, 65535]), vec![(65534, 1)]);
    }

    #[test]
    fn test_rle_shrinks_long_run() {
        let refs: Vec<RowId> = (0..1000).collect();
        assert_eq!(BitmapCodec.encoded_size(&refs).unwrap(), 8 + 8 + 2000);
        // cookie + run flags + (key, cardinality) + run count + one run
        assert_eq!(BitmapRleCodec.encoded_size(&refs).unwrap(), 4 + 1 + 4 + 2 + 4);
    }

    #[test]
    fn test_rle_full_container() {
        let refs: Vec<RowId> = (0..65536).collect();
        assert_eq!(BitmapCodec.encoded_size(&refs).unwrap(), 8 + 8 + 8192);
        assert_eq!(BitmapRleCodec.encoded_size(&refs).unwrap(), 15);
    }

    #[test]
    fn test_rle_matches_plain_without_runs() {
        let sparse: Vec<RowId> = vec![1, 5, 9];
        assert_eq!(BitmapRleCodec.encoded_size(&sparse).unwrap(), BitmapCodec.encoded_size(&sparse).unwrap());

        let evens: Vec<RowId> = (0..65536).step_by(2).collect();
        assert_eq!(BitmapRleCodec.encoded_size(&evens).unwrap(), BitmapCodec.encoded_size(&evens).unwrap());

        assert_eq!(BitmapRleCodec.encoded_size(&[]).unwrap(), 8);
    }

    #[test]
    fn test_rle_mixed_containers() {
        let mut refs: Vec<RowId> = (0..10).collect();
        refs.extend([65537, 65539, 65541]);
        let containers = run_optimized_containers(&refs);
        assert_eq!(containers.len(), 2);
        assert!(containers[0].is_run());
        assert!(!containers[1].is_run());
        // cookie + flags + 2 * (key, cardinality) + run container + array container
        assert_eq!(BitmapRleCodec.encoded_size(&refs).unwrap(), 4 + 1 + 8 + 6 + 6);
    }

    #[test]
    fn test_rle_offsets_with_many_containers() {
        let refs: Vec<RowId> = (0..5u32).flat_map(|key| (0..100).map(move |v| (key << 16) + v)).collect();
        let containers = run_optimized_containers(&refs);
        assert_eq!(containers.len(), 5);
        assert!(containers.iter().all(Container::is_run));

        let mut bytes = Vec::new();
        serialize_containers(&containers, &mut bytes).unwrap();
        let header = 4 + 1 + 5 * 4 + 5 * 4;
        assert_eq!(bytes.len(), header + 5 * 6);
        // First offset points right after the header.
        let first_offset = u32::from_le_bytes([bytes[25], bytes[26], bytes[27], bytes[28]]);
        assert_eq!(first_offset as usize, header);
    }

    #[test]
    fn test_rle_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut refs: Vec<RowId> = (0..20_000).map(|_| rng.gen_range(0..1_000_000)).collect();
        refs.sort_unstable();
        refs.dedup();
        let first = BitmapRleCodec.encoded_size(&refs).unwrap();
        assert_eq!(BitmapRleCodec.encoded_size(&refs).unwrap(), first);
        assert!(first <= BitmapCodec.encoded_size(&refs).unwrap());
    }
}
