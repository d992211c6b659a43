/// Series/document reference stored in a posting list.
pub type RowId = u32;

/// Encoded size of one posting list, in bytes.
pub type ByteSize = u64;
