use serde::{Deserialize, Serialize};

use crate::common::types::ByteSize;
use crate::core::{CodecKind, CodecResult};

/// Measurements of one distinct posting list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListStats {
    /// Number of row ids in the list.
    pub length: usize,

    /// One entry per codec, in codec set order.
    pub sizes: Vec<CodecResult>,

    pub label_name: String,
    pub label_value: String,
}

impl ListStats {
    pub fn new(length: usize, sizes: Vec<CodecResult>, label_name: impl Into<String>, label_value: impl Into<String>) -> Self {
        Self { length, sizes, label_name: label_name.into(), label_value: label_value.into() }
    }

    pub fn size_of(&self, codec: CodecKind) -> Option<ByteSize> {
        self.sizes.iter().find(|result| result.codec == codec).map(|result| result.size_bytes)
    }
}
