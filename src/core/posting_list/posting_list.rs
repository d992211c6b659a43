use serde::{Deserialize, Serialize};

use super::fingerprint::{fingerprint, Fingerprint};
use crate::RowId;

/// Row ids of one label pair, in the order the index returned them.
///
/// The index guarantees strictly increasing ids; nothing here enforces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostingList {
    refs: Vec<RowId>,
}

impl PostingList {
    pub fn new(refs: Vec<RowId>) -> Self {
        Self { refs }
    }

    pub fn refs(&self) -> &[RowId] {
        &self.refs
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn fingerprint(&self) -> Fingerprint {
        fingerprint(&self.refs)
    }

    /// `true` when every row id is greater than its predecessor.
    pub fn is_strictly_increasing(&self) -> bool {
        self.refs.windows(2).all(|w| w[0] < w[1])
    }
}

impl From<Vec<RowId>> for PostingList {
    fn from(refs: Vec<RowId>) -> Self {
        Self::new(refs)
    }
}

impl FromIterator<RowId> for PostingList {
    fn from_iter<I: IntoIterator<Item = RowId>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A posting list together with the label pair it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledPostings {
    #[serde(rename = "name")]
    pub label_name: String,

    #[serde(rename = "value")]
    pub label_value: String,

    pub refs: PostingList,
}

impl LabeledPostings {
    pub fn new(label_name: impl Into<String>, label_value: impl Into<String>, refs: impl Into<PostingList>) -> Self {
        Self { label_name: label_name.into(), label_value: label_value.into(), refs: refs.into() }
    }
}
