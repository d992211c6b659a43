use std::collections::BTreeMap;

use itertools::Itertools;

use super::{PostingsSource, SourceError};
use crate::core::LabeledPostings;
use crate::RowId;

/// Posting lists held in memory, ordered by label name then value.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    postings: BTreeMap<(String, String), Vec<RowId>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the list of `name=value`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>, refs: Vec<RowId>) {
        self.postings.insert((name.into(), value.into()), refs);
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}

impl FromIterator<LabeledPostings> for MemorySource {
    fn from_iter<I: IntoIterator<Item = LabeledPostings>>(iter: I) -> Self {
        let mut source = Self::new();
        for labeled in iter {
            source.insert(labeled.label_name, labeled.label_value, labeled.refs.refs().to_vec());
        }
        source
    }
}

impl PostingsSource for MemorySource {
    fn label_names(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.postings.keys().map(|(name, _)| name.clone()).dedup().collect())
    }

    fn label_values(&self, name: &str) -> Result<Vec<String>, SourceError> {
        let values: Vec<String> = self.postings.keys().filter(|(n, _)| n == name).map(|(_, value)| value.clone()).collect();
        if values.is_empty() {
            return Err(SourceError::UnknownLabelName(name.to_string()));
        }
        Ok(values)
    }

    fn postings(&self, name: &str, value: &str) -> Result<Box<dyn Iterator<Item = RowId> + Send + '_>, SourceError> {
        let refs = self
            .postings
            .get(&(name.to_string(), value.to_string()))
            .ok_or_else(|| SourceError::UnknownPostings { name: name.to_string(), value: value.to_string() })?;
        Ok(Box::new(refs.iter().copied()))
    }
}
