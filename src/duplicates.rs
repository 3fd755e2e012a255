use std::collections::{BTreeSet, HashMap};

use crate::record::{FieldKey, Record};

/// Positions of records whose trimmed `input` is non-empty and shared with
/// at least one other record. Rebuilt from scratch, never patched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DuplicateIndex {
    indices: BTreeSet<usize>,
}

impl DuplicateIndex {
    pub fn recompute(records: &[Record]) -> Self {
        let mut by_input: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            let value = record.field(FieldKey::Input);
            let normalized = value.trim();
            if !normalized.is_empty() {
                by_input.entry(normalized.to_string()).or_default().push(i);
            }
        }

        let indices = by_input
            .into_values()
            .filter(|positions| positions.len() > 1)
            .flatten()
            .collect();
        DuplicateIndex { indices }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }
}
