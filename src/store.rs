use crate::error::{EditorError, Result};
use crate::record::Record;

/// Ordered records plus the selected position. Identity is positional.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordStore {
    records: Vec<Record>,
    selection: Option<usize>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole document and drops the selection.
    pub fn load(&mut self, records: Vec<Record>) {
        self.records = records;
        self.selection = None;
    }

    /// Installs a document together with its selection (undo/redo restore).
    /// A selection that does not point at a record is dropped.
    pub fn restore(&mut self, records: Vec<Record>, selection: Option<usize>) {
        self.selection = selection.filter(|i| *i < records.len());
        self.records = records;
    }

    pub fn insert(&mut self, at: usize, record: Record) -> Result<()> {
        if at > self.records.len() {
            return Err(EditorError::IndexOutOfRange {
                index: at,
                len: self.records.len(),
            });
        }
        self.records.insert(at, record);
        self.selection = Some(at);
        Ok(())
    }

    /// Removes `index` and re-points the selection: the record that slid
    /// into the slot, else the new last record, else nothing.
    pub fn remove_at(&mut self, index: usize) -> Result<Record> {
        self.check(index)?;
        let removed = self.records.remove(index);
        self.selection = if self.records.is_empty() {
            None
        } else if index < self.records.len() {
            Some(index)
        } else {
            Some(self.records.len() - 1)
        };
        Ok(removed)
    }

    pub fn get(&self, index: usize) -> Result<&Record> {
        self.check(index)?;
        Ok(&self.records[index])
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Record> {
        self.check(index)?;
        Ok(&mut self.records[index])
    }

    pub fn set(&mut self, index: usize, record: Record) -> Result<()> {
        *self.get_mut(index)? = record;
        Ok(())
    }

    pub fn select(&mut self, index: Option<usize>) -> Result<()> {
        if let Some(i) = index {
            self.check(i)?;
        }
        self.selection = index;
        Ok(())
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// Selected record, if the selection is valid.
    pub fn selected(&self) -> Option<&Record> {
        self.selection.and_then(|i| self.records.get(i))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.records.len() {
            Ok(())
        } else {
            Err(EditorError::IndexOutOfRange {
                index,
                len: self.records.len(),
            })
        }
    }
}
