//! Document Index
//!
//! Ordered sequence of batches plus the root element's local name. An index
//! is immutable once built; queries only read it.

use super::batch::{Batch, EntryState};
use crate::query;
use crate::Result;

/// Flattened, queryable form of one XML document (or one sub-document)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentIndex {
    batches: Vec<Batch>,
    root: Option<String>,
}

impl Default for DocumentIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentIndex {
    /// An empty index: a single empty batch and no root name
    pub fn new() -> Self {
        Self {
            batches: vec![Batch::new()],
            root: None,
        }
    }

    pub(crate) fn with_root(root: &str) -> Self {
        Self {
            batches: vec![Batch::new()],
            root: Some(root.to_string()),
        }
    }

    /// Local name of the root element; `None` for sub-documents and for
    /// documents without a root element.
    pub fn root_element_name(&self) -> Option<&str> {
        self.root.as_deref()
    }

    /// True iff the index holds exactly one batch and that batch is empty
    pub fn is_empty(&self) -> bool {
        matches!(self.batches.as_slice(), [only] if only.is_empty())
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// First non-empty value whose path matches `query`
    pub fn query_one(&self, query: &str) -> Result<Option<&str>> {
        let compiled = query::compile(query)?;
        Ok(query::eval_one(self, &compiled))
    }

    /// Every non-empty value whose path matches `query`, in document order
    pub fn query_all(&self, query: &str) -> Result<Vec<&str>> {
        let compiled = query::compile(query)?;
        Ok(query::eval_all(self, &compiled))
    }

    /// Split into one sub-document per occurrence of the `context` element
    pub fn sub_documents(&self, context: &str) -> Result<Vec<DocumentIndex>> {
        let compiled = query::compile(context)?;
        Ok(query::sub_documents(self, &compiled))
    }

    #[inline]
    fn current(&mut self) -> &mut Batch {
        if self.batches.is_empty() {
            self.batches.push(Batch::new());
        }
        let last = self.batches.len() - 1;
        &mut self.batches[last]
    }

    /// Mark `path` open, starting a new batch if the current one already
    /// has an entry for it.
    pub(crate) fn open_path(&mut self, path: &str) {
        if self.current().contains(path) {
            self.batches.push(Batch::new());
        }
        self.current().insert_open(path);
    }

    /// Give `path` its leaf value, starting a new batch if the current one
    /// already holds a value for it.
    pub(crate) fn close_path(&mut self, path: &str, value: &str) {
        if let EntryState::Closed(_) = self.current().state(path) {
            self.batches.push(Batch::new());
        }
        self.current().set_value(path, value);
    }

    /// Copy an entry as-is: open entries open, closed entries open+close
    pub(crate) fn push_entry(&mut self, path: &str, value: Option<&str>) {
        self.open_path(path);
        if let Some(value) = value {
            self.close_path(path, value);
        }
    }
}
