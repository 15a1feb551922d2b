//! Sub-Document Extractor
//!
//! Re-bases a document index onto every occurrence of a context element.
//! Each path under a context occurrence is rewritten so that the matched
//! prefix becomes a single segment named after the context element, e.g.
//! with context `//:entry`, `/list/entry/code` becomes `/entry/code`.
//! A path that *is* a context occurrence starts a new record.

use super::compiler::{split_path, CompiledQuery};
use crate::index::DocumentIndex;

/// Partition `index` into one sub-document per context occurrence, in
/// document order. Occurrences with nothing beneath them yield no
/// sub-document.
pub fn sub_documents(index: &DocumentIndex, context: &CompiledQuery) -> Vec<DocumentIndex> {
    let mut records = Vec::new();
    let mut current = DocumentIndex::new();
    let mut localized = String::new();

    for (path, value) in index.batches().iter().flat_map(|b| b.iter()) {
        let segments = split_path(path);
        let Some(end) = context.shortest_prefix(&segments) else {
            continue;
        };

        if end == segments.len() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            continue;
        }

        localized.clear();
        for segment in &segments[end - 1..] {
            localized.push('/');
            localized.push_str(segment);
        }
        current.push_entry(&localized, value);
    }

    if !current.is_empty() {
        records.push(current);
    }

    tracing::trace!(
        context = context.source(),
        records = records.len(),
        "extracted sub-documents"
    );
    records
}
