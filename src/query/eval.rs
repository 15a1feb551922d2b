//! Query Evaluator
//!
//! Scans batches in order, and entries within a batch in insertion order.
//! Open entries and empty values are skipped.

use super::compiler::CompiledQuery;
use crate::index::DocumentIndex;

fn values<'i: 'q, 'q>(
    index: &'i DocumentIndex,
    query: &'q CompiledQuery,
) -> impl Iterator<Item = &'i str> + 'q {
    index
        .batches()
        .iter()
        .flat_map(|batch| batch.iter())
        .filter_map(move |(path, value)| match value {
            Some(v) if !v.is_empty() && query.matches(path) => Some(v),
            _ => None,
        })
}

/// First matching value in scan order
pub fn eval_one<'i>(index: &'i DocumentIndex, query: &CompiledQuery) -> Option<&'i str> {
    values(index, query).next()
}

/// All matching values in scan order; repeats across batches are kept
pub fn eval_all<'i>(index: &'i DocumentIndex, query: &CompiledQuery) -> Vec<&'i str> {
    values(index, query).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Flattener;

    fn doc(xml: &str) -> DocumentIndex {
        Flattener::new().flatten(xml).unwrap()
    }

    fn q(query: &str) -> CompiledQuery {
        CompiledQuery::compile(query).unwrap()
    }

    #[test]
    fn test_eval_one_first_in_order() {
        let index = doc("<r><i>A</i><i>B</i></r>");
        assert_eq!(eval_one(&index, &q("//:i")), Some("A"));
    }

    #[test]
    fn test_eval_all_across_batches() {
        let index = doc("<r><i>A</i><i>B</i><i>A</i></r>");
        assert_eq!(eval_all(&index, &q("//:i")), vec!["A", "B", "A"]);
    }

    #[test]
    fn test_open_entries_invisible() {
        let index = doc("<r><i></i><j/></r>");
        assert_eq!(eval_one(&index, &q("//:i")), None);
        assert!(eval_all(&index, &q("/r/*")).is_empty());
    }

    #[test]
    fn test_wildcard_in_insertion_order() {
        let index = doc("<r><y>2</y><x>1</x></r>");
        assert_eq!(eval_all(&index, &q("/r/*")), vec!["2", "1"]);
    }
}
