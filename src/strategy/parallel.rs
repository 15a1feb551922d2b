//! Parallel Batch Operations
//!
//! Uses Rayon to run many queries against one index, or to flatten many
//! documents at once. Results keep the order of the inputs.

use rayon::prelude::*;

use crate::index::DocumentIndex;
use crate::pool::ParserPool;
use crate::query::{eval_all, QueryCache};
use crate::Result;

/// Evaluate several queries against one index in parallel
pub fn query_many<'i>(
    index: &'i DocumentIndex,
    cache: &QueryCache,
    queries: &[&str],
) -> Vec<Result<Vec<&'i str>>> {
    queries
        .par_iter()
        .map(|query| cache.get_or_compile(query).map(|compiled| eval_all(index, &compiled)))
        .collect()
}

/// Keyed variant of `query_many`; fails on the first bad query
pub fn query_map<'i>(
    index: &'i DocumentIndex,
    cache: &QueryCache,
    queries: &[(&str, &str)], // (key, query)
) -> Result<Vec<(String, Vec<&'i str>)>> {
    queries
        .par_iter()
        .map(|(key, query)| {
            let compiled = cache.get_or_compile(query)?;
            Ok((key.to_string(), eval_all(index, &compiled)))
        })
        .collect()
}

/// Flatten several documents in parallel, each with a pooled parser
pub fn parse_many(pool: &ParserPool, documents: &[&str]) -> Vec<Result<DocumentIndex>> {
    documents
        .par_iter()
        .map(|xml| pool.acquire()?.flatten(xml))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PoolConfig, WaitPolicy};
    use crate::index::Flattener;
    use crate::Error;
    use std::num::NonZeroUsize;

    #[test]
    fn test_query_many_keeps_order() {
        let index = Flattener::new().flatten("<r><a>1</a><b>2</b><a>3</a></r>").unwrap();
        let cache = QueryCache::unbounded();
        let results = query_many(&index, &cache, &["//:a", "/r/b", "//c"]);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap(), &vec!["1", "3"]);
        assert_eq!(results[1].as_ref().unwrap(), &vec!["2"]);
        assert!(matches!(results[2], Err(Error::QueryCompilation { .. })));
    }

    #[test]
    fn test_query_map() {
        let index = Flattener::new().flatten("<r><a>1</a><b>2</b></r>").unwrap();
        let cache = QueryCache::unbounded();
        let results = query_map(&index, &cache, &[("first", "/r/a"), ("second", "/r/b")]).unwrap();
        assert_eq!(results, vec![("first".to_string(), vec!["1"]), ("second".to_string(), vec!["2"])]);
    }

    #[test]
    fn test_parse_many() {
        let pool = ParserPool::new(PoolConfig {
            capacity: NonZeroUsize::new(2).unwrap(),
            wait: WaitPolicy::Grow,
        });
        let docs = ["<a>1</a>", "<b><c/></b>", "<broken>"];
        let results = parse_many(&pool, &docs);

        assert_eq!(results[0].as_ref().unwrap().root_element_name(), Some("a"));
        assert_eq!(results[1].as_ref().unwrap().root_element_name(), Some("b"));
        assert!(matches!(results[2], Err(Error::DocumentParse { .. })));
        assert_eq!(pool.idle(), 2);
    }
}
