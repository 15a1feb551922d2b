//! xmlbatch - flatten XML documents into ordered batches and query them
//!
//! A document is scanned once into a [`DocumentIndex`]: a sequence of
//! batches mapping absolute element paths (`/root/child/leaf`) to their
//! trimmed text. Whenever a path repeats, a new batch starts, so repeating
//! groups keep their document order.
//!
//! Components:
//! - Flattener: strict single-pass scanner into a `DocumentIndex`
//! - Query compiler: `/`, `/:`, `//:` and `*` path queries, cached by text
//! - Evaluator: first or all matching values in document order
//! - Extractor: one sub-document per occurrence of a context element
//! - Parser pool: bounded set of reusable flatteners
//!
//! ```
//! let index = xmlbatch::parse("<list><entry><code>A</code></entry><entry><code>B</code></entry></list>")?;
//! assert_eq!(index.query_all("//:code")?, vec!["A", "B"]);
//!
//! let entries = index.sub_documents("//:entry")?;
//! assert_eq!(entries[1].query_one("/:code")?, Some("B"));
//! # Ok::<(), xmlbatch::Error>(())
//! ```

mod core;
mod strategy;

pub mod config;
pub mod error;
pub mod index;
pub mod pool;
pub mod query;
pub mod value;

use std::sync::{Arc, LazyLock};

pub use config::{EngineConfig, PoolConfig, WaitPolicy};
pub use error::{Error, Result};
pub use index::{Batch, DocumentIndex, EntryState, Flattener};
pub use pool::{ParserPool, PooledParser};
pub use query::{CompiledQuery, QueryCache};
pub use value::{FieldValue, ENUMERATION_SEPARATOR, INTERVAL_SEPARATOR};

static DEFAULT_ENGINE: LazyLock<Engine> = LazyLock::new(|| Engine::new(EngineConfig::from_env()));

// ============================================================================
// Engine
// ============================================================================

/// A parser pool plus a compiled-query cache
#[derive(Debug)]
pub struct Engine {
    pool: ParserPool,
    cache: Arc<QueryCache>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let cache = match config.query_cache_capacity {
            Some(capacity) => Arc::new(QueryCache::bounded(capacity)),
            None => QueryCache::global(),
        };
        Self {
            pool: ParserPool::new(config.pool),
            cache,
        }
    }

    /// The process-wide engine used by the free functions, configured from
    /// the environment on first use
    pub fn global() -> &'static Engine {
        &DEFAULT_ENGINE
    }

    pub fn pool(&self) -> &ParserPool {
        &self.pool
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Flatten an XML document with a pooled parser
    pub fn parse(&self, xml: &str) -> Result<DocumentIndex> {
        let mut parser = self.pool.acquire()?;
        let index = parser.flatten(xml)?;
        tracing::debug!(
            bytes = xml.len(),
            batches = index.batch_count(),
            root = index.root_element_name(),
            "flattened document"
        );
        Ok(index)
    }

    /// Flatten raw bytes: UTF-8 (optional BOM) or UTF-16 with BOM
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<DocumentIndex> {
        let xml = crate::core::encoding::decode_document(bytes)
            .map_err(|(offset, message)| Error::parse(offset, message))?;
        self.parse(&xml)
    }

    pub fn compile(&self, query: &str) -> Result<Arc<CompiledQuery>> {
        self.cache.get_or_compile(query)
    }

    /// First non-empty value whose path matches `query`
    pub fn query_one<'i>(&self, index: &'i DocumentIndex, query: &str) -> Result<Option<&'i str>> {
        let compiled = self.compile(query)?;
        Ok(query::eval_one(index, &compiled))
    }

    /// Every non-empty value whose path matches `query`, in document order
    pub fn query_all<'i>(&self, index: &'i DocumentIndex, query: &str) -> Result<Vec<&'i str>> {
        let compiled = self.compile(query)?;
        Ok(query::eval_all(index, &compiled))
    }

    /// One sub-document per occurrence of the `context` element
    pub fn sub_documents(&self, index: &DocumentIndex, context: &str) -> Result<Vec<DocumentIndex>> {
        let compiled = self.compile(context)?;
        Ok(query::sub_documents(index, &compiled))
    }

    /// Evaluate several queries in parallel; one result per query
    pub fn query_many<'i>(&self, index: &'i DocumentIndex, queries: &[&str]) -> Vec<Result<Vec<&'i str>>> {
        strategy::query_many(index, &self.cache, queries)
    }

    /// Evaluate keyed queries in parallel, failing on the first bad query
    pub fn query_map<'i>(
        &self,
        index: &'i DocumentIndex,
        queries: &[(&str, &str)],
    ) -> Result<Vec<(String, Vec<&'i str>)>> {
        strategy::query_map(index, &self.cache, queries)
    }

    /// Flatten several documents in parallel; one result per document
    pub fn parse_many(&self, documents: &[&str]) -> Vec<Result<DocumentIndex>> {
        strategy::parse_many(&self.pool, documents)
    }
}

// ============================================================================
// Free functions over the default engine
// ============================================================================

/// Flatten an XML document
pub fn parse(xml: &str) -> Result<DocumentIndex> {
    Engine::global().parse(xml)
}

/// Flatten an XML document given as raw bytes
pub fn parse_bytes(bytes: &[u8]) -> Result<DocumentIndex> {
    Engine::global().parse_bytes(bytes)
}

/// Compile a path query through the default cache
pub fn compile(query: &str) -> Result<Arc<CompiledQuery>> {
    Engine::global().compile(query)
}

pub fn query_one<'i>(index: &'i DocumentIndex, query: &str) -> Result<Option<&'i str>> {
    Engine::global().query_one(index, query)
}

pub fn query_all<'i>(index: &'i DocumentIndex, query: &str) -> Result<Vec<&'i str>> {
    Engine::global().query_all(index, query)
}

pub fn sub_documents(index: &DocumentIndex, context: &str) -> Result<Vec<DocumentIndex>> {
    Engine::global().sub_documents(index, context)
}

pub fn root_element_name(index: &DocumentIndex) -> Option<&str> {
    index.root_element_name()
}

pub fn is_empty(index: &DocumentIndex) -> bool {
    index.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    #[test]
    fn test_engine_round_trip() {
        let engine = Engine::default();
        let index = engine.parse("<r><a>1</a><a>2</a></r>").unwrap();
        assert_eq!(engine.query_one(&index, "//:a").unwrap(), Some("1"));
        assert_eq!(engine.query_all(&index, "/r/a").unwrap(), vec!["1", "2"]);
        assert_eq!(engine.pool().idle(), engine.pool().capacity());
    }

    #[test]
    fn test_bounded_cache_is_private() {
        let config = EngineConfig::default().with_query_cache_capacity(NonZeroUsize::new(1));
        let engine = Engine::new(config);
        engine.compile("/a").unwrap();
        engine.compile("/b").unwrap();
        assert_eq!(engine.cache().len(), 1);
        assert_eq!(engine.cache().capacity(), 1);
    }

    #[test]
    fn test_parse_bytes_utf16() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "<r><a>é</a></r>".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let index = parse_bytes(&bytes).unwrap();
        assert_eq!(query_one(&index, "/r/a").unwrap(), Some("é"));
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let err = parse_bytes(b"<r>\xFF</r>").unwrap_err();
        assert!(matches!(err, Error::DocumentParse { offset: 3, .. }));
    }

    #[test]
    fn test_free_functions() {
        let index = parse("<doc/>").unwrap();
        assert_eq!(root_element_name(&index), Some("doc"));
        assert!(!is_empty(&index));
        assert!(is_empty(&parse("<?xml version=\"1.0\"?>").unwrap()));
        assert!(compile("//:x").is_ok());
        assert!(sub_documents(&index, "//:x").unwrap().is_empty());
        assert!(query_all(&index, "//:x").unwrap().is_empty());
    }
}
