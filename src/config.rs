//! Engine configuration
//!
//! Defaults suit a multi-threaded caller: one pooled parser per available
//! core, a bounded wait for a free parser, and an unbounded query cache.
//! `EngineConfig::from_env` layers environment overrides on top.

use std::num::NonZeroUsize;
use std::time::Duration;

/// Pool size override
pub const ENV_POOL_SIZE: &str = "XMLBATCH_POOL_SIZE";
/// Milliseconds to wait for a parser; `0` lets the pool grow instead
pub const ENV_POOL_TIMEOUT_MS: &str = "XMLBATCH_POOL_TIMEOUT_MS";
/// Query cache bound; `0` keeps it unbounded
pub const ENV_QUERY_CACHE: &str = "XMLBATCH_QUERY_CACHE";

const DEFAULT_WAIT: Duration = Duration::from_secs(5);

/// What `ParserPool::acquire` does when every parser is leased
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Wait for a parser to be returned, failing after `timeout`
    Block { timeout: Duration },
    /// Create an extra parser; surplus ones are dropped on return
    Grow,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        WaitPolicy::Block {
            timeout: DEFAULT_WAIT,
        }
    }
}

/// Parser pool settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub capacity: NonZeroUsize,
    pub wait: WaitPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN),
            wait: WaitPolicy::default(),
        }
    }
}

impl PoolConfig {
    pub fn with_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_wait(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }
}

/// Top-level settings for an `Engine`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    pub pool: PoolConfig,
    /// `None` shares the process-wide unbounded cache; `Some(n)` gives the
    /// engine its own LRU cache of at most `n` queries.
    pub query_cache_capacity: Option<NonZeroUsize>,
}

impl EngineConfig {
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_query_cache_capacity(mut self, capacity: Option<NonZeroUsize>) -> Self {
        self.query_cache_capacity = capacity;
        self
    }

    /// Defaults overridden by `XMLBATCH_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(size) = read_number(&lookup, ENV_POOL_SIZE) {
            match NonZeroUsize::new(size) {
                Some(capacity) => config.pool.capacity = capacity,
                None => tracing::warn!(var = ENV_POOL_SIZE, "pool size must be positive, using default"),
            }
        }

        if let Some(ms) = read_number(&lookup, ENV_POOL_TIMEOUT_MS) {
            config.pool.wait = match ms {
                0 => WaitPolicy::Grow,
                ms => WaitPolicy::Block {
                    timeout: Duration::from_millis(ms as u64),
                },
            };
        }

        if let Some(bound) = read_number(&lookup, ENV_QUERY_CACHE) {
            config.query_cache_capacity = NonZeroUsize::new(bound);
        }

        config
    }
}

fn read_number(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<usize> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(var = key, value = %raw, "ignoring unparsable setting");
            None
        }
    }
}
