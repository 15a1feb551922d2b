//! Parser Resource Pool
//!
//! A bounded set of reusable `Flattener`s. Idle parsers sit in a bounded
//! channel; `acquire` receives one and the returned `PooledParser` sends it
//! back when dropped, so a parser is released on every exit path.

use std::ops::{Deref, DerefMut};
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};

use crate::config::{PoolConfig, WaitPolicy};
use crate::index::Flattener;
use crate::{Error, Result};

/// Pool of parser instances shared by concurrent callers
#[derive(Debug)]
pub struct ParserPool {
    idle_tx: Sender<Flattener>,
    idle_rx: Receiver<Flattener>,
    config: PoolConfig,
}

impl ParserPool {
    /// Create a pool with `config.capacity` parsers ready to lease
    pub fn new(config: PoolConfig) -> Self {
        let capacity = config.capacity.get();
        let (idle_tx, idle_rx) = bounded(capacity);
        for _ in 0..capacity {
            // Cannot fail: the channel has room for exactly `capacity` parsers
            let _ = idle_tx.try_send(Flattener::new());
        }
        Self {
            idle_tx,
            idle_rx,
            config,
        }
    }

    /// Lease a parser according to the pool's wait policy
    pub fn acquire(&self) -> Result<PooledParser<'_>> {
        let parser = match self.idle_rx.try_recv() {
            Ok(parser) => parser,
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => self.wait_for_parser()?,
        };
        Ok(PooledParser { parser, pool: self })
    }

    fn wait_for_parser(&self) -> Result<Flattener> {
        match self.config.wait {
            WaitPolicy::Grow => {
                tracing::debug!(capacity = self.capacity(), "parser pool exhausted, growing");
                Ok(Flattener::new())
            }
            WaitPolicy::Block { timeout } => {
                let started = Instant::now();
                match self.idle_rx.recv_timeout(timeout) {
                    Ok(parser) => {
                        tracing::trace!(waited = ?started.elapsed(), "parser pool wait satisfied");
                        Ok(parser)
                    }
                    Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                        let waited = started.elapsed();
                        tracing::warn!(capacity = self.capacity(), ?waited, "parser pool exhausted");
                        Err(Error::ResourceExhausted { waited })
                    }
                }
            }
        }
    }

    /// Parsers currently available without waiting
    pub fn idle(&self) -> usize {
        self.idle_rx.len()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity.get()
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        self.config.wait
    }

    fn release(&self, mut parser: Flattener) {
        parser.reset();
        // A full channel means this parser was grown past capacity
        if self.idle_tx.try_send(parser).is_err() {
            tracing::trace!("dropping surplus parser");
        }
    }
}

impl Default for ParserPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

/// A leased parser; goes back to its pool when dropped
pub struct PooledParser<'p> {
    parser: Flattener,
    pool: &'p ParserPool,
}

impl Deref for PooledParser<'_> {
    type Target = Flattener;

    fn deref(&self) -> &Flattener {
        &self.parser
    }
}

impl DerefMut for PooledParser<'_> {
    fn deref_mut(&mut self) -> &mut Flattener {
        &mut self.parser
    }
}

impl Drop for PooledParser<'_> {
    fn drop(&mut self) {
        // `Flattener::default` does not allocate
        self.pool.release(std::mem::take(&mut self.parser));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;
    use std::sync::Arc;
    use std::time::Duration;

    fn pool(capacity: usize, wait: WaitPolicy) -> ParserPool {
        ParserPool::new(PoolConfig {
            capacity: NonZeroUsize::new(capacity).unwrap(),
            wait,
        })
    }

    fn short_block() -> WaitPolicy {
        WaitPolicy::Block {
            timeout: Duration::from_millis(20),
        }
    }

    #[test]
    fn test_lease_and_return() {
        let pool = pool(2, short_block());
        assert_eq!(pool.idle(), 2);
        {
            let mut parser = pool.acquire().unwrap();
            assert_eq!(pool.idle(), 1);
            let index = parser.flatten("<r><a>1</a></r>").unwrap();
            assert_eq!(index.root_element_name(), Some("r"));
        }
        assert_eq!(pool.idle(), 2);
    }

    #[test]
    fn test_block_times_out() {
        let pool = pool(1, short_block());
        let _held = pool.acquire().unwrap();
        match pool.acquire() {
            Err(Error::ResourceExhausted { waited }) => assert!(waited >= Duration::from_millis(20)),
            other => panic!("expected exhaustion, got {:?}", other.map(|_| ())),
        };
    }

    #[test]
    fn test_released_on_parse_error() {
        let pool = pool(1, short_block());
        {
            let mut parser = pool.acquire().unwrap();
            assert!(parser.flatten("<r><a></r>").is_err());
        }
        let parser = pool.acquire().unwrap();
        assert!(parser.is_clean());
    }

    #[test]
    fn test_grow_drops_surplus() {
        let pool = pool(1, WaitPolicy::Grow);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert_eq!(pool.idle(), 0);
        drop(a);
        drop(b);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_waiter_receives_returned_parser() {
        let pool = Arc::new(pool(
            1,
            WaitPolicy::Block {
                timeout: Duration::from_secs(5),
            },
        ));
        let held = pool.acquire().unwrap();
        let waiter = {
            let pool = Arc::clone(&pool);
            std::thread::spawn(move || pool.acquire().map(|_| ()).is_ok())
        };
        std::thread::sleep(Duration::from_millis(20));
        drop(held);
        assert!(waiter.join().unwrap());
    }
}
