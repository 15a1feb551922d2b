//! Batch Strategy Module
//!
//! Data-parallel helpers over the single-document operations:
//! many queries against one index, or many documents through the pool.

pub mod parallel;

pub use parallel::{parse_many, query_many, query_map};
