//! Path Query Module
//!
//! A compact path language over flattened element paths:
//!
//! | query | matches |
//! |-------|---------|
//! | `/r/x` | child `x` of root `r` |
//! | `/:x` | child `x` of any root |
//! | `//:x` | `x` at any depth |
//! | `/r//:x` | `x` anywhere below root `r` |
//! | `/r/*` | any direct child of `r` |
//!
//! Queries are compiled once into a [`CompiledQuery`] and shared through a
//! [`QueryCache`].

pub mod cache;
pub mod compiler;
pub mod eval;
pub mod extract;
pub mod lexer;

use std::sync::Arc;

pub use cache::QueryCache;
pub use compiler::{Axis, CompiledQuery, NameTest, Step};
pub use eval::{eval_all, eval_one};
pub use extract::sub_documents;

use crate::Result;

/// Compile `query` through the process-wide cache
pub fn compile(query: &str) -> Result<Arc<CompiledQuery>> {
    QueryCache::global().get_or_compile(query)
}
