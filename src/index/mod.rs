//! Document Index Module
//!
//! The flattened form of an XML document that all queries run against.
//!
//! ## Architecture
//!
//! ```text
//! DocumentIndex
//! ├── root: Option<String>        # local name of the root element
//! └── batches: Vec<Batch>         # split whenever a path repeats
//!     └── entries: path -> EntryState (absent / open / closed)
//! ```
//!
//! A batch never holds the same path twice, so every value of a repeating
//! group lands in its own batch and document order is kept across them.

pub mod batch;
pub mod builder;
pub mod document;

pub use batch::{Batch, EntryState};
pub use builder::Flattener;
pub use document::DocumentIndex;
