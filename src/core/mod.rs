//! Core XML parsing primitives
//!
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Entities: XML entity decoding with Cow (zero-copy when possible)
//! - Encoding: BOM / UTF-16 detection and conversion to UTF-8
//! - UnifiedScanner: strict ScanHandler-based scanner feeding the flattener

pub mod encoding;
pub mod entities;
pub mod scanner;
pub mod unified_scanner;

pub use unified_scanner::{ScanHandler, UnifiedScanner};
