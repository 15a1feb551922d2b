//! Index Builder
//!
//! Flattens an XML document into a `DocumentIndex` in a single scan.
//! Implements the ScanHandler trait for use with UnifiedScanner.
//!
//! Text handling: the accumulator is reset on every element start and
//! consumed on every element end, so only text between an element's start
//! tag and its first child (or its own end tag), or between its last child
//! and its end tag, is attributed to it. Mixed content is not merged.

use memchr::memchr;

use super::document::DocumentIndex;
use crate::core::{ScanHandler, UnifiedScanner};
use crate::Result;

/// Reusable flattening state. Instances are lent out by `ParserPool`; the
/// buffers survive between documents so repeated parses do not reallocate.
#[derive(Debug, Default)]
pub struct Flattener {
    /// Open element name ranges used by the scanner
    open: Vec<(usize, usize)>,
    /// Absolute path of the innermost open element
    path: String,
    /// Length of `path` before each open element was appended
    path_lens: Vec<usize>,
    /// Text seen since the last element start or end
    text: String,
}

impl Flattener {
    pub fn new() -> Self {
        Self {
            open: Vec::with_capacity(32),
            path: String::with_capacity(256),
            path_lens: Vec::with_capacity(32),
            text: String::new(),
        }
    }

    /// Flatten one document
    pub fn flatten(&mut self, xml: &str) -> Result<DocumentIndex> {
        self.reset();
        let mut handler = FlattenHandler {
            index: DocumentIndex::new(),
            path: &mut self.path,
            path_lens: &mut self.path_lens,
            text: &mut self.text,
        };

        let scanned = UnifiedScanner::new(xml, &mut self.open).scan(&mut handler);
        let index = handler.index;
        self.reset();
        scanned?;
        Ok(index)
    }

    /// Drop any per-document state, keeping allocations
    pub fn reset(&mut self) {
        self.open.clear();
        self.path.clear();
        self.path_lens.clear();
        self.text.clear();
    }

    /// True when no per-document state is held
    pub fn is_clean(&self) -> bool {
        self.open.is_empty() && self.path.is_empty() && self.path_lens.is_empty() && self.text.is_empty()
    }
}

struct FlattenHandler<'f> {
    index: DocumentIndex,
    path: &'f mut String,
    path_lens: &'f mut Vec<usize>,
    text: &'f mut String,
}

impl ScanHandler for FlattenHandler<'_> {
    fn start_element(&mut self, name: &str) {
        let local = local_name(name);
        if self.path_lens.is_empty() {
            self.index = DocumentIndex::with_root(local);
        }

        self.path_lens.push(self.path.len());
        self.path.push('/');
        self.path.push_str(local);
        self.text.clear();
        self.index.open_path(self.path.as_str());
    }

    fn end_element(&mut self, _name: &str) {
        let value = self.text.trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r'));
        if !value.is_empty() {
            self.index.close_path(self.path.as_str(), value);
        }
        self.text.clear();

        if let Some(len) = self.path_lens.pop() {
            self.path.truncate(len);
        }
    }

    fn text(&mut self, text: &str) {
        self.text.push_str(text);
    }
}

/// Strip a namespace prefix: `ns:item` → `item`
#[inline]
fn local_name(name: &str) -> &str {
    match memchr(b':', name.as_bytes()) {
        Some(pos) if pos + 1 < name.len() => &name[pos + 1..],
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flatten(xml: &str) -> DocumentIndex {
        Flattener::new().flatten(xml).unwrap()
    }

    fn entries(index: &DocumentIndex) -> Vec<Vec<(String, Option<String>)>> {
        index
            .batches()
            .iter()
            .map(|b| {
                b.iter()
                    .map(|(p, v)| (p.to_string(), v.map(str::to_string)))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_single_batch() {
        let index = flatten("<r><a>1</a><b>2</b></r>");
        assert_eq!(index.root_element_name(), Some("r"));
        assert_eq!(index.batch_count(), 1);
        let batch = &index.batches()[0];
        assert_eq!(batch.get("/r/a"), Some("1"));
        assert_eq!(batch.get("/r/b"), Some("2"));
        assert_eq!(batch.get("/r"), None);
        assert!(batch.contains("/r"));
    }

    #[test]
    fn test_repeated_siblings_split_batches() {
        let index = flatten("<r><i>A</i><i>B</i></r>");
        assert_eq!(
            entries(&index),
            vec![
                vec![("/r".into(), None), ("/r/i".into(), Some("A".into()))],
                vec![("/r/i".into(), Some("B".into()))],
            ]
        );
    }

    #[test]
    fn test_empty_element_stays_open() {
        let index = flatten("<r><i></i><j/></r>");
        let batch = &index.batches()[0];
        assert!(batch.contains("/r/i"));
        assert!(batch.contains("/r/j"));
        assert_eq!(batch.get("/r/i"), None);
    }

    #[test]
    fn test_whitespace_is_not_a_value() {
        let index = flatten("<r>\n  <i>\n    A\n  </i>\n</r>\n");
        let batch = &index.batches()[0];
        assert_eq!(batch.get("/r/i"), Some("A"));
        assert_eq!(batch.get("/r"), None);
    }

    #[test]
    fn test_mixed_content_keeps_trailing_text() {
        let index = flatten("<a>hello<b>x</b>world</a>");
        let batch = &index.batches()[0];
        assert_eq!(batch.get("/a/b"), Some("x"));
        assert_eq!(batch.get("/a"), Some("world"));
    }

    #[test]
    fn test_namespace_prefix_dropped() {
        let index = flatten(r#"<ns:r xmlns:ns="urn:x"><ns:v>1</ns:v></ns:r>"#);
        assert_eq!(index.root_element_name(), Some("r"));
        assert_eq!(index.batches()[0].get("/r/v"), Some("1"));
    }

    #[test]
    fn test_cdata_and_entities() {
        let index = flatten("<r><a><![CDATA[1 < 2]]></a><b>x &amp; y</b></r>");
        let batch = &index.batches()[0];
        assert_eq!(batch.get("/r/a"), Some("1 < 2"));
        assert_eq!(batch.get("/r/b"), Some("x & y"));
    }

    #[test]
    fn test_empty_document() {
        let index = flatten("<?xml version=\"1.0\"?>\n");
        assert!(index.is_empty());
        assert_eq!(index.root_element_name(), None);
    }

    #[test]
    fn test_failure_leaves_flattener_clean() {
        let mut flattener = Flattener::new();
        assert!(flattener.flatten("<r><a>1</r>").is_err());
        assert!(flattener.is_clean());
        assert!(flattener.flatten("<r><a>1</a></r>").is_ok());
    }

    #[test]
    fn test_deterministic() {
        let xml = "<l><e><c>A</c><d>1</d></e><e><c>B</c></e></l>";
        assert_eq!(flatten(xml), flatten(xml));
    }
}
