//! Path Query Compiler
//!
//! Compiles a tokenized path query into a small step program and matches it
//! against flattened element paths (`/root/child/...`).
//!
//! Matching tracks the set of segment positions reachable after each step,
//! so descendant steps never cause exponential backtracking.

use super::lexer::{Lexer, Token};
use crate::{Error, Result};

/// How a step relates to the previously matched segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// The very next segment
    Child,
    /// Any later segment (one or more levels down)
    Descendant,
}

/// Compiled name test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTest {
    /// `*`: one segment of ASCII letters, digits, `_` or `:`
    Any,
    /// Exact, case-sensitive element name
    Name(String),
    /// Implicit root of a leading `/:`, whatever its name
    Root,
}

impl NameTest {
    #[inline]
    fn accepts(&self, segment: &str) -> bool {
        match self {
            NameTest::Any => {
                !segment.is_empty()
                    && segment
                        .bytes()
                        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b':')
            }
            NameTest::Name(name) => name == segment,
            NameTest::Root => !segment.is_empty(),
        }
    }
}

/// One compiled step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub axis: Axis,
    pub test: NameTest,
}

/// Compiled path query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    source: String,
    steps: Vec<Step>,
}

impl CompiledQuery {
    /// Compile a path query string
    pub fn compile(query: &str) -> Result<Self> {
        let tokens = Lexer::new(query).tokenize().map_err(|e| {
            Error::query(query, format!("{} (at byte {})", e.reason, e.offset))
        })?;

        let mut steps = Vec::with_capacity(tokens.len() / 2 + 1);
        let mut tokens = tokens.into_iter().peekable();

        match tokens.peek() {
            None => return Err(Error::query(query, "empty query")),
            Some(t) if !t.is_separator() => {
                return Err(Error::query(query, "query must start with '/', '/:' or '//:'"))
            }
            Some(_) => {}
        }

        let mut first = true;
        while let Some(separator) = tokens.next() {
            let test = match tokens.next() {
                Some(Token::Name(name)) => NameTest::Name(name.to_string()),
                Some(Token::Star) => NameTest::Any,
                Some(_) => return Err(Error::query(query, "two separators in a row")),
                None => return Err(Error::query(query, "query ends with a separator")),
            };

            let axis = match separator {
                Token::Slash => Axis::Child,
                Token::SlashColon => {
                    if first {
                        // Leading `/:` addresses a child of whatever the root is
                        steps.push(Step {
                            axis: Axis::Child,
                            test: NameTest::Root,
                        });
                    }
                    Axis::Child
                }
                Token::Descendant => Axis::Descendant,
                Token::Star | Token::Name(_) => {
                    return Err(Error::query(query, "two name tests in a row"))
                }
            };
            steps.push(Step { axis, test });
            first = false;
        }

        Ok(CompiledQuery {
            source: query.to_string(),
            steps,
        })
    }

    /// The query text this matcher was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// True if the whole path matches
    pub fn matches(&self, path: &str) -> bool {
        let segments = split_path(path);
        self.reachable(&segments).get(segments.len()) == Some(&true)
    }

    /// Number of leading path segments in the shortest matching prefix
    pub fn prefix_segments(&self, path: &str) -> Option<usize> {
        self.shortest_prefix(&split_path(path))
    }

    pub(crate) fn shortest_prefix(&self, segments: &[&str]) -> Option<usize> {
        self.reachable(segments).iter().position(|&hit| hit)
    }

    /// Positions (consumed segment counts) reachable after all steps; empty
    /// when the path cannot match at all.
    fn reachable(&self, segments: &[&str]) -> Vec<bool> {
        let n = segments.len();
        let mut current = vec![false; n + 1];
        current[0] = true;

        for step in &self.steps {
            let mut next = vec![false; n + 1];
            let mut any = false;
            for p in (0..=n).filter(|&p| current[p]) {
                let candidates = match step.axis {
                    Axis::Child => p..(p + 1).min(n),
                    Axis::Descendant => p..n,
                };
                for q in candidates {
                    if step.test.accepts(segments[q]) {
                        next[q + 1] = true;
                        any = true;
                    }
                }
            }
            if !any {
                return Vec::new();
            }
            current = next;
        }
        current
    }
}

/// Split `/a/b/c` into `["a", "b", "c"]`
#[inline]
pub(crate) fn split_path(path: &str) -> Vec<&str> {
    path.strip_prefix('/')
        .unwrap_or(path)
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

/// Compile a path query string without consulting the cache
pub fn compile(query: &str) -> Result<CompiledQuery> {
    CompiledQuery::compile(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(query: &str) -> CompiledQuery {
        compile(query).unwrap()
    }

    #[test]
    fn test_compile_simple() {
        let compiled = q("/r/*");
        assert_eq!(compiled.steps().len(), 2);
        assert_eq!(compiled.steps()[0].test, NameTest::Name("r".into()));
        assert_eq!(compiled.steps()[1].test, NameTest::Any);
        assert_eq!(compiled.source(), "/r/*");
    }

    #[test]
    fn test_absolute_path() {
        let compiled = q("/r/x");
        assert!(compiled.matches("/r/x"));
        assert!(!compiled.matches("/r"));
        assert!(!compiled.matches("/r/x/y"));
        assert!(!compiled.matches("/s/x"));
    }

    #[test]
    fn test_wildcard_is_one_segment() {
        let compiled = q("/r/*");
        assert!(compiled.matches("/r/x"));
        assert!(compiled.matches("/r/ns:y_2"));
        assert!(!compiled.matches("/r/x/y"));
        assert!(!compiled.matches("/r/my-name"));
    }

    #[test]
    fn test_leading_descendant() {
        let compiled = q("//:i");
        assert!(compiled.matches("/r/i"));
        assert!(compiled.matches("/r/a/b/i"));
        assert!(compiled.matches("/i"));
        assert!(!compiled.matches("/r/i/x"));
    }

    #[test]
    fn test_leading_child_of_any_root() {
        let compiled = q("/:code");
        assert!(compiled.matches("/entry/code"));
        assert!(compiled.matches("/line-item/code"));
        assert!(!compiled.matches("/code"));
        assert!(!compiled.matches("/entry/x/code"));
    }

    #[test]
    fn test_infix_operators() {
        assert!(q("/r/:x").matches("/r/x"));
        assert!(q("/r//:x").matches("/r/x"));
        assert!(q("/r//:x").matches("/r/a/b/x"));
        assert!(!q("/r//:x").matches("/x"));
        assert!(q("//:list/*/code").matches("/doc/list/entry/code"));
    }

    #[test]
    fn test_shortest_prefix() {
        let compiled = q("//:entry");
        assert_eq!(compiled.prefix_segments("/list/entry/code"), Some(2));
        assert_eq!(compiled.prefix_segments("/list/entry/x/entry"), Some(2));
        assert_eq!(compiled.prefix_segments("/list"), None);
    }

    #[test]
    fn test_malformed_queries() {
        for bad in ["", "r/x", "//x", "/", "/r/", "/r//:", "/:", "/r/:/x", "/a*", "/*b", "/a:b", "/a b"] {
            assert!(
                matches!(compile(bad), Err(Error::QueryCompilation { .. })),
                "expected {bad:?} to be rejected"
            );
        }
    }
}
