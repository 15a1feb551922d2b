//! Unified Scanner with ScanHandler Trait
//!
//! Strict, single-pass XML scanner. It checks well-formedness (tag balance,
//! single root, markup syntax) itself, so handlers only ever observe a
//! balanced event stream and never need to fail.
//!
//! The scanner uses the memchr-based Scanner for byte searching.

use super::entities::decode_text;
use super::scanner::{is_name_start_char, is_xml_whitespace, Scanner};

/// Trait for handling scan events
///
/// Names are passed as they appear in the document (including any namespace
/// prefix); text is passed with entity references already decoded.
pub trait ScanHandler {
    /// Called when an element starts. Self-closing elements get an immediate
    /// matching `end_element`.
    fn start_element(&mut self, name: &str);

    /// Called when an element ends
    fn end_element(&mut self, name: &str);

    /// Called for character data inside the root element
    fn text(&mut self, text: &str);

    /// Called for CDATA sections; treated as text unless overridden
    fn cdata(&mut self, text: &str) {
        self.text(text);
    }

    /// Called for comments (optional, default does nothing)
    fn comment(&mut self, _content: &str) {}

    /// Called for processing instructions, including the XML declaration
    fn processing_instruction(&mut self, _target: &str, _data: Option<&str>) {}
}

/// Well-formedness failure with the byte offset where it was detected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    pub offset: usize,
    pub message: String,
}

impl ScanError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

impl From<ScanError> for crate::Error {
    fn from(err: ScanError) -> Self {
        crate::Error::parse(err.offset, err.message)
    }
}

type ScanResult<T = ()> = Result<T, ScanError>;

/// Unified scanner that uses ScanHandler for event dispatch
pub struct UnifiedScanner<'a, 's> {
    scanner: Scanner<'a>,
    /// Byte ranges of the currently open element names, reused across scans
    open: &'s mut Vec<(usize, usize)>,
    seen_root: bool,
}

impl<'a, 's> UnifiedScanner<'a, 's> {
    /// Create a scanner over `input`, borrowing a reusable element stack
    pub fn new(input: &'a str, open: &'s mut Vec<(usize, usize)>) -> Self {
        open.clear();
        Self {
            scanner: Scanner::new(input),
            open,
            seen_root: false,
        }
    }

    /// Scan the entire document, calling handler methods for each token
    pub fn scan<H: ScanHandler>(&mut self, handler: &mut H) -> ScanResult {
        while !self.scanner.is_eof() {
            match self.scanner.peek() {
                Some(b'<') => self.scan_markup(handler)?,
                Some(_) => self.scan_text(handler)?,
                None => break,
            }
        }

        if let Some(&(start, end)) = self.open.last() {
            return Err(ScanError::new(
                self.scanner.position(),
                format!("Unclosed tag: <{}>", self.scanner.slice(start, end)),
            ));
        }
        Ok(())
    }

    #[inline]
    fn in_root(&self) -> bool {
        !self.open.is_empty()
    }

    /// Scan markup starting with '<'
    fn scan_markup<H: ScanHandler>(&mut self, handler: &mut H) -> ScanResult {
        let start = self.scanner.position();
        self.scanner.advance(1);

        match self.scanner.peek() {
            Some(b'/') => {
                self.scanner.advance(1);
                self.scan_end_tag(start, handler)
            }
            Some(b'!') => {
                self.scanner.advance(1);
                if self.scanner.starts_with(b"--") {
                    self.scanner.advance(2);
                    self.scan_comment(start, handler)
                } else if self.scanner.starts_with(b"[CDATA[") {
                    self.scanner.advance(7);
                    self.scan_cdata(start, handler)
                } else if self.scanner.starts_with(b"DOCTYPE") {
                    self.scan_doctype(start)
                } else {
                    Err(ScanError::new(start, "Malformed markup declaration"))
                }
            }
            Some(b'?') => {
                self.scanner.advance(1);
                self.scan_pi(start, handler)
            }
            Some(c) if is_name_start_char(c) => self.scan_start_tag(start, handler),
            _ => Err(ScanError::new(start, "Invalid element name after '<'")),
        }
    }

    /// Scan a start tag; the cursor sits on the first name byte
    fn scan_start_tag<H: ScanHandler>(&mut self, start: usize, handler: &mut H) -> ScanResult {
        if self.seen_root && !self.in_root() {
            return Err(ScanError::new(start, "Document has multiple root elements"));
        }

        let (name_start, name_end) = self
            .scanner
            .read_name()
            .ok_or_else(|| ScanError::new(start, "Invalid element name"))?;

        loop {
            let had_space = self.skip_whitespace();
            match self.scanner.peek() {
                Some(b'>') => {
                    self.scanner.advance(1);
                    self.open_element(name_start, name_end, handler);
                    return Ok(());
                }
                Some(b'/') => {
                    if self.scanner.peek_at(1) != Some(b'>') {
                        return Err(ScanError::new(self.scanner.position(), "Expected '>' after '/'"));
                    }
                    self.scanner.advance(2);
                    self.open_element(name_start, name_end, handler);
                    self.close_element(handler);
                    return Ok(());
                }
                Some(c) if is_name_start_char(c) && had_space => self.skip_attribute()?,
                Some(_) => {
                    return Err(ScanError::new(
                        self.scanner.position(),
                        format!("Malformed start tag <{}>", self.scanner.slice(name_start, name_end)),
                    ))
                }
                None => return Err(ScanError::new(start, "Unterminated start tag")),
            }
        }
    }

    /// Validate and skip one `name = "value"` attribute
    fn skip_attribute(&mut self) -> ScanResult {
        let at = self.scanner.position();
        self.scanner
            .read_name()
            .ok_or_else(|| ScanError::new(at, "Invalid attribute name"))?;
        self.skip_whitespace();
        if self.scanner.peek() != Some(b'=') {
            return Err(ScanError::new(self.scanner.position(), "Expected '=' after attribute name"));
        }
        self.scanner.advance(1);
        self.skip_whitespace();

        let quote = match self.scanner.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => {
                return Err(ScanError::new(
                    self.scanner.position(),
                    "Attribute value must be quoted",
                ))
            }
        };
        self.scanner.advance(1);

        match self.scanner.find_byte2(quote, b'<') {
            Some(pos) if self.scanner.byte_at(pos) == Some(quote) => {
                self.scanner.set_position(pos + 1);
                Ok(())
            }
            Some(pos) => Err(ScanError::new(pos, "'<' not allowed in attribute value")),
            None => Err(ScanError::new(at, "Unterminated attribute value")),
        }
    }

    fn open_element<H: ScanHandler>(&mut self, start: usize, end: usize, handler: &mut H) {
        self.seen_root = true;
        self.open.push((start, end));
        handler.start_element(self.scanner.slice(start, end));
    }

    fn close_element<H: ScanHandler>(&mut self, handler: &mut H) {
        if let Some((start, end)) = self.open.pop() {
            handler.end_element(self.scanner.slice(start, end));
        }
    }

    /// Scan an end tag; the cursor sits after `</`
    fn scan_end_tag<H: ScanHandler>(&mut self, start: usize, handler: &mut H) -> ScanResult {
        let (name_start, name_end) = self
            .scanner
            .read_name()
            .ok_or_else(|| ScanError::new(start, "Invalid end tag name"))?;
        let name = self.scanner.slice(name_start, name_end);

        self.skip_whitespace();
        if self.scanner.peek() != Some(b'>') {
            return Err(ScanError::new(start, format!("Unterminated end tag </{name}>")));
        }
        self.scanner.advance(1);

        match self.open.last() {
            Some(&(open_start, open_end)) => {
                let open_name = self.scanner.slice(open_start, open_end);
                if open_name != name {
                    return Err(ScanError::new(
                        start,
                        format!("Tag mismatch: <{open_name}> closed with </{name}>"),
                    ));
                }
            }
            None => {
                return Err(ScanError::new(
                    start,
                    format!("Unexpected end tag: </{name}> without matching start tag"),
                ))
            }
        }

        self.close_element(handler);
        Ok(())
    }

    /// Scan character data up to the next '<'
    fn scan_text<H: ScanHandler>(&mut self, handler: &mut H) -> ScanResult {
        let start = self.scanner.position();
        let end = self.scanner.find_tag_start().unwrap_or(self.scanner.end());
        self.scanner.set_position(end);
        let raw = self.scanner.slice(start, end);

        if !self.in_root() {
            if raw.bytes().all(is_xml_whitespace) {
                return Ok(());
            }
            return Err(ScanError::new(start, "Text content not allowed at document level"));
        }

        let decoded = decode_text(raw).map_err(|msg| ScanError::new(start, msg))?;
        handler.text(&decoded);
        Ok(())
    }

    /// Scan a comment; the cursor sits after `<!--`
    fn scan_comment<H: ScanHandler>(&mut self, start: usize, handler: &mut H) -> ScanResult {
        let content_start = self.scanner.position();
        let end = self
            .scanner
            .find_sequence(b"-->")
            .ok_or_else(|| ScanError::new(start, "Unterminated comment"))?;
        handler.comment(self.scanner.slice(content_start, end));
        self.scanner.set_position(end + 3);
        Ok(())
    }

    /// Scan a CDATA section; the cursor sits after `<![CDATA[`
    fn scan_cdata<H: ScanHandler>(&mut self, start: usize, handler: &mut H) -> ScanResult {
        if !self.in_root() {
            return Err(ScanError::new(start, "CDATA section not allowed at document level"));
        }
        let content_start = self.scanner.position();
        let end = self
            .scanner
            .find_sequence(b"]]>")
            .ok_or_else(|| ScanError::new(start, "Unterminated CDATA section"))?;
        handler.cdata(self.scanner.slice(content_start, end));
        self.scanner.set_position(end + 3);
        Ok(())
    }

    /// Scan a processing instruction; the cursor sits after `<?`
    fn scan_pi<H: ScanHandler>(&mut self, start: usize, handler: &mut H) -> ScanResult {
        let (target_start, target_end) = self
            .scanner
            .read_name()
            .ok_or_else(|| ScanError::new(start, "Invalid processing instruction target"))?;
        self.skip_whitespace();
        let data_start = self.scanner.position();
        let end = self
            .scanner
            .find_sequence(b"?>")
            .ok_or_else(|| ScanError::new(start, "Unterminated processing instruction"))?;

        let data = (end > data_start).then(|| self.scanner.slice(data_start, end));
        handler.processing_instruction(self.scanner.slice(target_start, target_end), data);
        self.scanner.set_position(end + 2);
        Ok(())
    }

    /// Skip a DOCTYPE declaration, including an internal subset
    fn scan_doctype(&mut self, start: usize) -> ScanResult {
        if self.seen_root {
            return Err(ScanError::new(start, "DOCTYPE must come before root element"));
        }

        let mut depth = 0usize;
        while let Some(c) = self.scanner.peek() {
            self.scanner.advance(1);
            match c {
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(ScanError::new(start, "Unterminated DOCTYPE"))
    }

    /// Skip whitespace, reporting whether any was consumed
    fn skip_whitespace(&mut self) -> bool {
        let before = self.scanner.position();
        self.scanner.skip_whitespace();
        self.scanner.position() > before
    }
}
