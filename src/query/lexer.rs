//! Path Query Lexer
//!
//! Tokenizes path queries. The operator characters are `/`, `*` and `:`;
//! everything between operators is a literal element name.

/// Path query token types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'q> {
    Slash,      // /
    SlashColon, // /:
    Descendant, // //:
    Star,       // *
    Name(&'q str),
}

impl Token<'_> {
    /// True for the three separator operators
    pub fn is_separator(&self) -> bool {
        matches!(self, Token::Slash | Token::SlashColon | Token::Descendant)
    }
}

/// Lexer failure: byte offset within the query and a reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub offset: usize,
    pub reason: &'static str,
}

/// Path query lexer
pub struct Lexer<'q> {
    input: &'q str,
    pos: usize,
}

impl<'q> Lexer<'q> {
    pub fn new(input: &'q str) -> Self {
        Lexer { input, pos: 0 }
    }

    /// Tokenize the whole query
    pub fn tokenize(mut self) -> Result<Vec<Token<'q>>, LexError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn rest(&self) -> &'q [u8] {
        &self.input.as_bytes()[self.pos..]
    }

    fn error(&self, reason: &'static str) -> LexError {
        LexError {
            offset: self.pos,
            reason,
        }
    }

    /// Get the next token, or None at end of input
    pub fn next_token(&mut self) -> Result<Option<Token<'q>>, LexError> {
        let token = match self.rest() {
            [] => return Ok(None),
            [b'/', b'/', b':', ..] => {
                self.pos += 3;
                Token::Descendant
            }
            [b'/', b'/', ..] => return Err(self.error("'//' must be written '//:'")),
            [b'/', b':', ..] => {
                self.pos += 2;
                Token::SlashColon
            }
            [b'/', ..] => {
                self.pos += 1;
                Token::Slash
            }
            [b'*', ..] => {
                self.pos += 1;
                Token::Star
            }
            [b':', ..] => return Err(self.error("':' is only valid in '/:' or '//:'")),
            _ => self.read_name()?,
        };
        Ok(Some(token))
    }

    fn read_name(&mut self) -> Result<Token<'q>, LexError> {
        let start = self.pos;
        let len = self
            .rest()
            .iter()
            .position(|b| matches!(b, b'/' | b'*' | b':'))
            .unwrap_or(self.rest().len());
        let name = &self.input[start..start + len];

        if name.bytes().any(|b| !is_literal_byte(b)) {
            return Err(self.error("element names cannot contain whitespace or markup characters"));
        }
        self.pos += len;
        Ok(Token::Name(name))
    }
}

#[inline]
fn is_literal_byte(b: u8) -> bool {
    !(b.is_ascii_whitespace()
        || b.is_ascii_control()
        || matches!(b, b'<' | b'>' | b'&' | b'"' | b'\'' | b'=' | b'[' | b']' | b'@'))
}
