//! Haskell token scanner.
//!
//! Qualified names are scanned as a single unit: `Data.List.foldr` becomes a
//! `Prefix` token for `Data.List.` followed by a `Lower` token for `foldr`.
//! The grammar layer decides whether a prefixed name is a module id or a
//! qualified occurrence.

use std::sync::Arc;

use smol_str::SmolStr;
use syntax::{TextRange, TextSize};

use crate::{ParseError, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Lowercase identifier, including the contextual `qualified`, `as`,
    /// `hiding`, `family` and `pattern`.
    Lower,
    /// Uppercase identifier, one segment without dots.
    Upper,
    /// Dotted module path including the trailing dot, e.g. `Data.List.`.
    Prefix,
    /// Symbolic operator that is not reserved.
    Operator,
    /// Reserved word.
    Keyword,
    /// `::`, `=`, `|`, `..`, and friends.
    ReservedOp,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,
    Backtick,
    /// Number, string, or character literal.
    Literal,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) text: SmolStr,
    pub(crate) range: TextRange,
    pub(crate) position: Position,
}

const KEYWORDS: &[&str] = &[
    "module", "where", "import", "data", "newtype", "type", "class", "instance", "deriving", "do",
    "case", "of", "let", "in", "if", "then", "else", "infix", "infixl", "infixr", "foreign",
];

const RESERVED_OPS: &[&str] = &["::", "=", "|", "\\", "<-", "->", "=>", "@", "~", ".."];

pub(crate) fn lex(source: &str) -> (Vec<Token>, Vec<ParseError>) {
    let mut lexer = Lexer::new(source);
    while !lexer.is_eof() {
        lexer.take_token();
    }
    lexer.finish()
}

struct Lexer<'s> {
    source: &'s str,
    offset: usize,
    line: u32,
    line_start: usize,
    tokens: Vec<Token>,
    errors: Vec<ParseError>,
}

impl<'s> Lexer<'s> {
    fn new(source: &'s str) -> Lexer<'s> {
        Lexer { source, offset: 0, line: 1, line_start: 0, tokens: Vec::new(), errors: Vec::new() }
    }

    fn is_eof(&self) -> bool {
        self.offset >= self.source.len()
    }

    fn finish(self) -> (Vec<Token>, Vec<ParseError>) {
        (self.tokens, self.errors)
    }

    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.offset).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.source.as_bytes().get(self.offset + ahead).copied()
    }

    fn position(&self) -> Position {
        Position { line: self.line, column: (self.offset - self.line_start + 1) as u32 }
    }

    fn error(&mut self, offset: usize, position: Position, message: &str) {
        self.errors.push(ParseError { offset, position, message: Arc::from(message) });
    }

    fn take_token(&mut self) {
        self.skip_trivia();
        let Some(byte) = self.peek() else {
            return;
        };
        match byte {
            b'(' => self.take_single(TokenKind::LeftParen),
            b')' => self.take_single(TokenKind::RightParen),
            b'[' => self.take_single(TokenKind::LeftBracket),
            b']' => self.take_single(TokenKind::RightBracket),
            b'{' => self.take_single(TokenKind::LeftBrace),
            b'}' => self.take_single(TokenKind::RightBrace),
            b',' => self.take_single(TokenKind::Comma),
            b';' => self.take_single(TokenKind::Semicolon),
            b'`' => self.take_single(TokenKind::Backtick),
            b'"' => self.take_string(),
            b'\'' => self.take_char(),
            b'0'..=b'9' => self.take_number(),
            byte if is_upper_start(byte) => self.take_upper_path(),
            byte if is_ident_start(byte) => self.take_lower(),
            byte if is_symbolic(byte) => self.take_operator(),
            _ => self.take_single(TokenKind::Unknown),
        }
    }

    fn take_single(&mut self, kind: TokenKind) {
        let start = self.offset;
        let position = self.position();
        self.advance_char();
        self.push(kind, start, position);
    }

    fn push(&mut self, kind: TokenKind, start: usize, position: Position) {
        let text = SmolStr::new(&self.source[start..self.offset]);
        let range = TextRange::new(TextSize::new(start as u32), TextSize::new(self.offset as u32));
        self.tokens.push(Token { kind, text, range, position });
    }

    fn advance_char(&mut self) {
        let mut chars = self.source[self.offset..].chars();
        if chars.next().is_some() {
            self.offset = self.source.len() - chars.as_str().len();
        }
    }

    fn eat_while(&mut self, predicate: impl Fn(u8) -> bool) {
        while let Some(byte) = self.peek() {
            if !predicate(byte) {
                break;
            }
            self.offset += 1;
        }
    }

    fn take_lower(&mut self) {
        let start = self.offset;
        let position = self.position();
        self.eat_while(is_ident_continue);
        let kind = if KEYWORDS.contains(&&self.source[start..self.offset]) {
            TokenKind::Keyword
        } else {
            TokenKind::Lower
        };
        self.push(kind, start, position);
    }

    /// `Data`, `Data.List`, `Data.List.foldr`, `M.:+:`; `M..` is `M` then `..`.
    fn take_upper_path(&mut self) {
        let start = self.offset;
        let position = self.position();
        let mut segment_start = self.offset;
        loop {
            self.eat_while(is_ident_continue);
            let continues = self.peek() == Some(b'.')
                && self.peek_at(1).is_some_and(|b| is_ident_start(b) || is_symbolic_non_dot(b));
            if !continues {
                break;
            }
            self.offset += 1;
            let dot_end = self.offset;
            segment_start = self.offset;
            let next = self.peek().expect("invariant violated: path dot at end of input");
            if is_upper_start(next) {
                continue;
            }
            // Final segment is a lowercase name or an operator.
            let prefix_position = position;
            self.push_prefix(start, dot_end, prefix_position);
            if is_ident_start(next) {
                self.take_lower();
            } else {
                self.take_operator();
            }
            return;
        }
        if segment_start == start {
            self.push(TokenKind::Upper, start, position);
        } else {
            let upper_start = segment_start;
            let end = self.offset;
            self.push_prefix(start, upper_start, position);
            self.offset = upper_start;
            let upper_position = self.position();
            self.offset = end;
            self.push(TokenKind::Upper, upper_start, upper_position);
        }
    }

    fn push_prefix(&mut self, start: usize, end: usize, position: Position) {
        let text = SmolStr::new(&self.source[start..end]);
        let range = TextRange::new(TextSize::new(start as u32), TextSize::new(end as u32));
        self.tokens.push(Token { kind: TokenKind::Prefix, text, range, position });
    }

    fn take_operator(&mut self) {
        let start = self.offset;
        let position = self.position();
        self.eat_while(is_symbolic);
        let kind = if RESERVED_OPS.contains(&&self.source[start..self.offset]) {
            TokenKind::ReservedOp
        } else {
            TokenKind::Operator
        };
        self.push(kind, start, position);
    }

    fn take_number(&mut self) {
        let start = self.offset;
        let position = self.position();
        self.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'\'');
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            self.offset += 1;
            self.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
        }
        self.push(TokenKind::Literal, start, position);
    }

    fn take_string(&mut self) {
        let start = self.offset;
        let position = self.position();
        self.offset += 1;
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    self.error(start, position, "unterminated string literal");
                    break;
                }
                Some(b'\\') => {
                    self.offset += 1;
                    self.advance_char();
                }
                Some(b'"') => {
                    self.offset += 1;
                    break;
                }
                Some(_) => self.advance_char(),
            }
        }
        self.push(TokenKind::Literal, start, position);
    }

    /// A character literal, or a stray quote when the shape does not match;
    /// identifier primes are consumed by the identifier scanners.
    fn take_char(&mut self) {
        let start = self.offset;
        let position = self.position();
        let well_formed = match self.peek_at(1) {
            Some(b'\\') => true,
            Some(b'\'') | None => false,
            Some(_) => {
                let mut chars = self.source[self.offset + 1..].chars();
                chars.next();
                chars.as_str().starts_with('\'')
            }
        };
        if !well_formed {
            self.offset += 1;
            self.push(TokenKind::Unknown, start, position);
            return;
        }
        self.offset += 1;
        if self.peek() == Some(b'\\') {
            self.offset += 1;
        }
        self.advance_char();
        if self.peek() == Some(b'\'') {
            self.offset += 1;
        } else {
            self.error(start, position, "unterminated character literal");
        }
        self.push(TokenKind::Literal, start, position);
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b'\n') => {
                    self.offset += 1;
                    self.line += 1;
                    self.line_start = self.offset;
                }
                Some(b' ') | Some(b'\t') | Some(b'\r') => self.offset += 1,
                Some(b'-') if self.line_comment_ahead() => {
                    self.eat_while(|b| b != b'\n');
                }
                Some(b'{') if self.peek_at(1) == Some(b'-') => self.skip_block_comment(),
                _ => break,
            }
        }
    }

    /// `--`, `---`, ... start a comment; `-->` is an operator.
    fn line_comment_ahead(&self) -> bool {
        if self.peek_at(1) != Some(b'-') {
            return false;
        }
        let mut ahead = 2;
        while let Some(byte) = self.peek_at(ahead) {
            if byte == b'-' {
                ahead += 1;
            } else {
                return !is_symbolic(byte);
            }
        }
        true
    }

    /// Nested `{- -}` comments; pragmas `{-# #-}` are skipped the same way.
    fn skip_block_comment(&mut self) {
        let start = self.offset;
        let position = self.position();
        self.offset += 2;
        let mut depth = 1usize;
        while depth > 0 {
            match self.peek() {
                None => {
                    self.error(start, position, "unterminated block comment");
                    return;
                }
                Some(b'\n') => {
                    self.offset += 1;
                    self.line += 1;
                    self.line_start = self.offset;
                }
                Some(b'{') if self.peek_at(1) == Some(b'-') => {
                    self.offset += 2;
                    depth += 1;
                }
                Some(b'-') if self.peek_at(1) == Some(b'}') => {
                    self.offset += 2;
                    depth -= 1;
                }
                Some(_) => self.advance_char(),
            }
        }
    }

}

fn is_upper_start(byte: u8) -> bool {
    byte.is_ascii_uppercase()
}

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte >= 0x80
}

fn is_ident_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'\'' || byte >= 0x80
}

fn is_symbolic(byte: u8) -> bool {
    matches!(
        byte,
        b'!' | b'#'
            | b'$'
            | b'%'
            | b'&'
            | b'*'
            | b'+'
            | b'.'
            | b'/'
            | b'<'
            | b'='
            | b'>'
            | b'?'
            | b'@'
            | b'\\'
            | b'^'
            | b'|'
            | b'~'
            | b':'
            | b'-'
    )
}

fn is_symbolic_non_dot(byte: u8) -> bool {
    byte != b'.' && is_symbolic(byte)
}
