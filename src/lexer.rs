//! Lexical analysis.
//!
//! Keywords are recognized by hand-written, length-dispatched classifier
//! functions rather than a hash map — a direct rendering of the original
//! implementation's `classify2`..`classifyN` tables, which dispatch on
//! `lexeme.len()` before comparing characters.

use crate::ast::Span;
use crate::error::LexError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TokenKind {
    // Keywords
    If,
    Else,
    While,
    Break,
    Continue,
    Return,
    Def,
    Enum,
    KwInt,
    KwFloat,
    KwString,
    KwList,
    KwVoid,

    // Literals
    Number,
    StringLit,
    Identifier,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Dot,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    AndAnd,
    OrOr,
    Bang,

    Comment,
    Eof,
    Error,
}

impl TokenKind {
    /// True for the tokens the parser actually sees — comments are filtered
    /// out of the stream before it reaches grammar rules.
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Comment)
    }
}

/// Tokenizes a single source file, tracking line/column as it scans.
pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src: src.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.column = 1;
        } else if ch != b'\r' {
            self.column += 1;
        }
        Some(ch)
    }

    fn here(&self) -> Span {
        Span::new(self.pos as u32, self.pos as u32, self.line, self.column)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.advance();
                }
                _ => break,
            }
        }
    }

    /// Produces the next non-trivia token, or `Ok(Eof)` once the source is
    /// exhausted. Comment tokens are consumed and skipped internally, so
    /// callers never see `TokenKind::Comment`.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            self.skip_trivia();
            let start = self.here();
            let Some(ch) = self.peek() else {
                return Ok(Token::new(TokenKind::Eof, "", start));
            };

            if ch == b'/' && self.peek_at(1) == Some(b'/') {
                while !matches!(self.peek(), None | Some(b'\n')) {
                    self.advance();
                }
                continue;
            }

            if ch.is_ascii_alphabetic() || ch == b'_' {
                return Ok(self.scan_identifier(start));
            }
            if ch.is_ascii_digit() {
                return Ok(self.scan_number(start));
            }
            if ch == b'"' || ch == b'\'' {
                return self.scan_string(start, ch);
            }
            return self.scan_operator(start, ch);
        }
    }

    fn scan_identifier(&mut self, start: Span) -> Token {
        let begin = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
            self.advance();
        }
        let text = std::str::from_utf8(&self.src[begin..self.pos]).unwrap().to_string();
        let kind = classify_keyword(&text);
        Token::new(kind, text, start)
    }

    fn scan_number(&mut self, start: Span) -> Token {
        let begin = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = std::str::from_utf8(&self.src[begin..self.pos]).unwrap().to_string();
        Token::new(TokenKind::Number, text, start)
    }

    fn scan_string(&mut self, start: Span, quote: u8) -> Result<Token, LexError> {
        self.advance();
        let begin = self.pos;
        loop {
            match self.peek() {
                None => {
                    return Err(LexError::UnclosedStringLiteral { span: start });
                }
                Some(b'\n') => {
                    return Err(LexError::StrayNewlineInStringLiteral { span: start });
                }
                Some(c) if c == quote => {
                    let text = std::str::from_utf8(&self.src[begin..self.pos]).unwrap().to_string();
                    self.advance();
                    return Ok(Token::new(TokenKind::StringLit, text, start));
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn scan_operator(&mut self, start: Span, ch: u8) -> Result<Token, LexError> {
        let two = |first: u8, second: u8| self.peek() == Some(first) && self.peek_at(1) == Some(second);
        macro_rules! single {
            ($kind:expr) => {{
                self.advance();
                Ok(Token::new($kind, (ch as char).to_string(), start))
            }};
        }
        macro_rules! double {
            ($kind:expr) => {{
                self.advance();
                self.advance();
                Ok(Token::new($kind, format!("{}{}", ch as char, ch as char), start))
            }};
        }
        match ch {
            b'(' => single!(TokenKind::LParen),
            b')' => single!(TokenKind::RParen),
            b'{' => single!(TokenKind::LBrace),
            b'}' => single!(TokenKind::RBrace),
            b'[' => single!(TokenKind::LBracket),
            b']' => single!(TokenKind::RBracket),
            b',' => single!(TokenKind::Comma),
            b';' => single!(TokenKind::Semicolon),
            b':' => single!(TokenKind::Colon),
            b'.' => single!(TokenKind::Dot),
            b'+' => single!(TokenKind::Plus),
            b'-' => single!(TokenKind::Minus),
            b'*' => single!(TokenKind::Star),
            b'/' => single!(TokenKind::Slash),
            b'%' => single!(TokenKind::Percent),
            b'!' => {
                if two(b'!', b'=') {
                    self.advance();
                    self.advance();
                    Ok(Token::new(TokenKind::Ne, "!=", start))
                } else {
                    single!(TokenKind::Bang)
                }
            }
            b'=' => {
                if two(b'=', b'=') {
                    self.advance();
                    self.advance();
                    Ok(Token::new(TokenKind::Eq, "==", start))
                } else {
                    single!(TokenKind::Assign)
                }
            }
            b'<' => {
                if two(b'<', b'=') {
                    self.advance();
                    self.advance();
                    Ok(Token::new(TokenKind::Le, "<=", start))
                } else {
                    single!(TokenKind::Lt)
                }
            }
            b'>' => {
                if two(b'>', b'=') {
                    self.advance();
                    self.advance();
                    Ok(Token::new(TokenKind::Ge, ">=", start))
                } else {
                    single!(TokenKind::Gt)
                }
            }
            b'&' => {
                if two(b'&', b'&') {
                    double!(TokenKind::AndAnd)
                } else {
                    self.advance();
                    Err(LexError::IllegalSymbol { ch: '&', span: start })
                }
            }
            b'|' => {
                if two(b'|', b'|') {
                    double!(TokenKind::OrOr)
                } else {
                    self.advance();
                    Err(LexError::IllegalSymbol { ch: '|', span: start })
                }
            }
            other => {
                self.advance();
                Err(LexError::IllegalSymbol {
                    ch: other as char,
                    span: start,
                })
            }
        }
    }
}

/// Dispatches on `text.len()` before comparing characters, the same shape as
/// the original `classify2`..`classify8` functions.
fn classify_keyword(text: &str) -> TokenKind {
    let b = text.as_bytes();
    match b.len() {
        2 => {
            if b == b"if" {
                return TokenKind::If;
            }
        }
        3 => {
            if b == b"def" {
                return TokenKind::Def;
            }
            if b == b"int" {
                return TokenKind::KwInt;
            }
        }
        4 => {
            if b == b"else" {
                return TokenKind::Else;
            }
            if b == b"enum" {
                return TokenKind::Enum;
            }
            if b == b"void" {
                return TokenKind::KwVoid;
            }
            if b == b"list" {
                return TokenKind::KwList;
            }
        }
        5 => {
            if b == b"while" {
                return TokenKind::While;
            }
            if b == b"break" {
                return TokenKind::Break;
            }
            if b == b"float" {
                return TokenKind::KwFloat;
            }
        }
        6 => {
            if b == b"string" {
                return TokenKind::KwString;
            }
            if b == b"return" {
                return TokenKind::Return;
            }
        }
        8 => {
            if b == b"continue" {
                return TokenKind::Continue;
            }
        }
        _ => {}
    }
    TokenKind::Identifier
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().expect("lex ok");
            let eof = tok.is_eof();
            out.push(tok.kind);
            if eof {
                break;
            }
        }
        out
    }

    #[test]
    fn stream_ends_with_exactly_one_eof() {
        let ks = kinds("int x: 1;");
        assert_eq!(ks.last(), Some(&TokenKind::Eof));
        assert_eq!(ks.iter().filter(|k| **k == TokenKind::Eof).count(), 1);
    }

    #[test]
    fn classifies_keywords_not_prefixes() {
        assert_eq!(kinds("int")[0], TokenKind::KwInt);
        assert_eq!(kinds("integer")[0], TokenKind::Identifier);
    }

    #[test]
    fn comments_are_filtered_before_reaching_kinds() {
        let ks = kinds("// a comment\nint");
        assert_eq!(ks[0], TokenKind::KwInt);
    }

    #[test]
    fn two_char_operators_require_the_pair() {
        assert_eq!(kinds("&&")[0], TokenKind::AndAnd);
        let mut lexer = Lexer::new("&x");
        assert!(matches!(lexer.next_token(), Err(LexError::IllegalSymbol { ch: '&', .. })));
    }

    #[test]
    fn unclosed_string_is_an_error() {
        let mut lexer = Lexer::new("\"abc");
        assert!(matches!(lexer.next_token(), Err(LexError::UnclosedStringLiteral { .. })));
    }

    #[test]
    fn newline_inside_string_is_an_error() {
        let mut lexer = Lexer::new("\"abc\ndef\"");
        assert!(matches!(
            lexer.next_token(),
            Err(LexError::StrayNewlineInStringLiteral { .. })
        ));
    }

    #[test]
    fn number_literal_has_optional_fraction() {
        assert_eq!(kinds("3")[0], TokenKind::Number);
        let mut lexer = Lexer::new("3.14");
        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.lexeme, "3.14");
    }
}
