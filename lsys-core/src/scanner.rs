//! Lexical scanner for L-system source code.
//!
//! Characters are grouped into classes; identifiers and numbers merge runs
//! of their class, punctuation is always a single token except for `->`.
//!
//! # Token production rules
//!
//! | Input                 | Token produced                    |
//! |-----------------------|-----------------------------------|
//! | `123`, `3.14`, `.5`   | `Number(value)`                   |
//! | `branch`, `x_1`       | `Ident("branch")`, `Ident("x_1")` |
//! | `->`                  | `Arrow`                           |
//! | `-`                   | `Minus`                           |
//! | `: ; , = ^ ( ) + * /` | one token each                    |
//! | `// comment`          | skipped to end of line            |
//! | anything else         | `InvalidCharacter` error, skipped |
//! | end of input          | `Eof`                             |

use crate::error::{CompilerError, ErrorKind};
use crate::token::{Span, Token, TokenKind};

// ---------------------------------------------------------------------------
// Character classes
// ---------------------------------------------------------------------------

const fn char_class(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => DIGIT,
        b'.' => PERIOD,
        b' ' | b'\t' | b'\r' | b'\n' | 0x0C => SPACE,
        b'A'..=b'Z' | b'a'..=b'z' | b'_' => LETTER,
        b'/' => SLASH,
        b'-' | b':' | b';' | b',' | b'=' | b'^' | b'(' | b')' | b'+' | b'*' => PUNCT,
        _ => INVALID,
    }
}

const DIGIT: u8 = 0;
const PERIOD: u8 = 1;
const SPACE: u8 = 2;
const LETTER: u8 = 3;
const SLASH: u8 = 4;
const PUNCT: u8 = 5;
const INVALID: u8 = 6;

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Lexical scanner for L-system source.
pub struct Scanner<'src> {
    /// Source bytes.
    src: &'src [u8],
    /// Current byte position.
    pos: usize,
    /// Accumulated errors (non-fatal).
    errors: Vec<CompilerError>,
}

impl<'src> Scanner<'src> {
    /// Create a new scanner over the given source string.
    #[must_use]
    pub const fn new(source: &'src str) -> Self {
        Self {
            src: source.as_bytes(),
            pos: 0,
            errors: Vec::new(),
        }
    }

    /// Scan the next token.
    pub fn next_token(&mut self) -> Token {
        let mut space_before = self.skip_whitespace_and_comments();
        loop {
            if self.pos >= self.src.len() {
                return Token {
                    kind: TokenKind::Eof,
                    span: Span::at(self.pos),
                    space_before,
                };
            }

            let start = self.pos;
            let c = self.src[self.pos];

            let kind = match char_class(c) {
                DIGIT => self.scan_number(),
                PERIOD => {
                    if self.peek_class(1) == Some(DIGIT) {
                        self.scan_number()
                    } else {
                        self.invalid_character(start);
                        space_before |= self.skip_whitespace_and_comments();
                        continue;
                    }
                }
                LETTER => self.scan_ident(),
                SLASH => {
                    self.pos += 1;
                    TokenKind::Slash
                }
                PUNCT => self.scan_punct(c),
                _ => {
                    self.invalid_character(start);
                    space_before |= self.skip_whitespace_and_comments();
                    continue;
                }
            };

            return Token {
                kind,
                span: Span::new(start, self.pos),
                space_before,
            };
        }
    }

    /// Scan all remaining tokens (including `Eof`).
    pub fn scan_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.kind.is_eof();
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Drain accumulated scan errors.
    pub fn take_errors(&mut self) -> Vec<CompilerError> {
        std::mem::take(&mut self.errors)
    }

    // -- internal helpers --

    fn peek_class(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied().map(char_class)
    }

    /// Skip whitespace and `//`-comments. Returns whether anything was
    /// skipped.
    fn skip_whitespace_and_comments(&mut self) -> bool {
        let start = self.pos;
        while self.pos < self.src.len() {
            let class = char_class(self.src[self.pos]);
            if class == SPACE {
                self.pos += 1;
            } else if class == SLASH && self.src.get(self.pos + 1) == Some(&b'/') {
                while self.pos < self.src.len() && self.src[self.pos] != b'\n' {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
        self.pos > start
    }

    /// Record an invalid character and skip it, including any UTF-8
    /// continuation bytes so spans stay on character boundaries.
    fn invalid_character(&mut self, start: usize) {
        self.pos += 1;
        while self.pos < self.src.len() && (self.src[self.pos] & 0xC0) == 0x80 {
            self.pos += 1;
        }
        let text = String::from_utf8_lossy(&self.src[start..self.pos]);
        self.errors.push(
            CompilerError::new(
                ErrorKind::InvalidCharacter,
                format!("Unexpected character '{text}'."),
            )
            .with_span(Span::new(start, self.pos)),
        );
    }

    /// Scan a number: `digits[.digits]` or `.digits`.
    fn scan_number(&mut self) -> TokenKind {
        let start = self.pos;
        while self.peek_class(0) == Some(DIGIT) {
            self.pos += 1;
        }
        if self.peek_class(0) == Some(PERIOD) && self.peek_class(1) == Some(DIGIT) {
            self.pos += 1;
            while self.peek_class(0) == Some(DIGIT) {
                self.pos += 1;
            }
        }

        // The slice is ASCII digits with at most one '.', so parsing succeeds.
        let value = std::str::from_utf8(&self.src[start..self.pos])
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);
        TokenKind::Number(value)
    }

    fn scan_ident(&mut self) -> TokenKind {
        let start = self.pos;
        while matches!(self.peek_class(0), Some(LETTER | DIGIT)) {
            self.pos += 1;
        }
        let text = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
        TokenKind::Ident(text)
    }

    fn scan_punct(&mut self, c: u8) -> TokenKind {
        self.pos += 1;
        match c {
            b'-' if self.src.get(self.pos) == Some(&b'>') => {
                self.pos += 1;
                TokenKind::Arrow
            }
            b'-' => TokenKind::Minus,
            b':' => TokenKind::Colon,
            b';' => TokenKind::Semicolon,
            b',' => TokenKind::Comma,
            b'=' => TokenKind::Equals,
            b'^' => TokenKind::Caret,
            b'(' => TokenKind::LeftParen,
            b')' => TokenKind::RightParen,
            b'+' => TokenKind::Plus,
            _ => TokenKind::Star,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &str) -> Vec<Token> {
        Scanner::new(input).scan_all()
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        scan(input).into_iter().map(|t| t.kind).collect()
    }

    fn ident(s: &str) -> TokenKind {
        TokenKind::Ident(s.into())
    }

    #[test]
    fn empty_input() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn whitespace_and_comments_only() {
        assert_eq!(kinds("  \n // hello -> world\n\t"), vec![TokenKind::Eof]);
    }

    #[test]
    fn production_statement() {
        assert_eq!(
            kinds("A -> B A;"),
            vec![
                ident("A"),
                TokenKind::Arrow,
                ident("B"),
                ident("A"),
                TokenKind::Semicolon,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("12 3.5 .25"),
            vec![
                TokenKind::Number(12.0),
                TokenKind::Number(3.5),
                TokenKind::Number(0.25),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn trailing_period_is_not_part_of_number() {
        let mut sc = Scanner::new("3.");
        let toks = sc.scan_all();
        assert_eq!(toks[0].kind, TokenKind::Number(3.0));
        assert_eq!(sc.take_errors().len(), 1);
    }

    #[test]
    fn minus_and_arrow() {
        assert_eq!(
            kinds("-1 -> -"),
            vec![
                TokenKind::Minus,
                TokenKind::Number(1.0),
                TokenKind::Arrow,
                TokenKind::Minus,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn division_is_not_a_comment() {
        assert_eq!(
            kinds("1/2 // tail"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Slash,
                TokenKind::Number(2.0),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn identifiers_with_digits_and_underscores() {
        assert_eq!(kinds("angle_1 x2"), vec![ident("angle_1"), ident("x2"), TokenKind::Eof]);
    }

    #[test]
    fn spans_are_byte_offsets() {
        let toks = scan("ab : 10");
        assert_eq!(toks[0].span, Span::new(0, 2));
        assert_eq!(toks[1].span, Span::new(3, 4));
        assert_eq!(toks[2].span, Span::new(5, 7));
        assert_eq!(toks[3].span, Span::at(7));
    }

    #[test]
    fn space_before_tracking() {
        let toks = scan("m 1 -2");
        assert!(!toks[0].space_before);
        assert!(toks[1].space_before);
        assert!(toks[2].space_before);
        assert!(!toks[3].space_before);
    }

    #[test]
    fn comment_counts_as_separation() {
        let toks = scan("a// c\nb");
        assert!(toks[1].space_before);
    }

    #[test]
    fn invalid_characters_are_reported_and_skipped() {
        let mut sc = Scanner::new("A $ é B");
        let toks = sc.scan_all();
        assert_eq!(
            toks.iter().map(|t| t.kind.clone()).collect::<Vec<_>>(),
            vec![ident("A"), ident("B"), TokenKind::Eof]
        );
        let errs = sc.take_errors();
        assert_eq!(errs.len(), 2);
        assert_eq!(errs[0].kind, ErrorKind::InvalidCharacter);
        assert_eq!(errs[1].span, Span::new(4, 6));
    }
}
