//! # Scanner
//!
//! Turns the source buffer into a token stream. Whitespace is skipped; `//`
//! begins a line comment; `/*` begins a block comment (unclosed is fatal);
//! `"..."` is a string literal with C-style escapes; keywords and
//! multi-character punctuators are recognized by a longest-prefix check
//! against two fixed tables; everything else punctuation-shaped becomes a
//! single-character `Reserved` token. Unlike the teacher's assembler, which
//! collects errors from every stage and reports them together, this scanner
//! aborts on the very first diagnostic — the specification treats error
//! recovery as out of scope, so `tokenize` returns as soon as one bad byte
//! is seen rather than continuing to scan.

pub mod cursor;
pub mod token;

#[cfg(test)]
mod tests;

use crate::error::{Diagnostic, ErrorKind, Span};
use cursor::Cursor;
use token::{Token, TokenKind, KEYWORDS, PUNCTUATORS};

/// Scan `source` into a token stream terminated by one `Eof` token.
///
/// `source` must already satisfy the driver's buffer contract (ends with
/// `\n`); the scanner does not enforce that itself.
pub fn tokenize(source: &str) -> Result<Vec<Token>, Diagnostic> {
    let mut cursor = Cursor::new(source);
    let mut tokens = Vec::new();

    while let Some(tok) = lex_token(&mut cursor)? {
        tokens.push(tok);
    }

    let (b, l, c) = cursor.current_pos();
    tokens.push(Token { kind: TokenKind::Eof, lexeme: String::new(), span: Span::new(b, b, l, c) });

    Ok(tokens)
}

fn lex_token(cursor: &mut Cursor) -> Result<Option<Token>, Diagnostic> {
    loop {
        match cursor.peek() {
            Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') => {
                cursor.advance();
            }
            Some(b'/') if cursor.peek_at(1) == Some(b'/') => skip_line_comment(cursor),
            Some(b'/') if cursor.peek_at(1) == Some(b'*') => skip_block_comment(cursor)?,
            _ => break,
        }
    }

    if cursor.is_at_end() {
        return Ok(None);
    }

    let start = cursor.current_pos();
    let ch = cursor.peek().unwrap();

    if ch == b'"' {
        return lex_string(cursor, start).map(Some);
    }
    if ch.is_ascii_digit() {
        return Ok(Some(lex_number(cursor, start)));
    }
    if ch.is_ascii_alphabetic() || ch == b'_' {
        return Ok(Some(lex_word(cursor, start)));
    }

    if let Some(op) = PUNCTUATORS.iter().find(|op| cursor.rest().starts_with(**op)) {
        cursor.advance_n(op.len());
        return Ok(Some(Token { kind: TokenKind::Reserved, lexeme: (*op).to_string(), span: cursor.make_span(start) }));
    }
    if ch.is_ascii_punctuation() {
        cursor.advance();
        return Ok(Some(Token {
            kind: TokenKind::Reserved,
            lexeme: (ch as char).to_string(),
            span: cursor.make_span(start),
        }));
    }

    cursor.advance();
    Err(Diagnostic::new(
        ErrorKind::UnrecognizedByte,
        format!("could not tokenize byte '{}'", ch as char),
        cursor.make_span(start),
    ))
}

fn skip_line_comment(cursor: &mut Cursor) {
    while !matches!(cursor.peek(), None | Some(b'\n')) {
        cursor.advance();
    }
}

fn skip_block_comment(cursor: &mut Cursor) -> Result<(), Diagnostic> {
    let start = cursor.current_pos();
    cursor.advance_n(2); // consume "/*"
    loop {
        match cursor.peek() {
            None => {
                return Err(Diagnostic::new(
                    ErrorKind::UnterminatedComment,
                    "unterminated block comment",
                    cursor.make_span(start),
                ))
            }
            Some(b'*') if cursor.peek_at(1) == Some(b'/') => {
                cursor.advance_n(2);
                return Ok(());
            }
            _ => {
                cursor.advance();
            }
        }
    }
}

fn lex_number(cursor: &mut Cursor, start: (usize, usize, usize)) -> Token {
    let mut digits = String::new();
    while matches!(cursor.peek(), Some(b) if b.is_ascii_digit()) {
        digits.push(cursor.advance().unwrap() as char);
    }
    let value: i64 = digits.parse().expect("digit run is a valid integer");
    Token { kind: TokenKind::Number(value), lexeme: digits, span: cursor.make_span(start) }
}

/// Consumes a maximal run of identifier-continuation bytes and classifies
/// it against `KEYWORDS`. Scanning the whole identifier first and comparing
/// afterward is what gives us "a keyword match requires the following byte
/// to not be an identifier-continuation byte" for free: `intake` can never
/// be mistaken for `int` followed by `ake`.
fn lex_word(cursor: &mut Cursor, start: (usize, usize, usize)) -> Token {
    let mut word = String::new();
    while matches!(cursor.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
        word.push(cursor.advance().unwrap() as char);
    }
    let kind = if KEYWORDS.contains(&word.as_str()) { TokenKind::Reserved } else { TokenKind::Identifier };
    Token { kind, lexeme: word, span: cursor.make_span(start) }
}

/// Maximum size of a decoded string literal's buffer, terminator included.
/// A hard limit preserved from the compiler this specification descends
/// from; exceeding it is a fatal runtime/bounds error rather than a
/// silent truncation.
const MAX_STRING_LITERAL: usize = 1024;

fn lex_string(cursor: &mut Cursor, start: (usize, usize, usize)) -> Result<Token, Diagnostic> {
    cursor.advance(); // opening quote
    let mut raw = String::from("\"");
    let mut bytes = Vec::new();

    loop {
        match cursor.peek() {
            None | Some(b'\n') => {
                return Err(Diagnostic::new(
                    ErrorKind::UnterminatedString,
                    "unterminated string literal",
                    cursor.make_span(start),
                ))
            }
            Some(b'"') => {
                cursor.advance();
                raw.push('"');
                break;
            }
            Some(b'\\') => {
                cursor.advance();
                raw.push('\\');
                let esc = cursor.peek().ok_or_else(|| {
                    Diagnostic::new(ErrorKind::UnterminatedString, "unterminated string literal", cursor.make_span(start))
                })?;
                cursor.advance();
                raw.push(esc as char);
                bytes.push(decode_escape(esc));
            }
            Some(b) => {
                cursor.advance();
                raw.push(b as char);
                bytes.push(b);
            }
        }
    }

    bytes.push(0); // trailing zero byte, included in cont_len

    if bytes.len() > MAX_STRING_LITERAL {
        return Err(Diagnostic::new(
            ErrorKind::StringTooLarge,
            format!("string literal exceeds {MAX_STRING_LITERAL} bytes"),
            cursor.make_span(start),
        ));
    }

    Ok(Token { kind: TokenKind::String { bytes }, lexeme: raw, span: cursor.make_span(start) })
}

/// `\c` for any recognized escape `c`, and the character itself for any
/// other `c` (so `\q` decodes to `q`), per spec §4.1.
fn decode_escape(esc: u8) -> u8 {
    match esc {
        b'a' => 0x07,
        b'b' => 0x08,
        b't' => b'\t',
        b'n' => b'\n',
        b'v' => 0x0b,
        b'f' => 0x0c,
        b'r' => b'\r',
        b'e' => 0x1b,
        b'0' => 0,
        other => other,
    }
}
