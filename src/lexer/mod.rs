//! # Lexer
//!
//! Converts SimpleCPU16 assembly source text into a flat token stream.
//!
//! The lexer processes the whole source document line by line, recognizing
//! the tokens described in spec.md §4.2 — registers, numeric/char/string
//! literals, punctuation, directives, mnemonics, label definitions, and bare
//! words treated as unresolved symbolic references. A `Newline` token
//! terminates every source line so the parser can later split the flat
//! stream back into per-line slices; an `Eof` token terminates the stream.

pub mod cursor;
pub mod token;

use crate::error::{AsmError, ErrorKind, Span};
use cursor::Cursor;
use token::{parse_directive, parse_mnemonic, parse_register_name, Token, TokenKind};

/// Source lines longer than this are truncated, per spec.md §7.
const MAX_LINE_LENGTH: usize = 256;
/// Token lexemes longer than this are truncated, per spec.md §7.
const MAX_TOKEN_LENGTH: usize = 128;

pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<AsmError>,
}

pub fn tokenize(source: &str) -> LexResult {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut line_count = 0;

    for (idx, raw_line) in source.lines().enumerate() {
        let line_number = idx + 1;
        line_count = line_number;

        let line: &str = if raw_line.len() > MAX_LINE_LENGTH {
            errors.push(AsmError {
                kind: ErrorKind::StringTooLong,
                message: format!("line exceeds {} characters, truncating", MAX_LINE_LENGTH),
                span: Span { start: 0, end: 0, line: line_number, col: 1 },
            });
            &raw_line[..MAX_LINE_LENGTH]
        } else {
            raw_line
        };

        lex_line(line, line_number, &mut tokens, &mut errors);
        tokens.push(Token {
            kind: TokenKind::Newline,
            lexeme: "\n".to_string(),
            span: Span { start: 0, end: 0, line: line_number, col: line.len() + 1 },
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        lexeme: String::new(),
        span: Span { start: 0, end: 0, line: line_count + 1, col: 1 },
    });

    LexResult { tokens, errors }
}

fn lex_line(line: &str, line_number: usize, tokens: &mut Vec<Token>, errors: &mut Vec<AsmError>) {
    let mut cursor = Cursor::new(line);
    while !cursor.is_at_end() {
        let (_, start_col) = cursor.current_pos();
        let start_pos = cursor.byte_pos();
        if let Some(tok) = lex_one(&mut cursor, line_number, start_pos, start_col, errors) {
            tokens.push(tok);
        }
    }
}

fn span_from(cursor: &Cursor, line: usize, start_pos: usize, start_col: usize) -> Span {
    cursor.make_span(start_pos, line, start_col)
}

fn make_token(kind: TokenKind, lexeme: &str, span: Span) -> Token {
    Token { kind, lexeme: lexeme.to_string(), span }
}

fn is_delimiter(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | ',' | '[' | ']' | ';' | '"' | '\'')
}

fn lex_one(
    cursor: &mut Cursor,
    line: usize,
    start_pos: usize,
    start_col: usize,
    errors: &mut Vec<AsmError>,
) -> Option<Token> {
    let c = cursor.peek()?;

    match c {
        ' ' | '\t' | '\r' => {
            cursor.advance();
            None
        }
        ';' => {
            while cursor.peek().is_some() {
                cursor.advance();
            }
            None
        }
        ',' => {
            cursor.advance();
            Some(make_token(TokenKind::Comma, ",", span_from(cursor, line, start_pos, start_col)))
        }
        '[' => {
            cursor.advance();
            Some(make_token(TokenKind::LBracket, "[", span_from(cursor, line, start_pos, start_col)))
        }
        ']' => {
            cursor.advance();
            Some(make_token(TokenKind::RBracket, "]", span_from(cursor, line, start_pos, start_col)))
        }
        '"' => lex_string(cursor, line, start_pos, start_col, errors),
        '\'' => lex_char(cursor, line, start_pos, start_col, errors),
        c if c.is_ascii_digit() || c == '-' => lex_number(cursor, line, start_pos, start_col, errors),
        _ => lex_word(cursor, line, start_pos, start_col, errors),
    }
}

/// `"..."`, no escape sequences interpreted (spec.md §4.2).
fn lex_string(
    cursor: &mut Cursor,
    line: usize,
    start_pos: usize,
    start_col: usize,
    errors: &mut Vec<AsmError>,
) -> Option<Token> {
    cursor.advance(); // opening quote
    let mut value = String::new();
    loop {
        match cursor.peek() {
            Some('"') => {
                cursor.advance();
                return Some(make_token(
                    TokenKind::StringLiteral(value),
                    "",
                    span_from(cursor, line, start_pos, start_col),
                ));
            }
            Some(c) => {
                value.push(c);
                cursor.advance();
            }
            None => {
                errors.push(AsmError {
                    kind: ErrorKind::UnterminatedString,
                    message: "unterminated string literal".to_string(),
                    span: span_from(cursor, line, start_pos, start_col),
                });
                return None;
            }
        }
    }
}

/// `'c'` — character code of `c`. No escape sequences.
fn lex_char(
    cursor: &mut Cursor,
    line: usize,
    start_pos: usize,
    start_col: usize,
    errors: &mut Vec<AsmError>,
) -> Option<Token> {
    cursor.advance(); // opening quote
    let ch = match cursor.peek() {
        Some(c) => c,
        None => {
            errors.push(AsmError {
                kind: ErrorKind::InvalidCharLiteral,
                message: "unterminated character literal".to_string(),
                span: span_from(cursor, line, start_pos, start_col),
            });
            return None;
        }
    };
    cursor.advance();
    match cursor.peek() {
        Some('\'') => {
            cursor.advance();
            Some(make_token(
                TokenKind::NumChar(ch as i32),
                "",
                span_from(cursor, line, start_pos, start_col),
            ))
        }
        _ => {
            errors.push(AsmError {
                kind: ErrorKind::InvalidCharLiteral,
                message: "character literal must be exactly one character between quotes".to_string(),
                span: span_from(cursor, line, start_pos, start_col),
            });
            None
        }
    }
}

/// `0x…`/`0X…` hex, otherwise signed decimal.
fn lex_number(
    cursor: &mut Cursor,
    line: usize,
    start_pos: usize,
    start_col: usize,
    errors: &mut Vec<AsmError>,
) -> Option<Token> {
    let mut text = String::new();
    if cursor.peek() == Some('-') {
        text.push('-');
        cursor.advance();
    }
    while let Some(c) = cursor.peek() {
        if is_delimiter(c) {
            break;
        }
        text.push(c);
        cursor.advance();
    }

    let span = span_from(cursor, line, start_pos, start_col);
    let lower = text.to_ascii_lowercase();

    if let Some(digits) = lower.strip_prefix("0x").or_else(|| lower.strip_prefix("-0x")) {
        let neg = lower.starts_with('-');
        return match u32::from_str_radix(digits, 16) {
            Ok(v) => {
                let v = if neg { -(v as i64) } else { v as i64 };
                Some(make_token(TokenKind::NumHex(v as i32), &text, span))
            }
            Err(_) => {
                errors.push(AsmError {
                    kind: ErrorKind::InvalidHexLiteral,
                    message: format!("invalid hexadecimal literal: {}", text),
                    span,
                });
                None
            }
        };
    }

    match text.parse::<i32>() {
        Ok(v) => Some(make_token(TokenKind::NumDecimal(v), &text, span)),
        Err(_) => {
            errors.push(AsmError {
                kind: ErrorKind::InvalidDecimalLiteral,
                message: format!("invalid decimal literal: {}", text),
                span,
            });
            None
        }
    }
}

/// Maximal run of non-whitespace, non-delimiter characters, classified per
/// spec.md §4.2: label definition, directive, register, mnemonic, or a bare
/// word treated as an unresolved symbolic reference.
fn lex_word(
    cursor: &mut Cursor,
    line: usize,
    start_pos: usize,
    start_col: usize,
    errors: &mut Vec<AsmError>,
) -> Option<Token> {
    let mut text = String::new();
    while let Some(c) = cursor.peek() {
        if is_delimiter(c) {
            break;
        }
        text.push(c);
        cursor.advance();
    }

    let span = span_from(cursor, line, start_pos, start_col);

    let text = if text.len() > MAX_TOKEN_LENGTH {
        errors.push(AsmError {
            kind: ErrorKind::TokenTooLong,
            message: format!("token exceeds {} characters, truncating", MAX_TOKEN_LENGTH),
            span,
        });
        text.chars().take(MAX_TOKEN_LENGTH).collect()
    } else {
        text
    };

    match classify_word(&text, span) {
        Ok(tok) => Some(tok),
        Err(e) => {
            errors.push(e);
            None
        }
    }
}

fn classify_word(text: &str, span: Span) -> Result<Token, AsmError> {
    if let Some(name) = text.strip_suffix(':') {
        return Ok(make_token(TokenKind::LabelDef(name.to_string()), text, span));
    }
    if text.starts_with('.') {
        return match parse_directive(text) {
            Some(kind) => Ok(make_token(kind, text, span)),
            None => Err(AsmError {
                kind: ErrorKind::UnknownDirective,
                message: format!("unknown directive: {}", text),
                span,
            }),
        };
    }
    if let Some(reg) = parse_register_name(text) {
        return Ok(make_token(TokenKind::Register(reg), text, span));
    }
    if let Some(kind) = parse_mnemonic(text) {
        return Ok(make_token(kind, text, span));
    }
    Ok(make_token(TokenKind::Word(text.to_string()), text, span))
}
