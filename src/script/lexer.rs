use std::fmt;

use crate::script::error::{Span, SyntaxError};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    /// `-?[0-9]+(.[0-9]+)?`; `integer` is set when there is neither sign nor fraction.
    Number {
        value: f64,
        integer: bool,
    },
    /// A number immediately followed by the unit suffix `s`.
    Duration(f64),
    Str(String),

    LBrace,
    RBrace,
    LParen,
    RParen,
    Colon,
    Comma,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(s) => write!(f, "identifier `{s}`"),
            Self::Number { value, .. } => write!(f, "number `{value}`"),
            Self::Duration(v) => write!(f, "duration `{v}s`"),
            Self::Str(s) => write!(f, "string \"{s}\""),
            Self::LBrace => f.write_str("`{`"),
            Self::RBrace => f.write_str("`}`"),
            Self::LParen => f.write_str("`(`"),
            Self::RParen => f.write_str("`)`"),
            Self::Colon => f.write_str("`:`"),
            Self::Comma => f.write_str("`,`"),
            Self::Eof => f.write_str("end of input"),
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

pub(crate) fn lex(input: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut out = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let start = i;

        // Comments
        if b == b'/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }
        if b == b'/' && bytes.get(i + 1) == Some(&b'*') {
            i += 2;
            loop {
                if i + 1 >= bytes.len() {
                    return Err(SyntaxError::at(
                        input,
                        Span::new(start, start + 2),
                        "unterminated block comment",
                    ));
                }
                if bytes[i] == b'*' && bytes[i + 1] == b'/' {
                    i += 2;
                    break;
                }
                i += 1;
            }
            continue;
        }

        // Number / duration: -?[0-9]+(.[0-9]+)?s?
        if b.is_ascii_digit() || (b == b'-' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)) {
            let negative = b == b'-';
            if negative {
                i += 1;
            }
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let mut fractional = false;
            if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
                fractional = true;
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
            }

            let value: f64 = input[start..i]
                .parse()
                .map_err(|_| SyntaxError::at(input, Span::new(start, i), "invalid number"))?;
            if !value.is_finite() {
                return Err(SyntaxError::at(
                    input,
                    Span::new(start, i),
                    "number literal is out of range",
                ));
            }

            let is_duration = bytes.get(i) == Some(&b's')
                && !bytes.get(i + 1).copied().is_some_and(is_ident_continue);
            let kind = if is_duration {
                i += 1;
                TokenKind::Duration(value)
            } else {
                TokenKind::Number {
                    value,
                    integer: !negative && !fractional,
                }
            };
            out.push(Token {
                kind,
                span: Span::new(start, i),
            });
            continue;
        }

        // String: no escape sequences, may span lines.
        if b == b'"' {
            i += 1;
            let body_start = i;
            while i < bytes.len() && bytes[i] != b'"' {
                i += 1;
            }
            if i >= bytes.len() {
                return Err(SyntaxError::at(
                    input,
                    Span::new(start, start + 1),
                    "unterminated string literal",
                ));
            }
            let s = input[body_start..i].to_owned();
            i += 1;
            out.push(Token {
                kind: TokenKind::Str(s),
                span: Span::new(start, i),
            });
            continue;
        }

        if is_ident_start(b) {
            i += 1;
            while i < bytes.len() && is_ident_continue(bytes[i]) {
                i += 1;
            }
            out.push(Token {
                kind: TokenKind::Ident(input[start..i].to_owned()),
                span: Span::new(start, i),
            });
            continue;
        }

        let kind = match b {
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b':' => TokenKind::Colon,
            b',' => TokenKind::Comma,
            _ => {
                let c = input[start..].chars().next().unwrap_or('\u{fffd}');
                return Err(SyntaxError::at(
                    input,
                    Span::new(start, start + c.len_utf8()),
                    format!("unexpected character '{c}'"),
                ));
            }
        };
        i += 1;
        out.push(Token {
            kind,
            span: Span::new(start, i),
        });
    }

    out.push(Token {
        kind: TokenKind::Eof,
        span: Span::point(input.len()),
    });

    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/script/lexer.rs"]
mod tests;
