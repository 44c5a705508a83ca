//! Lexer for payoff expressions.
//!
//! Produces a flat token vector with byte spans into the source text. Only
//! the characters of the payoff grammar are accepted; anything else (quotes,
//! `=`, `;`, `:` and so on) is rejected here with the offending offset.

use pricer_core::types::PricingError;

/// Byte range of a token in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Token types.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Ident(String),

    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,

    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,

    EqEq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl TokenKind {
    /// Source-like rendering used in diagnostics.
    pub fn describe(&self) -> String {
        let text = match self {
            Self::Number(n) => return format!("number {n}"),
            Self::Ident(name) => return format!("name '{name}'"),
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Comma => ",",
            Self::Dot => ".",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::StarStar => "**",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::EqEq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        };
        format!("'{text}'")
    }
}

pub(crate) fn compile_error(message: impl Into<String>, position: usize) -> PricingError {
    PricingError::PayoffCompile {
        message: message.into(),
        position,
    }
}

/// Tokenize payoff source text.
pub fn tokenize(source: &str) -> Result<Vec<Token>, PricingError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let ch = bytes[pos];

        if ch.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;

        if ch.is_ascii_digit()
            || (ch == b'.' && pos + 1 < bytes.len() && bytes[pos + 1].is_ascii_digit())
        {
            let (value, end) = lex_number(source, pos)?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                span: Span::new(start, end),
            });
            pos = end;
            continue;
        }

        if ch.is_ascii_alphabetic() || ch == b'_' {
            let end = lex_ident_end(source, pos);
            tokens.push(Token {
                kind: TokenKind::Ident(source[pos..end].to_string()),
                span: Span::new(start, end),
            });
            pos = end;
            continue;
        }

        if pos + 1 < bytes.len() {
            let kind = match &bytes[pos..pos + 2] {
                b"**" => Some(TokenKind::StarStar),
                b"==" => Some(TokenKind::EqEq),
                b"!=" => Some(TokenKind::Ne),
                b"<=" => Some(TokenKind::Le),
                b">=" => Some(TokenKind::Ge),
                _ => None,
            };
            if let Some(kind) = kind {
                tokens.push(Token {
                    kind,
                    span: Span::new(start, pos + 2),
                });
                pos += 2;
                continue;
            }
        }

        let kind = match ch {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b'<' => TokenKind::Lt,
            b'>' => TokenKind::Gt,
            b'=' => return Err(compile_error("assignment is not supported", start)),
            _ => {
                let found = source[pos..].chars().next().unwrap_or('?');
                return Err(compile_error(
                    format!("unexpected character '{found}'"),
                    start,
                ));
            }
        };
        tokens.push(Token {
            kind,
            span: Span::new(start, pos + 1),
        });
        pos += 1;
    }

    Ok(tokens)
}

fn lex_number(source: &str, start: usize) -> Result<(f64, usize), PricingError> {
    let bytes = source.as_bytes();
    let mut pos = start;

    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }

    if pos < bytes.len() && bytes[pos] == b'.' {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
    }

    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        pos += 1;
        if pos < bytes.len() && (bytes[pos] == b'+' || bytes[pos] == b'-') {
            pos += 1;
        }
        let digits_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == digits_start {
            return Err(compile_error(
                format!("invalid number literal '{}'", &source[start..pos]),
                start,
            ));
        }
    }

    // `1abc` or `1_000`: a literal running straight into a name
    if pos < bytes.len() && (bytes[pos].is_ascii_alphabetic() || bytes[pos] == b'_') {
        let end = lex_ident_end(source, pos);
        return Err(compile_error(
            format!("invalid number literal '{}'", &source[start..end]),
            start,
        ));
    }

    let text = &source[start..pos];
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok((value, pos)),
        Ok(_) => Err(compile_error(
            format!("number literal '{text}' is out of range"),
            start,
        )),
        Err(_) => Err(compile_error(
            format!("invalid number literal '{text}'"),
            start,
        )),
    }
}

fn lex_ident_end(source: &str, start: usize) -> usize {
    let bytes = source.as_bytes();
    let mut pos = start;
    while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
        pos += 1;
    }
    pos
}
