//! Filename wildcard patterns
//!
//! A pattern is a sequence of literal spans and `%[case][width]c` wildcards:
//!
//! | wildcard | expands to |
//! |----------|------------|
//! | `%e`     | extension (after the last `.`) |
//! | `%n`     | base name (before the last `.`) |
//! | `%N`     | per-pattern counter, zero-padded to `width` |
//! | `%.`     | a `.` if anything non-empty is appended after it |
//! | `%-`     | a `-` if something was already emitted |
//! | `%%`     | a literal `%` |
//!
//! `case` is `l` or `u` and lower- or upper-cases the substituted value.

use crate::error::PatternError;
use crate::script::Cursor;

/// Widest zero padding `%N` honours
pub const MAX_COUNTER_WIDTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Keep,
    Lower,
    Upper,
}

impl Case {
    fn apply(self, s: &[u8]) -> Vec<u8> {
        match self {
            Case::Keep => s.to_vec(),
            Case::Lower => s.to_ascii_lowercase(),
            Case::Upper => s.to_ascii_uppercase(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wildcard {
    Extension,
    Name,
    Counter,
    Dot,
    Dash,
    Percent,
}

impl Wildcard {
    fn from_byte(c: u8) -> Result<Self, PatternError> {
        Ok(match c {
            b'e' => Wildcard::Extension,
            b'n' => Wildcard::Name,
            b'N' => Wildcard::Counter,
            b'.' => Wildcard::Dot,
            b'-' => Wildcard::Dash,
            b'%' => Wildcard::Percent,
            other => return Err(PatternError::UnknownWildcard(other as char)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(Vec<u8>),
    Wildcard {
        case: Case,
        width: usize,
        wildcard: Wildcard,
    },
}

/// A parsed filename pattern with its own counter.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: Vec<u8>,
    tokens: Vec<Token>,
    counter: u64,
}

impl Pattern {
    pub fn parse(raw: &[u8]) -> Result<Self, PatternError> {
        let mut tokens = Vec::new();
        let mut cursor = Cursor::new(raw);
        while !cursor.is_empty() {
            let literal = cursor.take_while(|c| c != b'%');
            if !literal.is_empty() {
                tokens.push(Token::Literal(literal.to_vec()));
            }
            if cursor.advance().is_none() {
                break;
            }

            let case = match cursor.peek() {
                Some(b'l') => Case::Lower,
                Some(b'u') => Case::Upper,
                _ => Case::Keep,
            };
            if case != Case::Keep {
                cursor.advance();
            }

            let mut width: usize = 0;
            for digit in cursor.take_while(|c| c.is_ascii_digit()) {
                width = width
                    .checked_mul(10)
                    .and_then(|w| w.checked_add(usize::from(digit - b'0')))
                    .ok_or(PatternError::WidthOverflow)?;
            }

            let c = cursor.advance().ok_or(PatternError::TrailingPercent)?;
            tokens.push(Token::Wildcard {
                case,
                width,
                wildcard: Wildcard::from_byte(c)?,
            });
        }
        Ok(Pattern {
            raw: raw.to_vec(),
            tokens,
            counter: 0,
        })
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Expand the pattern for `name`. Every call advances the `%N` counter.
    pub fn expand(&mut self, name: &[u8]) -> Vec<u8> {
        self.counter += 1;
        let (base, ext) = split_name(name);
        let ext = ext.unwrap_or_default();

        let mut out = Expansion::default();
        for token in &self.tokens {
            match token {
                Token::Literal(s) => out.append(s),
                Token::Wildcard {
                    case,
                    width,
                    wildcard,
                } => match wildcard {
                    Wildcard::Extension => out.append(&case.apply(ext)),
                    Wildcard::Name => out.append(&case.apply(base)),
                    Wildcard::Counter => {
                        let width = (*width).min(MAX_COUNTER_WIDTH);
                        out.append(format!("{:0width$}", self.counter, width = width).as_bytes());
                    }
                    Wildcard::Dot => out.pending_dot = true,
                    Wildcard::Dash => {
                        if !out.buf.is_empty() {
                            out.append(b"-");
                        }
                    }
                    Wildcard::Percent => out.append(b"%"),
                },
            }
        }
        out.buf
    }
}

#[derive(Default)]
struct Expansion {
    buf: Vec<u8>,
    pending_dot: bool,
}

impl Expansion {
    fn append(&mut self, s: &[u8]) {
        if s.is_empty() {
            return;
        }
        if self.pending_dot {
            self.pending_dot = false;
            self.buf.push(b'.');
        }
        self.buf.extend_from_slice(s);
    }
}

/// Split `name` at its last `.` into base and extension.
///
/// A dot at position 0 (`.bashrc`) does not start an extension.
pub fn split_name(name: &[u8]) -> (&[u8], Option<&[u8]>) {
    match name.iter().rposition(|&b| b == b'.') {
        Some(pos) if pos > 0 => (&name[..pos], Some(&name[pos + 1..])),
        _ => (name, None),
    }
}

/// Insert a duplicate index into `name`: `a.txt` → `a_1.txt`, `abc` → `abc_1`.
pub fn with_duplicate_suffix(name: &[u8], index: u32) -> Vec<u8> {
    let suffix = format!("_{}", index);
    match split_name(name) {
        (base, Some(ext)) => {
            let mut out = Vec::with_capacity(name.len() + suffix.len());
            out.extend_from_slice(base);
            out.extend_from_slice(suffix.as_bytes());
            out.push(b'.');
            out.extend_from_slice(ext);
            out
        }
        (base, None) => {
            let mut out = base.to_vec();
            out.extend_from_slice(suffix.as_bytes());
            out
        }
    }
}
