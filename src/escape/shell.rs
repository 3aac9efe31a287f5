//! Shell dialect.
//!
//! Soft escaping produces readable POSIX shell words for well-formed UTF-8
//! without control characters. Hardened escaping falls back to a `printf`
//! octal dump that can carry any byte sequence.

use crate::error::EscapeError;
use std::fmt::Write;

/// Escape `s` as a single POSIX shell word.
///
/// With `hardened == false`, invalid UTF-8 and control characters (C0, DEL
/// and C1) are rejected. With `hardened == true` the call never fails: the soft
/// form is used when possible, the `printf` form otherwise.
pub fn shell_escape(s: &[u8], hardened: bool) -> Result<String, EscapeError> {
    match soft_escape(s) {
        Ok(escaped) => Ok(escaped),
        Err(_) if hardened => Ok(hard_escape(s)),
        Err(err) => Err(err),
    }
}

fn soft_escape(s: &[u8]) -> Result<String, EscapeError> {
    let text = std::str::from_utf8(s).map_err(|e| EscapeError::InvalidUtf8 {
        offset: e.valid_up_to(),
    })?;

    let mut body = String::with_capacity(text.len() + 2);
    let mut quote = text.is_empty();
    for ch in text.chars() {
        if ch.is_control() {
            return Err(EscapeError::ControlCharacter { code: ch as u32 });
        }
        match ch {
            '"' | '$' | '`' | '\\' => {
                body.push('\\');
                body.push(ch);
            }
            _ => {
                quote |= needs_quoting(ch);
                body.push(ch);
            }
        }
    }

    if quote {
        Ok(format!("\"{}\"", body))
    } else {
        Ok(body)
    }
}

fn needs_quoting(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '&'
            | '\''
            | ';'
            | '|'
            | '<'
            | '>'
            | '('
            | ')'
            | '*'
            | '?'
            | '['
            | ']'
            | '#'
            | '~'
            | '{'
            | '}'
            | '!'
            | '='
    )
}

/// Variable that hardened words use for newlines at the end of a name
pub const NEWLINE_VAR: &str = "relink_nl";

/// Line defining [`NEWLINE_VAR`]. Output containing hardened words must run it
/// before the first of them.
pub const HARDENED_PREAMBLE: &str =
    "relink_nl=\"$(printf '\\nx')\"; relink_nl=\"${relink_nl%x}\"";

/// Render arbitrary bytes as `"$(printf '\NNN...')"`.
///
/// Command substitution drops trailing newlines, so those are appended as
/// `${relink_nl}` expansions instead of being part of the `printf` dump.
pub fn hard_escape(s: &[u8]) -> String {
    let body_len = s.iter().rposition(|&b| b != b'\n').map_or(0, |i| i + 1);
    let (body, newlines) = s.split_at(body_len);

    let mut out = String::with_capacity(s.len() * 4 + 16);
    out.push('"');
    if !body.is_empty() {
        out.push_str("$(printf '");
        for b in body {
            let _ = write!(out, "\\{:03o}", b);
        }
        out.push_str("')");
    }
    for _ in newlines {
        let _ = write!(out, "${{{}}}", NEWLINE_VAR);
    }
    out.push('"');
    out
}

/// Inverse of soft [`shell_escape`]; does not understand the hardened form.
pub fn shell_unescape(s: &str) -> Result<Vec<u8>, EscapeError> {
    let body = if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    };

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            out.push(chars.next().ok_or(EscapeError::TrailingBackslash)?);
        } else {
            out.push(ch);
        }
    }
    Ok(out.into_bytes())
}
