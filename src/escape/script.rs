//! Script literal dialect.
//!
//! Printable ASCII is kept as is, `\\`, newline and tab use C-style escapes,
//! everything else becomes `\xHH`. Names may additionally be wrapped in single
//! quotes so that the script grammar can carry whitespace and its own
//! punctuation inside a name.

use crate::error::EscapeError;

/// Bytes that force quoting in [`escape_quoted`]
const QUOTE_TRIGGERS: &[u8] = b" \t\n\r\x0b\x0c*&'{}#;$|";

/// Escape raw bytes without quoting.
///
/// A leading `'` is written as `\'` so the output is never mistaken for a
/// quoted literal by [`unescape`].
pub fn escape(s: &[u8]) -> String {
    escape_bytes(s, false)
}

/// Escape raw bytes and wrap the result in single quotes when the name contains
/// whitespace or characters the script grammar gives a meaning to.
pub fn escape_quoted(s: &[u8]) -> String {
    if !needs_quotes(s) {
        return escape_bytes(s, false);
    }
    format!("'{}'", escape_bytes(s, true))
}

/// Whether [`escape_quoted`] would quote `s`.
pub fn needs_quotes(s: &[u8]) -> bool {
    s.is_empty() || s.iter().any(|b| QUOTE_TRIGGERS.contains(b))
}

fn escape_bytes(s: &[u8], quoted: bool) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for (i, &b) in s.iter().enumerate() {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            b'\'' if quoted || i == 0 => out.push_str("\\'"),
            0x20..=0x7e => out.push(b as char),
            _ => {
                out.push_str("\\x");
                out.push_str(&hex::encode_upper([b]));
            }
        }
    }
    out
}

/// Inverse of [`escape`] and [`escape_quoted`].
///
/// One layer of enclosing single quotes is stripped. Unknown escapes such as
/// `\'` or `\{` stand for the escaped byte itself.
pub fn unescape(s: &[u8]) -> Result<Vec<u8>, EscapeError> {
    let quoted = s.len() >= 2 && s[0] == b'\'' && s[s.len() - 1] == b'\'';
    let (body, base) = if quoted {
        (&s[1..s.len() - 1], 1)
    } else {
        (s, 0)
    };

    let mut out = Vec::with_capacity(body.len());
    let mut i = 0;
    while i < body.len() {
        let b = body[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }
        let next = *body.get(i + 1).ok_or(EscapeError::TrailingBackslash)?;
        match next {
            b'n' => out.push(b'\n'),
            b't' => out.push(b'\t'),
            b'x' => {
                let mut byte = [0u8; 1];
                body.get(i + 2..i + 4)
                    .and_then(|pair| hex::decode_to_slice(pair, &mut byte).ok())
                    .ok_or(EscapeError::InvalidHexEscape { offset: base + i })?;
                out.push(byte[0]);
                i += 4;
                continue;
            }
            other => out.push(other),
        }
        i += 2;
    }
    Ok(out)
}
