//! Byte cursor used by the script grammar and the pattern mini-parser.

use crate::error::{GrammarError, GrammarErrorKind};

/// Window `[pos, end)` over an input buffer.
///
/// The front moves forward as input is consumed; the back can be pulled in
/// with [`Cursor::shift`] to trim a split-off line.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            end: input.len(),
        }
    }

    /// Byte offset of the front within the whole input.
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.pos)
    }

    pub fn peek(&self) -> Option<u8> {
        (self.pos < self.end).then(|| self.input[self.pos])
    }

    /// Consume and return the next byte.
    pub fn advance(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Consume exactly `n` bytes or fail without moving.
    pub fn skip(&mut self, n: usize) -> Result<(), GrammarError> {
        if n > self.len() {
            return Err(self.error(GrammarErrorKind::UnexpectedEof));
        }
        self.pos += n;
        Ok(())
    }

    /// Consume `expected` or fail with the offending byte.
    pub fn expect(&mut self, expected: u8) -> Result<(), GrammarError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.error(GrammarErrorKind::UnexpectedChar {
                expected: expected as char,
                found: c as char,
            })),
            None => Err(self.error(GrammarErrorKind::UnexpectedEof)),
        }
    }

    /// Last byte of the window.
    pub fn last(&self) -> Option<u8> {
        (self.end > self.pos).then(|| self.input[self.end - 1])
    }

    /// Drop the last byte of the window and return it.
    pub fn shift(&mut self) -> Option<u8> {
        let c = self.last()?;
        self.end -= 1;
        Some(c)
    }

    /// The unconsumed window.
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..self.end]
    }

    /// Consume up to the next unescaped `;` or line break and return the
    /// consumed bytes as a window of their own. Offsets stay relative to the
    /// whole input.
    pub fn split_line(&mut self) -> Cursor<'a> {
        let start = self.pos;
        while let Some(c) = self.advance() {
            match c {
                b';' | b'\n' => {
                    self.pos -= 1;
                    break;
                }
                b'\\' => {
                    self.advance();
                }
                _ => {}
            }
        }
        Cursor {
            input: self.input,
            pos: start,
            end: self.pos,
        }
    }

    /// Input consumed since `start`.
    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        &self.input[start.min(self.pos)..self.pos]
    }

    pub fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    pub fn skip_whitespace(&mut self) {
        self.take_while(|c| c.is_ascii_whitespace());
    }

    /// Skip blanks without crossing a line break.
    pub fn skip_blanks(&mut self) {
        self.take_while(|c| matches!(c, b' ' | b'\t' | b'\r'));
    }

    /// Drop trailing whitespace unless it is escaped.
    pub fn trim_end(&mut self) {
        while self.last().is_some_and(|c| c.is_ascii_whitespace()) {
            if self.end >= self.pos + 2 && self.input[self.end - 2] == b'\\' {
                break;
            }
            self.shift();
        }
    }

    pub fn error(&self, kind: GrammarErrorKind) -> GrammarError {
        GrammarError::new(self.pos, kind)
    }
}
