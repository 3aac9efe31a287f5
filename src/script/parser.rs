//! Recursive-descent parser for rename scripts.
//!
//! Grammar:
//!
//! ```text
//! script      := dir_content
//! dir_content := command* entry*
//! command     := '$' word [argument] (';' | '\n')
//! entry       := name ( dir | file_ref )
//! dir         := '{' dir_content '}'
//! file_ref    := '#' inode_list terminator
//! inode_list  := digits ('|' digits)*
//! name        := quoted_string | bare_token
//! terminator  := ';' | '\n'
//! ```
//!
//! The parser owns no rename state. It reports what it reads to a
//! [`ScriptHandler`] and guarantees that every `enter_block` is followed by
//! exactly one `leave_block`, including when the block fails to parse.

use crate::error::{GrammarError, GrammarErrorKind, ScriptError};
use crate::escape::unescape;
use crate::pipeline::pattern::Pattern;
use crate::script::command::Command;
use crate::script::cursor::Cursor;
use crate::script::is_valid_name;
use crate::types::{DirChain, Inode};

/// Receiver of parse events
pub trait ScriptHandler {
    /// A block starts; `path` is the block's own path (empty for the root).
    fn enter_block(&mut self, path: &[Vec<u8>]);

    /// The most recently entered block ends. Always called, even on error.
    fn leave_block(&mut self);

    fn command(
        &mut self,
        path: &[Vec<u8>],
        command: Command,
        offset: usize,
    ) -> Result<(), ScriptError>;

    /// A directory entry was read; called before its block is entered.
    fn directory(&mut self, path: &[Vec<u8>], offset: usize) -> Result<(), ScriptError>;

    /// A file entry with its candidate inodes in preference order.
    fn file(&mut self, path: &[Vec<u8>], inodes: &[Inode], offset: usize)
        -> Result<(), ScriptError>;
}

/// Parse `input` and drive `handler` with its events.
///
/// The first grammar or handler error aborts the whole parse.
pub fn parse_script<H: ScriptHandler + ?Sized>(
    input: &[u8],
    handler: &mut H,
) -> Result<(), ScriptError> {
    let mut parser = Parser {
        cursor: Cursor::new(input),
        handler,
        path: Vec::new(),
    };
    parser.read_script()
}

struct Parser<'i, 'h, H: ?Sized> {
    cursor: Cursor<'i>,
    handler: &'h mut H,
    path: DirChain,
}

impl<H: ScriptHandler + ?Sized> Parser<'_, '_, H> {
    fn read_script(&mut self) -> Result<(), ScriptError> {
        self.read_block()?;
        match self.cursor.peek() {
            None => Ok(()),
            Some(b'}') => Err(self.cursor.error(GrammarErrorKind::StrayClose).into()),
            Some(c) => Err(self.cursor.error(GrammarErrorKind::Unexpected(c as char)).into()),
        }
    }

    /// Scope bracket around a block's content.
    fn read_block(&mut self) -> Result<(), ScriptError> {
        self.handler.enter_block(&self.path);
        let result = self.read_dir_content();
        self.handler.leave_block();
        result
    }

    fn read_dir_content(&mut self) -> Result<(), ScriptError> {
        let mut seen_entry = false;
        loop {
            self.cursor.skip_whitespace();
            match self.cursor.peek() {
                None | Some(b'}') => return Ok(()),
                Some(b'$') if seen_entry => {
                    return Err(self.cursor.error(GrammarErrorKind::CommandAfterEntry).into());
                }
                Some(b'$') => self.read_command()?,
                Some(_) => {
                    self.read_entry()?;
                    seen_entry = true;
                }
            }
        }
    }

    fn read_command(&mut self) -> Result<(), ScriptError> {
        let offset = self.cursor.offset();
        self.cursor.expect(b'$')?;
        self.cursor.skip_blanks();
        let word = self
            .cursor
            .take_while(|c| c.is_ascii_alphanumeric() || c == b'_');
        if word.is_empty() {
            return Err(self.unexpected().into());
        }
        let keyword = String::from_utf8_lossy(word).into_owned();
        self.cursor.skip_blanks();

        let argument_offset = self.cursor.offset();
        let argument = match self.cursor.peek() {
            None | Some(b';') | Some(b'\n') => None,
            Some(b'\'') => Some(self.read_literal()?),
            Some(_) => Some(self.read_argument()?),
        };
        self.cursor.skip_blanks();
        self.read_terminator()?;

        let command = match (word, argument) {
            (b"flatten", None) => Command::Flatten,
            (b"ascii", None) => Command::Ascii,
            (b"keepdups", None) => Command::KeepDuplicates,
            (b"pattern", Some(raw)) => {
                let pattern = Pattern::parse(&raw).map_err(|e| {
                    GrammarError::new(argument_offset, GrammarErrorKind::InvalidPattern(e))
                })?;
                Command::Pattern(pattern)
            }
            (b"pattern", None) => {
                return Err(GrammarError::new(offset, GrammarErrorKind::MissingArgument(keyword))
                    .into())
            }
            (b"flatten" | b"ascii" | b"keepdups", Some(_)) => {
                return Err(GrammarError::new(
                    argument_offset,
                    GrammarErrorKind::UnexpectedArgument(keyword),
                )
                .into())
            }
            _ => {
                return Err(GrammarError::new(offset, GrammarErrorKind::UnknownCommand(keyword))
                    .into())
            }
        };
        self.handler.command(&self.path, command, offset)
    }

    fn read_entry(&mut self) -> Result<(), ScriptError> {
        let offset = self.cursor.offset();
        let name = self.read_literal()?;
        if !is_valid_name(&name) {
            return Err(GrammarError::new(
                offset,
                GrammarErrorKind::InvalidName(String::from_utf8_lossy(&name).into_owned()),
            )
            .into());
        }
        self.cursor.skip_whitespace();

        self.path.push(name);
        let result = match self.cursor.peek() {
            Some(b'{') => self.read_dir(offset),
            Some(b'#') => self.read_file(offset),
            _ => Err(self.unexpected().into()),
        };
        self.path.pop();
        result
    }

    fn read_dir(&mut self, offset: usize) -> Result<(), ScriptError> {
        self.cursor.expect(b'{')?;
        self.handler.directory(&self.path, offset)?;
        self.read_block()?;
        match self.cursor.peek() {
            Some(b'}') => {
                self.cursor.advance();
                Ok(())
            }
            _ => Err(self.cursor.error(GrammarErrorKind::UnterminatedBlock).into()),
        }
    }

    fn read_file(&mut self, offset: usize) -> Result<(), ScriptError> {
        self.cursor.expect(b'#')?;
        let inodes = self.read_inodes()?;
        self.cursor.skip_blanks();
        // A closing brace may end the last entry of a one-line block.
        if self.cursor.peek() != Some(b'}') {
            self.read_terminator()?;
        }
        self.handler.file(&self.path, &inodes, offset)
    }

    fn read_inodes(&mut self) -> Result<Vec<Inode>, GrammarError> {
        let mut inodes = Vec::new();
        loop {
            let start = self.cursor.offset();
            let digits = self.cursor.take_while(|c| c.is_ascii_digit());
            let inode = std::str::from_utf8(digits)
                .ok()
                .and_then(|s| s.parse::<Inode>().ok())
                .ok_or_else(|| GrammarError::new(start, GrammarErrorKind::InvalidInode))?;
            inodes.push(inode);
            if self.cursor.peek() != Some(b'|') {
                return Ok(inodes);
            }
            self.cursor.advance();
        }
    }

    fn read_terminator(&mut self) -> Result<(), GrammarError> {
        match self.cursor.peek() {
            None => Ok(()),
            Some(b';') | Some(b'\n') => {
                self.cursor.advance();
                Ok(())
            }
            Some(_) => Err(self.unexpected()),
        }
    }

    /// Bare command argument: the rest of the statement without trailing
    /// blanks, so patterns may contain spaces.
    fn read_argument(&mut self) -> Result<Vec<u8>, GrammarError> {
        let start = self.cursor.offset();
        let mut line = self.cursor.split_line();
        line.trim_end();
        unescape(line.remaining())
            .map_err(|e| GrammarError::new(start, GrammarErrorKind::InvalidEscape(e)))
    }

    /// Read a quoted or bare literal and unescape it.
    fn read_literal(&mut self) -> Result<Vec<u8>, GrammarError> {
        let start = self.cursor.offset();
        if self.cursor.peek() == Some(b'\'') {
            self.cursor.advance();
            loop {
                match self.cursor.advance() {
                    None => {
                        return Err(GrammarError::new(start, GrammarErrorKind::UnterminatedQuote))
                    }
                    Some(b'\\') => self.cursor.skip(1)?,
                    Some(b'\'') => break,
                    Some(_) => {}
                }
            }
        } else {
            while let Some(c) = self.cursor.peek() {
                if c.is_ascii_whitespace() || matches!(c, b'{' | b'}' | b'#' | b';') {
                    break;
                }
                self.cursor.advance();
                if c == b'\\' {
                    self.cursor.skip(1)?;
                }
            }
        }
        unescape(self.cursor.slice_from(start))
            .map_err(|e| GrammarError::new(start, GrammarErrorKind::InvalidEscape(e)))
    }

    fn unexpected(&self) -> GrammarError {
        match self.cursor.peek() {
            Some(c) => self.cursor.error(GrammarErrorKind::Unexpected(c as char)),
            None => self.cursor.error(GrammarErrorKind::UnexpectedEof),
        }
    }
}
