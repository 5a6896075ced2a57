//! Command line tokenizer
//!
//! Tokens are located lazily as (offset, length) views into the line.
//! Nothing is copied; index 0 is the first token after the command name.

/// A parameter located inside a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Byte offset of the first character
    pub offset: usize,
    /// Length in bytes
    pub len: usize,
}

impl Token {
    /// Resolve the token against the line it was produced from.
    pub fn slice<'a>(&self, line: &'a str) -> &'a str {
        line.get(self.offset..self.offset + self.len).unwrap_or("")
    }
}

/// Token separators: space and tab.
#[inline]
fn is_separator(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Locate the token at absolute position `n` (0 = command name).
fn nth_token(line: &str, n: usize) -> Option<Token> {
    let bytes = line.as_bytes();
    let mut pos = 0;
    let mut found = 0;

    loop {
        while pos < bytes.len() && is_separator(bytes[pos]) {
            pos += 1;
        }
        if pos == bytes.len() {
            return None;
        }

        let start = pos;
        while pos < bytes.len() && !is_separator(bytes[pos]) {
            pos += 1;
        }

        if found == n {
            return Some(Token {
                offset: start,
                len: pos - start,
            });
        }
        found += 1;
    }
}

/// Leading token of the line (empty if the line is blank).
pub fn command_name(line: &str) -> &str {
    nth_token(line, 0).map(|t| t.slice(line)).unwrap_or("")
}

/// Locate parameter `index` (0-based, command name excluded).
pub fn parameter(line: &str, index: usize) -> Option<Token> {
    nth_token(line, index + 1)
}

/// Number of parameters following the command name.
pub fn parameter_count(line: &str) -> usize {
    line.split([' ', '\t'])
        .filter(|s| !s.is_empty())
        .count()
        .saturating_sub(1)
}

/// Command line view handed to handlers
#[derive(Debug, Clone, Copy)]
pub struct ParsedCommand<'a> {
    line: &'a str,
}

impl<'a> ParsedCommand<'a> {
    /// Wrap a raw line
    pub const fn new(line: &'a str) -> Self {
        Self { line }
    }

    /// The raw line, unmodified
    pub fn line(&self) -> &'a str {
        self.line
    }

    /// The command name (first token)
    pub fn command(&self) -> &'a str {
        command_name(self.line)
    }

    /// Get argument by index (0-based)
    pub fn arg(&self, idx: usize) -> Option<&'a str> {
        parameter(self.line, idx).map(|t| t.slice(self.line))
    }

    /// Number of arguments present
    pub fn arg_count(&self) -> usize {
        parameter_count(self.line)
    }
}

/// Wrap a line for dispatch
pub fn parse_line(line: &str) -> ParsedCommand<'_> {
    ParsedCommand::new(line)
}
