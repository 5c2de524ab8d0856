use std::fmt;

/// Position in the input where a parse error was detected.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Location {
    /// 1-based line number (header and ascii bodies).
    Line(usize),
    /// Byte offset from the start of the file (binary bodies).
    Byte(usize),
}

/// A parse error from a `.ply` file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub location: Option<Location>,
}

impl ParseError {
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        Self { message: msg.into(), location: None }
    }

    pub(crate) fn at_line(msg: impl Into<String>, line: usize) -> Self {
        Self { message: msg.into(), location: Some(Location::Line(line)) }
    }

    pub(crate) fn at_byte(msg: impl Into<String>, offset: usize) -> Self {
        Self { message: msg.into(), location: Some(Location::Byte(offset)) }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(Location::Line(line)) => write!(f, "ply parse error at line {line}: {}", self.message),
            Some(Location::Byte(off)) => write!(f, "ply parse error at byte {off}: {}", self.message),
            None => write!(f, "ply parse error: {}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}
