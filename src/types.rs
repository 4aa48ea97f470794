//! Common types used throughout the save pipeline.

/// The character sequence used to separate lines in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// Unix line ending: `\n` (LF)
    LF,
    /// Windows line ending: `\r\n` (CRLF)
    CRLF,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LF => "\n",
            Self::CRLF => "\r\n",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::LF => "Unix (LF)",
            Self::CRLF => "Windows (CRLF)",
        }
    }
}

/// A named position bookmark in the document.
///
/// Markers are owned by the buffer and are read-only during a save; the
/// sequencer persists them to a companion file when the backend allows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    /// Single-character shortcut identifying the marker.
    pub shortcut: char,
    /// Char offset into the document.
    pub position: usize,
}

impl Marker {
    pub fn new(shortcut: char, position: usize) -> Self {
        Self { shortcut, position }
    }
}
