//! The save error taxonomy.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Every way a save can fail.
///
/// Backup-stage I/O errors are deliberately absent: they are logged and
/// reported through the side channel but never stop the save.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The target is read-only and either the backend cannot rename (so an
    /// overwrite is impossible) or the user declined the overwrite.
    #[error("cannot write to {}: file is read-only", .0.display())]
    NotWritable(PathBuf),

    /// Stream, rename, or companion-file failure, carrying the underlying
    /// message.
    #[error("save failed: {0}")]
    Io(#[from] io::Error),

    /// The save was cancelled mid-write. With a two-stage save the final
    /// path is untouched; with a direct save partial content may remain.
    #[error("save aborted")]
    Aborted,
}

impl SaveError {
    /// True when the error came from a cancellation rather than a fault.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}
