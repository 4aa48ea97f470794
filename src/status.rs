//! Status and progress reporting for long-running saves.

/// Where the save pipeline reports its phases.
///
/// Implemented by whatever surface the embedding editor has (status bar,
/// progress dialog); the pipeline only pushes text and byte counts.
pub trait StatusSink: Send + Sync {
    /// Replace the current status text.
    fn status(&self, text: &str);

    /// Report progress: `written` bytes out of roughly `total`.
    fn progress(&self, written: u64, total: u64);
}

/// Discards all updates.
#[derive(Debug, Default)]
pub struct NullStatus;

impl StatusSink for NullStatus {
    fn status(&self, _text: &str) {}
    fn progress(&self, _written: u64, _total: u64) {}
}
