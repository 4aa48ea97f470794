//! Path-change notifications for file watchers and UI refresh.

use std::path::Path;

/// Told once when a direct (single-stage) save completes, so watchers can
/// refresh. Two-stage saves skip this: the atomic rename itself is the
/// completion signal the caller wires up.
pub trait ChangeNotifier: Send + Sync {
    fn notify(&self, path: &Path, complete_save: bool);
}

/// Discards all notifications.
#[derive(Debug, Default)]
pub struct NullNotifier;

impl ChangeNotifier for NullNotifier {
    fn notify(&self, _path: &Path, _complete_save: bool) {}
}
