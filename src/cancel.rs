//! Cooperative cancellation for long-running saves.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable abort signal.
///
/// The writer polls the token at every chunk boundary; tripping it from any
/// thread makes the save close its stream, flag the document as errored,
/// and return without reaching the rename step.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_untripped() {
        let t = CancelToken::new();
        assert!(!t.is_cancelled());
    }

    #[test]
    fn cancel_is_visible_to_clones() {
        let t = CancelToken::new();
        let c = t.clone();
        t.cancel();
        assert!(c.is_cancelled());
        // tripping twice is fine
        c.cancel();
        assert!(t.is_cancelled());
    }
}
