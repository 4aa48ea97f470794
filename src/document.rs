//! An open document: the buffer plus the per-session flags a save mutates.

use crate::buffer::Buffer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A buffer opened for editing, shared between the editor and save workers.
///
/// The text lives behind an `RwLock`: the sequencer holds the read lock for
/// the whole content write, so structural edits are blocked while other
/// readers proceed. The session flags are atomics because the sequencer
/// flips them while holding only that read lock.
pub struct Document {
    buffer: RwLock<Buffer>,
    /// Set once a backup has been taken this session, so repeat saves do
    /// not clobber the backup (unless policy forces it).
    backed_up: AtomicBool,
    /// Content is written through a gzip filter when set.
    gzipped: AtomicBool,
    /// Set by any failed or aborted save; the caller clears it when
    /// re-offering the save.
    error: AtomicBool,
    /// Unsaved changes exist.
    dirty: AtomicBool,
}

impl Document {
    pub fn new(buffer: Buffer) -> Self {
        Self {
            buffer: RwLock::new(buffer),
            backed_up: AtomicBool::new(false),
            gzipped: AtomicBool::new(false),
            error: AtomicBool::new(false),
            dirty: AtomicBool::new(false),
        }
    }

    /// Read access to the buffer. Blocks structural edits while held.
    pub fn buffer(&self) -> RwLockReadGuard<'_, Buffer> {
        self.buffer.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive access to the buffer for editing.
    pub fn buffer_mut(&self) -> RwLockWriteGuard<'_, Buffer> {
        self.buffer.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn backed_up(&self) -> bool {
        self.backed_up.load(Ordering::Acquire)
    }

    pub fn mark_backed_up(&self) {
        self.backed_up.store(true, Ordering::Release);
    }

    pub fn is_gzipped(&self) -> bool {
        self.gzipped.load(Ordering::Acquire)
    }

    pub fn set_gzipped(&self, on: bool) {
        self.gzipped.store(on, Ordering::Release);
    }

    pub fn error_occurred(&self) -> bool {
        self.error.load(Ordering::Acquire)
    }

    pub fn set_error(&self) {
        self.error.store(true, Ordering::Release);
    }

    pub fn clear_error(&self) {
        self.error.store(false, Ordering::Release);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn set_dirty(&self, dirty: bool) {
        self.dirty.store(dirty, Ordering::Release);
    }
}
