//! The durable save sequencer.
//!
//! Writes a document to a storage backend without ever exposing partial
//! content at the final path: when the backend can rename, content first
//! goes to a staging file in full, then a single atomic rename commits it.
//! A crash or abort before the rename leaves the original file untouched.

pub mod markers;

use crate::buffer::Buffer;
use crate::cancel::CancelToken;
use crate::config::SaveConfig;
use crate::document::Document;
use crate::error::SaveError;
use crate::notify::{ChangeNotifier, NullNotifier};
use crate::status::{NullStatus, StatusSink};
use crate::vfs::{Capabilities, Vfs};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::{error, warn};

/// Per-save state, created when the save starts and discarded when it ends.
struct SaveSession {
    /// Where content is first written (the staging path in two-stage mode,
    /// otherwise the final path).
    save_path: PathBuf,
    /// Staging-then-rename mode. Implies `save_path` differs from the final
    /// path and the backend can rename.
    two_stage: bool,
}

/// A single save of one document to one path.
///
/// Collaborators are `Arc`-shared so the request can either run on the
/// calling thread ([`run`](Self::run)) or be moved onto its own worker
/// ([`spawn`](Self::spawn)). Saves of different documents may run
/// concurrently; concurrent saves of the *same* path must be serialized by
/// the caller.
pub struct SaveRequest {
    doc: Arc<Document>,
    vfs: Arc<dyn Vfs>,
    path: PathBuf,
    config: SaveConfig,
    status: Arc<dyn StatusSink>,
    notifier: Arc<dyn ChangeNotifier>,
    cancel: CancelToken,
}

impl SaveRequest {
    /// Create a save request with default policies and no-op observers.
    pub fn new(doc: Arc<Document>, vfs: Arc<dyn Vfs>, path: impl Into<PathBuf>) -> Self {
        Self {
            doc,
            vfs,
            path: path.into(),
            config: SaveConfig::default(),
            status: Arc::new(NullStatus),
            notifier: Arc::new(NullNotifier),
            cancel: CancelToken::new(),
        }
    }

    pub fn config(mut self, config: SaveConfig) -> Self {
        self.config = config;
        self
    }

    pub fn status_sink(mut self, status: Arc<dyn StatusSink>) -> Self {
        self.status = status;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn ChangeNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the save on the current thread.
    ///
    /// `confirm_overwrite` is consulted when the target is read-only but
    /// the backend could still replace it via rename; answering no fails
    /// the save with [`SaveError::NotWritable`] before any mutation.
    ///
    /// Whatever happens, the backend's completion and teardown hooks run
    /// before this returns; a hook failure is reported without masking an
    /// earlier error.
    pub fn run(&self, confirm_overwrite: impl Fn(&Path) -> bool) -> Result<(), SaveError> {
        let name = self
            .path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        self.status.status(&format!("Saving {name}..."));

        let (path, result) = match self.vfs.canonicalize(&self.path) {
            Ok(path) => {
                let result = self.save_to(&path, &confirm_overwrite);
                (path, result)
            }
            Err(e) => (self.path.clone(), Err(e.into())),
        };

        if result.is_err() {
            self.doc.set_error();
        }

        // Final cleanup phase, regardless of success, error, or abort.
        let hooks = self
            .vfs
            .on_save_complete(&self.doc, &path)
            .and_then(|()| self.vfs.end_session());
        match (result, hooks) {
            (Ok(()), Ok(())) => Ok(()),
            (Ok(()), Err(e)) => {
                self.doc.set_error();
                Err(e.into())
            }
            (Err(save_err), Err(hook_err)) => {
                // report the hook failure, keep the original error
                error!(path = %path.display(), error = %hook_err, "save teardown failed");
                Err(save_err)
            }
            (Err(e), Ok(())) => Err(e),
        }
    }

    /// Run the save on its own background worker thread.
    pub fn spawn(
        self,
        confirm_overwrite: impl Fn(&Path) -> bool + Send + 'static,
    ) -> thread::JoinHandle<Result<(), SaveError>> {
        thread::spawn(move || self.run(confirm_overwrite))
    }

    /// Everything between canonicalization and the cleanup hooks:
    /// writeability, backup, and the two-stage decision.
    fn save_to(
        &self,
        path: &Path,
        confirm_overwrite: &dyn Fn(&Path) -> bool,
    ) -> Result<(), SaveError> {
        let caps = self.vfs.capabilities();

        let mut overwrite_readonly = false;
        let info = self.vfs.stat(path)?;
        if !info.writable {
            // A rename-capable backend can still replace a read-only file,
            // but only with the caller's consent.
            if caps.rename && confirm_overwrite(path) {
                overwrite_readonly = true;
            } else {
                return Err(SaveError::NotWritable(path.to_path_buf()));
            }
        }

        // Backup once per session unless policy forces one every save. A
        // failed backup never stops the save; it is logged and left for
        // the next save to retry.
        if !self.doc.backed_up() || self.config.backup_every_save {
            match self.vfs.backup(path) {
                Ok(()) => self.doc.mark_backed_up(),
                Err(e) => warn!(path = %path.display(), error = %e, "backup failed"),
            }
        }

        let mut two_stage =
            overwrite_readonly || (caps.rename && self.config.two_stage_save);
        let save_path = if two_stage {
            match self.vfs.two_stage_name(path) {
                Some(p) => p,
                None => {
                    // backend cannot stage here; fall back to a direct save
                    two_stage = false;
                    path.to_path_buf()
                }
            }
        } else {
            path.to_path_buf()
        };

        let session = SaveSession {
            save_path,
            two_stage,
        };
        self.write_phase(path, &session, caps)
    }

    /// Stream the content, commit the rename, handle the markers
    /// companion, notify watchers.
    fn write_phase(
        &self,
        path: &Path,
        session: &SaveSession,
        caps: Capabilities,
    ) -> Result<(), SaveError> {
        let out = self.vfs.open_output(&session.save_path);

        // Lock after the stream is created; some backends deadlock the
        // other way around.
        let buffer = self.doc.buffer();
        let mut pending: Option<SaveError> = None;

        if let Some(out) = out {
            // The final path's extension decides compression, not the
            // staging name.
            if path.extension().is_some_and(|e| e == "gz") {
                self.doc.set_gzipped(true);
            }

            match self.write_content(&buffer, out) {
                Ok(()) => {
                    if session.two_stage && !self.vfs.rename(&session.save_path, path) {
                        return Err(io::Error::other(format!(
                            "rename failed: {}",
                            session.save_path.display()
                        ))
                        .into());
                    }
                }
                // a detected cancellation skips every remaining step
                Err(SaveError::Aborted) => return Err(SaveError::Aborted),
                Err(e) => return Err(e),
            }
        } else {
            // The backend already reported the failure through its own
            // channel; flag it and keep going so companion artifacts stay
            // consistent and the cleanup hooks still run.
            pending = Some(io::Error::other("could not open output stream").into());
        }

        // Markers are only persisted to backends that can also delete,
        // otherwise stale companion files would accumulate.
        if caps.delete {
            let markers_path = self.vfs.markers_path(path);
            if self.config.persistent_markers && !buffer.markers().is_empty() {
                self.status.status("Saving markers...");
                if let Some(mout) = self.vfs.open_output(&markers_path) {
                    if let Err(e) = markers::write_markers(buffer.markers(), mout) {
                        pending.get_or_insert(e.into());
                    }
                } else {
                    pending
                        .get_or_insert(io::Error::other("could not open markers stream").into());
                }
            } else {
                self.vfs.delete(&markers_path);
            }
        }

        // Watchers only hear about direct saves; for two-stage saves the
        // rename itself is the completion signal.
        if !session.two_stage && pending.is_none() {
            self.notifier.notify(path, true);
        }

        match pending {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// The abortable content write, optionally through gzip.
    fn write_content(
        &self,
        buffer: &Buffer,
        out: Box<dyn Write + Send>,
    ) -> Result<(), SaveError> {
        if self.doc.is_gzipped() {
            let mut enc = GzEncoder::new(out, Compression::default());
            self.write_chunks(buffer, &mut enc)?;
            let mut inner = enc.finish()?;
            inner.flush()?;
        } else {
            let mut out = out;
            self.write_chunks(buffer, &mut out)?;
            out.flush()?;
        }
        Ok(())
    }

    /// Stream the buffer chunk by chunk, polling the cancel token at every
    /// chunk boundary. On cancellation the stream is simply dropped by the
    /// caller; no rename can happen afterwards.
    fn write_chunks<W: Write>(&self, buffer: &Buffer, out: &mut W) -> Result<(), SaveError> {
        let total = buffer.serialized_len() as u64;
        let mut written = 0u64;
        for chunk in buffer.chunks() {
            if self.cancel.is_cancelled() {
                return Err(SaveError::Aborted);
            }
            out.write_all(chunk.as_bytes())?;
            written += chunk.len() as u64;
            self.status.progress(written, total);
        }
        if self.cancel.is_cancelled() {
            return Err(SaveError::Aborted);
        }
        Ok(())
    }
}
