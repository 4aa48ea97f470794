//! Storage backends: the capability-tagged interface the save pipeline writes through.

mod local; // filesystem-backed implementation

pub use local::LocalVfs;

use crate::document::Document;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// What a backend can do beyond plain writes.
///
/// Two-stage saves need `rename`; markers companion files are only written
/// on backends with `delete`, otherwise stale companions would accumulate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub rename: bool,
    pub delete: bool,
}

/// Result of [`Vfs::stat`].
#[derive(Debug, Clone, Copy)]
pub struct FileInfo {
    pub exists: bool,
    pub writable: bool,
}

/// An abstract storage backend.
///
/// One instance covers one storage kind (local disk, archive, network
/// share); the sequencer only talks through this interface.
pub trait Vfs: Send + Sync {
    fn capabilities(&self) -> Capabilities;

    /// Resolve the path to its canonical form. Local backends also resolve
    /// symlinks here; remote locators are returned as-is.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Writability check. A path that does not exist yet reports
    /// `writable: true` when it could be created.
    fn stat(&self, path: &Path) -> io::Result<FileInfo>;

    /// The staging name for a two-stage save of `path`, or `None` when the
    /// backend cannot offer one (the save then falls back to direct mode).
    fn two_stage_name(&self, path: &Path) -> Option<PathBuf>;

    /// Open an output stream. `None` signals a failure the backend has
    /// already reported through its own channel; the caller flags the
    /// session as errored without unwinding.
    fn open_output(&self, path: &Path) -> Option<Box<dyn Write + Send>>;

    /// Atomic rename. Returns false on failure.
    fn rename(&self, from: &Path, to: &Path) -> bool;

    /// Delete a file. Returns false on failure.
    fn delete(&self, path: &Path) -> bool;

    /// Back up the current content of `path` before it is overwritten.
    /// Backing up a path that does not exist is a no-op.
    fn backup(&self, path: &Path) -> io::Result<()> {
        let _ = path;
        Ok(())
    }

    /// Called in the final cleanup phase of every save, success or not.
    fn on_save_complete(&self, doc: &Document, path: &Path) -> io::Result<()> {
        let _ = (doc, path);
        Ok(())
    }

    /// Tear down any per-save backend session state. Always called last.
    fn end_session(&self) -> io::Result<()> {
        Ok(())
    }

    /// Where the markers companion file for `path` lives: a dotted name
    /// with a reserved suffix in the same directory.
    fn markers_path(&self, path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        path.with_file_name(format!(".{name}.marks"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_path_is_dotted_sibling() {
        let vfs = LocalVfs;
        let p = vfs.markers_path(Path::new("/tmp/dir/notes.txt"));
        assert_eq!(p, Path::new("/tmp/dir/.notes.txt.marks"));
    }
}
