//! The local filesystem backend.

use super::{Capabilities, FileInfo, Vfs};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Saves straight to the local disk.
///
/// Fully capable: renames are atomic on the same filesystem (staging names
/// are placed next to the target so the rename never crosses a mount),
/// deletes are supported, and backups copy the target to `<name>~`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalVfs;

impl Vfs for LocalVfs {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            rename: true,
            delete: true,
        }
    }

    /// Canonicalizes through symlinks. The target of a save usually does
    /// not exist yet, so a missing file canonicalizes its parent directory
    /// and reattaches the file name.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        match fs::canonicalize(path) {
            Ok(p) => Ok(p),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
                let name = path.file_name();
                match (parent, name) {
                    (Some(parent), Some(name)) => Ok(fs::canonicalize(parent)?.join(name)),
                    _ => Ok(path.to_path_buf()),
                }
            }
            Err(e) => Err(e),
        }
    }

    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        match fs::metadata(path) {
            Ok(meta) => Ok(FileInfo {
                exists: true,
                writable: !meta.permissions().readonly(),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(FileInfo {
                exists: false,
                writable: true,
            }),
            Err(e) => Err(e),
        }
    }

    /// Stages as `#<name>#save#` in the target's directory.
    fn two_stage_name(&self, path: &Path) -> Option<PathBuf> {
        let name = path.file_name()?.to_string_lossy();
        Some(path.with_file_name(format!("#{name}#save#")))
    }

    fn open_output(&self, path: &Path) -> Option<Box<dyn Write + Send>> {
        match File::create(path) {
            Ok(f) => Some(Box::new(BufWriter::new(f))),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not open output stream");
                None
            }
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> bool {
        match fs::rename(from, to) {
            Ok(()) => true,
            Err(e) => {
                warn!(from = %from.display(), to = %to.display(), error = %e, "rename failed");
                false
            }
        }
    }

    fn delete(&self, path: &Path) -> bool {
        match fs::remove_file(path) {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "delete failed");
                false
            }
        }
    }

    /// Copies the current content to `<name>~` before the first overwrite.
    fn backup(&self, path: &Path) -> io::Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let name = path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?
            .to_string_lossy()
            .into_owned();
        let backup = path.with_file_name(format!("{name}~"));
        fs::copy(path, &backup)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== canonicalize tests ====================

    #[test]
    fn canonicalize_missing_file_keeps_name() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("new.txt");
        let canon = LocalVfs.canonicalize(&target).unwrap();
        assert_eq!(canon.file_name().unwrap(), "new.txt");
        assert!(canon.parent().unwrap().exists());
    }

    #[test]
    fn canonicalize_resolves_existing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a.txt");
        fs::write(&target, "x").unwrap();
        let canon = LocalVfs.canonicalize(&target).unwrap();
        assert!(canon.is_absolute());
        assert_eq!(fs::read_to_string(&canon).unwrap(), "x");
    }

    // ==================== stat tests ====================

    #[test]
    fn stat_missing_file_is_creatable() {
        let dir = tempfile::tempdir().unwrap();
        let info = LocalVfs.stat(&dir.path().join("nope.txt")).unwrap();
        assert!(!info.exists);
        assert!(info.writable);
    }

    #[test]
    fn stat_readonly_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("ro.txt");
        fs::write(&target, "x").unwrap();
        let mut perms = fs::metadata(&target).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&target, perms).unwrap();

        let info = LocalVfs.stat(&target).unwrap();
        assert!(info.exists);
        assert!(!info.writable);
    }

    // ==================== staging and backup tests ====================

    #[test]
    fn two_stage_name_stays_in_directory() {
        let staged = LocalVfs.two_stage_name(Path::new("/tmp/d/f.txt")).unwrap();
        assert_eq!(staged, Path::new("/tmp/d/#f.txt#save#"));
    }

    #[test]
    fn backup_copies_content() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("doc.txt");
        fs::write(&target, "original").unwrap();

        LocalVfs.backup(&target).unwrap();
        let backup = dir.path().join("doc.txt~");
        assert_eq!(fs::read_to_string(backup).unwrap(), "original");
    }

    #[test]
    fn backup_of_missing_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        LocalVfs.backup(&dir.path().join("nope.txt")).unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn rename_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, "x").unwrap();

        assert!(LocalVfs.rename(&a, &b));
        assert!(!a.exists());
        assert!(b.exists());

        assert!(LocalVfs.delete(&b));
        assert!(!b.exists());
        assert!(!LocalVfs.delete(&b));
    }
}
