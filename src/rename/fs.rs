use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Filesystem operations the rename engine relies on.
///
/// Every failure is reported as an `io::Error`; an `Ok` means the
/// operation fully happened.
pub trait FileSystem {
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn same_directory(&self, a: &Path, b: &Path) -> bool;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

/// Parent directory, resolved through the filesystem when it exists
fn resolved_parent(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    fs::canonicalize(parent).unwrap_or_else(|_| parent.to_path_buf())
}

impl FileSystem for StdFileSystem {
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::copy(from, to).map(|_| ())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn exists(&self, path: &Path) -> bool {
        // symlink_metadata so a dangling link still counts as taken
        fs::symlink_metadata(path).is_ok()
    }

    fn same_directory(&self, a: &Path, b: &Path) -> bool {
        resolved_parent(a) == resolved_parent(b)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_same_directory() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let fs = StdFileSystem;

        let a = dir.path().join("a.jpg");
        assert!(fs.same_directory(&a, &dir.path().join("b.jpg")));
        assert!(!fs.same_directory(&a, &dir.path().join("sub").join("b.jpg")));
        assert!(!fs.same_directory(&a, &dir.path().join("sub").join("..").join("..").join("b.jpg")));
        assert!(fs.same_directory(&a, &dir.path().join("sub").join("..").join("b.jpg")));
    }

    #[test]
    fn test_copy_rename_remove() {
        let dir = tempdir().unwrap();
        let fs = StdFileSystem;
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        let c = dir.path().join("c.jpg");
        std::fs::write(&a, "data").unwrap();

        fs.copy(&a, &b).unwrap();
        fs.rename(&b, &c).unwrap();
        assert!(fs.exists(&a));
        assert!(!fs.exists(&b));
        assert_eq!(std::fs::read_to_string(&c).unwrap(), "data");

        fs.remove_file(&c).unwrap();
        assert!(!fs.exists(&c));
        assert!(fs.rename(&b, &c).is_err());
    }
}
