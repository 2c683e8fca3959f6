//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::Path;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Create parent directory if it doesn't exist.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
                std::fs::create_dir_all(parent)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_missing_parent_when_ensure_parent_then_directories_created() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("a").join("b").join("app.yaml");

        RealFileSystem.ensure_parent(&path).expect("ensure");
        RealFileSystem.write(&path, "k: v\n").expect("write");

        assert_eq!(RealFileSystem.read_to_string(&path).expect("read"), "k: v\n");
    }

    #[test]
    fn given_bare_file_name_when_ensure_parent_then_noop() {
        assert!(RealFileSystem.ensure_parent(Path::new("app.yaml")).is_ok());
    }
}
