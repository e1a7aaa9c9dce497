use std::fs;
use std::path::Path;
use tracing::{debug, error};

use crate::data::error::{FileOpError, FileOpResult};

/// Create a directory and any missing parents. Succeeds if it already exists.
pub fn ensure_dir(path: &Path) -> FileOpResult<()> {
    fs::create_dir_all(path).map_err(|source| FileOpError::CreateDirFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Copy `src` to `dest`, replacing any existing file at `dest`.
///
/// # Returns
/// * `Ok(bytes)` with the number of bytes copied
/// * `Err(FileOpError::CopyFailed)` if the copy failed
pub fn copy_file(src: &Path, dest: &Path) -> FileOpResult<u64> {
    debug!("Copying {:?} to {:?}", src, dest);

    fs::copy(src, dest).map_err(|source| {
        error!("Failed to copy file from {:?} to {:?}: {}", src, dest, source);
        FileOpError::CopyFailed {
            src: src.to_path_buf(),
            dest: dest.to_path_buf(),
            source,
        }
    })
}

/// Move a file from source to destination using copy + remove pattern
/// for cross-drive compatibility.
///
/// If the original cannot be removed the destination copy is cleaned up
/// so the file exists in exactly one place.
pub fn move_file(src: &Path, dest: &Path) -> FileOpResult<()> {
    debug!("Moving {:?} to {:?}", src, dest);

    copy_file(src, dest)?;

    if let Err(source) = fs::remove_file(src) {
        error!("Failed to remove original file {:?} after copy: {}", src, source);
        let _ = fs::remove_file(dest);
        return Err(FileOpError::RemoveFailed {
            path: src.to_path_buf(),
            source,
        });
    }

    Ok(())
}

/// Remove a file, treating an already-absent file as success.
pub fn remove_if_exists(path: &Path) -> FileOpResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(FileOpError::RemoveFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("a").join("b");

        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();

        assert!(dir.is_dir());
    }

    #[test]
    fn test_copy_file_overwrites_destination() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.jpg");
        let dest = temp.path().join("dest.jpg");
        fs::write(&src, b"new bytes").unwrap();
        fs::write(&dest, b"old").unwrap();

        let copied = copy_file(&src, &dest).unwrap();

        assert_eq!(copied, 9);
        assert_eq!(fs::read(&dest).unwrap(), b"new bytes");
        assert!(src.exists());
    }

    #[test]
    fn test_copy_file_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let result = copy_file(&temp.path().join("nope.jpg"), &temp.path().join("out.jpg"));

        assert!(matches!(result, Err(FileOpError::CopyFailed { .. })));
        assert!(!temp.path().join("out.jpg").exists());
    }

    #[test]
    fn test_move_file_removes_source() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("fish.jpg");
        let dest = temp.path().join("moved.jpg");
        fs::write(&src, b"fish").unwrap();

        move_file(&src, &dest).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"fish");
    }

    #[test]
    fn test_remove_if_exists_ignores_absent_file() {
        let temp = TempDir::new().unwrap();
        remove_if_exists(&temp.path().join("absent.jpg")).unwrap();
    }
}
