//! Per-file move and delete operations.

use crate::error::FileFailure;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Move `source` into `directory`, keeping its file name.
///
/// An existing file of the same name is overwritten. On failure the file is
/// still at `source` (or, if only the final source removal failed, at both).
pub(super) fn move_into(source: &Path, directory: &Path) -> Result<PathBuf, FileFailure> {
    let fail = |reason: String| FileFailure {
        path: source.to_path_buf(),
        reason,
    };

    let name = source
        .file_name()
        .ok_or_else(|| fail("path has no file name".to_string()))?;
    let destination = directory.join(name);

    if !source.is_file() {
        return Err(fail("source file not found".to_string()));
    }
    if destination == source {
        return Ok(destination);
    }

    if destination.exists() {
        tracing::warn!(
            source = %source.display(),
            destination = %destination.display(),
            "Overwriting existing file"
        );
    }

    fs::rename(source, &destination)
        .or_else(|_| copy_then_remove(source, &destination))
        .map_err(|e| fail(e.to_string()))?;

    Ok(destination)
}

/// Cross-filesystem fallback: copy, verify the size, then drop the source
fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    let source_size = fs::metadata(source)?.len();
    fs::copy(source, destination)?;

    let copied_size = fs::metadata(destination)?.len();
    if copied_size != source_size {
        let _ = fs::remove_file(destination);
        return Err(io::Error::other(format!(
            "copy verification failed: source {} bytes, copy {} bytes",
            source_size, copied_size
        )));
    }

    fs::remove_file(source).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("copied, but could not remove the source: {}", e),
        )
    })
}

/// Remove `path` permanently
pub(super) fn delete(path: &Path) -> Result<(), FileFailure> {
    if !path.is_file() {
        return Err(FileFailure {
            path: path.to_path_buf(),
            reason: "file not found".to_string(),
        });
    }

    fs::remove_file(path).map_err(|e| FileFailure {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Check that `directory` exists and accepts new files
pub(super) fn probe_destination(directory: &Path) -> Result<(), String> {
    if !directory.exists() {
        return Err("does not exist".to_string());
    }
    if !directory.is_dir() {
        return Err("is not a directory".to_string());
    }
    tempfile::NamedTempFile::new_in(directory)
        .map(drop)
        .map_err(|e| format!("is not writable: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn move_keeps_file_name() {
        let source_dir = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();
        let source = source_dir.path().join("photo.jpg");
        fs::write(&source, b"content").unwrap();

        let moved = move_into(&source, dest_dir.path()).unwrap();

        assert_eq!(moved, dest_dir.path().join("photo.jpg"));
        assert!(!source.exists());
        assert_eq!(fs::read(&moved).unwrap(), b"content");
    }

    #[test]
    fn move_overwrites_name_collision() {
        let source_dir = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();
        let source = source_dir.path().join("photo.jpg");
        fs::write(&source, b"new").unwrap();
        fs::write(dest_dir.path().join("photo.jpg"), b"old").unwrap();

        let moved = move_into(&source, dest_dir.path()).unwrap();

        assert_eq!(fs::read(&moved).unwrap(), b"new");
    }

    #[test]
    fn copy_fallback_removes_source() {
        let source_dir = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();
        let source = source_dir.path().join("photo.jpg");
        fs::write(&source, b"content").unwrap();
        let destination = dest_dir.path().join("photo.jpg");

        copy_then_remove(&source, &destination).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read(&destination).unwrap(), b"content");
    }

    #[test]
    fn missing_source_is_a_failure() {
        let dest_dir = TempDir::new().unwrap();
        let missing = dest_dir.path().join("gone").join("photo.jpg");

        let failure = move_into(&missing, dest_dir.path()).err().unwrap();

        assert_eq!(failure.path, missing);
        assert!(failure.reason.contains("not found"));
    }

    #[test]
    fn probe_rejects_files_and_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, b"x").unwrap();

        assert!(probe_destination(temp_dir.path()).is_ok());
        assert!(probe_destination(&file).unwrap_err().contains("not a directory"));
        assert!(probe_destination(&temp_dir.path().join("nope"))
            .unwrap_err()
            .contains("does not exist"));
    }
}
