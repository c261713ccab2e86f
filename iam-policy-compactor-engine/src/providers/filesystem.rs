//! Native filesystem provider implementation using `tokio::fs`.

use std::path::{Path, PathBuf};
use tokio::fs;

use crate::errors::{CompactorError, Result};

/// Native filesystem provider using `tokio::fs` for async file operations.
///
/// Every error carries the operation and the path that failed.
#[derive(Debug, Clone)]
pub struct NativeFileSystemProvider;

impl NativeFileSystemProvider {
    /// Read the entire contents of a file as a UTF-8 string.
    pub async fn read_file(path: impl AsRef<Path>) -> Result<String> {
        fs::read_to_string(path.as_ref())
            .await
            .map_err(|e| CompactorError::file_system("read", path.as_ref(), e))
    }

    /// Write a string to a file, creating parent directories as needed.
    pub async fn write_file(path: impl AsRef<Path>, contents: &str) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CompactorError::file_system("create directory", parent, e))?;
        }
        fs::write(path, contents)
            .await
            .map_err(|e| CompactorError::file_system("write", path, e))
    }

    /// List the files directly inside `dir` whose extension matches, sorted by path.
    ///
    /// Does not recurse. The extension comparison ignores case.
    pub async fn list_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        let metadata = fs::metadata(dir)
            .await
            .map_err(|e| CompactorError::file_system("access directory", dir, e))?;

        if !metadata.is_dir() {
            return Err(CompactorError::file_system(
                "list files in",
                dir,
                std::io::Error::new(std::io::ErrorKind::NotADirectory, "Path is not a directory"),
            ));
        }

        let mut files = Vec::new();
        let mut entries = fs::read_dir(dir)
            .await
            .map_err(|e| CompactorError::file_system("read directory", dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CompactorError::file_system("read directory entry", dir, e))?
        {
            let path = entry.path();
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| CompactorError::file_system("read metadata", &path, e))?;

            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
            if metadata.is_file() && matches {
                files.push(path);
            }
        }

        // Sort for consistent ordering
        files.sort();

        Ok(files)
    }
}
