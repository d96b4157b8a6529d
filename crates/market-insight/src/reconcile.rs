//! Directory Reconciler
//!
//! Sole owner of the data and plot directory contents. Everything that
//! creates or deletes files in those directories goes through here.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{InsightError, Result};

/// Remove every entry in `directory`.
///
/// A missing directory is created; an empty one is left as is. Every entry
/// is checked before the first removal, so a subdirectory fails the call
/// with nothing deleted. A removal that fails midway (permissions) still
/// reports the offending path.
pub async fn reset(directory: &Path) -> Result<usize> {
    fs::create_dir_all(directory)
        .await
        .map_err(|e| InsightError::io(directory, e))?;

    let mut removed = 0;
    for path in entries(directory).await? {
        fs::remove_file(&path)
            .await
            .map_err(|e| InsightError::io(&path, e))?;
        removed += 1;
    }

    if removed > 0 {
        tracing::debug!(dir = %directory.display(), removed, "directory reset");
    }
    Ok(removed)
}

/// Make `file_name` with `contents` the only file in `directory`.
///
/// Existing files are removed first; if any removal fails the new file is
/// not written. The write goes through a temporary file that is renamed into
/// place so a reader never sees a half-written dataset.
pub async fn ensure_single(directory: &Path, file_name: &str, contents: &[u8]) -> Result<PathBuf> {
    reset(directory).await?;

    let target = directory.join(file_name);
    let staging = directory.join(format!(".{file_name}.partial"));

    if let Err(e) = fs::write(&staging, contents).await {
        let _ = fs::remove_file(&staging).await;
        return Err(InsightError::io(&staging, e));
    }
    if let Err(e) = fs::rename(&staging, &target).await {
        let _ = fs::remove_file(&staging).await;
        return Err(InsightError::io(&target, e));
    }

    tracing::info!(file = %target.display(), bytes = contents.len(), "dataset written");
    Ok(target)
}

/// Write one more file into an already reconciled directory.
///
/// Used for plot files after [`reset`]. `file_name` must be a bare name.
pub async fn add_file(directory: &Path, file_name: &str, contents: &[u8]) -> Result<PathBuf> {
    if file_name.is_empty() || file_name.starts_with('.') || file_name.contains(['/', '\\']) {
        return Err(InsightError::io(
            directory.join(file_name),
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a bare file name"),
        ));
    }

    let target = directory.join(file_name);
    fs::write(&target, contents)
        .await
        .map_err(|e| InsightError::io(&target, e))?;
    Ok(target)
}

/// Visible regular files in `directory`, sorted by name.
///
/// Dotfiles (such as a staging file left by a crash) are skipped. A
/// directory that does not exist yet is treated as empty.
pub async fn list_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut reader = match fs::read_dir(directory).await {
        Ok(reader) => reader,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
        Err(e) => return Err(InsightError::io(directory, e)),
    };

    while let Some(entry) = reader
        .next_entry()
        .await
        .map_err(|e| InsightError::io(directory, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| InsightError::io(entry.path(), e))?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if file_type.is_file() && !hidden {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}

async fn entries(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    let mut reader = fs::read_dir(directory)
        .await
        .map_err(|e| InsightError::io(directory, e))?;

    while let Some(entry) = reader
        .next_entry()
        .await
        .map_err(|e| InsightError::io(directory, e))?
    {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| InsightError::io(&path, e))?;
        if !(file_type.is_file() || file_type.is_symlink()) {
            return Err(InsightError::io(
                path,
                std::io::Error::other("not a regular file"),
            ));
        }
        paths.push(path);
    }
    Ok(paths)
}
