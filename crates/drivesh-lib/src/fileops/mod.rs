//! Host filesystem operations used by the local backend and the
//! credentials file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::errors::Result;

pub mod lock;

/// One entry of a directory enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
}

/// Create a single directory. The parent must already exist.
pub async fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir(path).await?;
    Ok(())
}

/// Recursively delete a directory and all its contents.
pub async fn delete_dir(path: &Path) -> Result<()> {
    fs::remove_dir_all(path).await?;
    Ok(())
}

/// Delete a single file.
pub async fn delete_file(path: &Path) -> Result<()> {
    fs::remove_file(path).await?;
    Ok(())
}

/// List immediate children of a directory, sorted by name.
///
/// Names that are not valid UTF-8 are converted lossily.
pub async fn list_dir(path: &Path) -> Result<Vec<DirEntryInfo>> {
    let mut entries = Vec::new();
    let mut reader = fs::read_dir(path).await?;
    while let Some(entry) = reader.next_entry().await? {
        let is_dir = entry.file_type().await?.is_dir();
        entries.push(DirEntryInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Replace `path` with `content` through a temporary sibling and a rename,
/// so readers never see a half-written file.
pub async fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let tmp = temp_sibling(path);
    let mut file = fs::File::create(&tmp).await?;
    file.write_all(content).await?;
    file.sync_all().await?;
    drop(file);
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

/// `<path>.tmp`, the staging file used before a rename over `path`.
pub fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
