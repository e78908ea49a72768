//! Host filesystem backend.
//!
//! Item ids are entry names and parent ids are the full path of the
//! containing directory. The cache only ever holds the current directory and
//! is rebuilt whenever the cursor moves.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{Item, Storage, StorageState, TreeCache};
use crate::errors::{DriveshError, Result};
use crate::fileops;

#[derive(Debug)]
pub struct LocalStorage {
    root: PathBuf,
    cwd: PathBuf,
    state: StorageState,
}

impl LocalStorage {
    /// Open a local storage rooted at `root` and list it.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let meta = tokio::fs::metadata(&root).await.map_err(|e| {
            DriveshError::Config(format!("Local root {}: {e}", root.display()))
        })?;
        if !meta.is_dir() {
            return Err(DriveshError::Config(format!(
                "Local root {} is not a directory",
                root.display()
            )));
        }

        let mut storage = Self {
            state: StorageState::new(path_id(&root)),
            cwd: root.clone(),
            root,
        };
        storage.reload().await?;
        Ok(storage)
    }

    pub fn current_dir(&self) -> &Path {
        &self.cwd
    }

    /// Enumerate `dir` into a fresh cache and move the cursor there.
    ///
    /// On failure the cursor and the cache are left as they were.
    async fn enter(&mut self, dir: PathBuf) -> Result<()> {
        let parent = path_id(&dir);
        let entries = fileops::list_dir(&dir).await?;

        let mut tree = TreeCache::new();
        tree.extend(
            entries
                .into_iter()
                .map(|e| Item::new(e.name.clone(), e.name, parent.clone(), e.is_dir)),
        );

        tracing::debug!(path = %dir.display(), entries = tree.len(), "listed local directory");
        self.state.replace_tree(tree);
        self.state.set_parent(parent);
        self.cwd = dir;
        Ok(())
    }

    fn entry_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(DriveshError::Command(format!("Invalid entry name: {name:?}")));
        }
        Ok(self.cwd.join(name))
    }
}

fn path_id(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[async_trait]
impl Storage for LocalStorage {
    fn label(&self) -> &'static str {
        "local"
    }

    fn state(&self) -> &StorageState {
        &self.state
    }

    async fn return_to_root(&mut self) -> Result<()> {
        let root = self.root.clone();
        self.enter(root).await
    }

    async fn change_directory(&mut self, name: &str) -> Result<()> {
        let target = if name == ".." {
            if self.cwd == self.root {
                return Err(DriveshError::NotFound(
                    "already at the local root".into(),
                ));
            }
            match self.cwd.parent() {
                Some(parent) => parent.to_path_buf(),
                None => {
                    return Err(DriveshError::NotFound(
                        "no parent directory".into(),
                    ))
                }
            }
        } else {
            if !self.directory_exists(name) {
                return Err(DriveshError::NotFound(format!("directory {name}")));
            }
            self.entry_path(name)?
        };
        self.enter(target).await
    }

    async fn create_directory(&mut self, name: &str) -> Result<()> {
        let path = self.entry_path(name)?;
        fileops::create_dir(&path).await?;
        tracing::info!(path = %path.display(), "created local directory");
        Ok(())
    }

    async fn delete_directory(&mut self, name: &str) -> Result<()> {
        if !self.directory_exists(name) {
            return Err(DriveshError::NotFound(format!("directory {name}")));
        }
        let path = self.entry_path(name)?;
        fileops::delete_dir(&path).await?;
        tracing::info!(path = %path.display(), "deleted local directory");
        Ok(())
    }

    async fn delete_file(&mut self, name: &str) -> Result<()> {
        if !self.file_exists(name) {
            return Err(DriveshError::NotFound(format!("file {name}")));
        }
        let path = self.entry_path(name)?;
        fileops::delete_file(&path).await?;
        tracing::info!(path = %path.display(), "deleted local file");
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        let cwd = self.cwd.clone();
        self.enter(cwd).await
    }
}
