//! Uniform navigation and transfer interface over the local filesystem and
//! Google Drive.
//!
//! Every backend keeps a [`TreeCache`] and a cursor (the id of the current
//! directory). Lookups are answered from the cache; mutations go to the
//! backend first.

pub mod item;
pub mod local;
pub mod tree;

use std::path::Path;

use async_trait::async_trait;

pub use item::Item;
pub use local::LocalStorage;
pub use tree::TreeCache;

use crate::errors::{DriveshError, Result};

/// Cursor and cache shared by every backend.
#[derive(Debug, Clone)]
pub struct StorageState {
    root: String,
    parent: String,
    tree: TreeCache,
}

impl StorageState {
    /// New state with the cursor at `root` and an empty cache.
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        Self {
            parent: root.clone(),
            root,
            tree: TreeCache::new(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }

    pub fn set_parent(&mut self, parent: impl Into<String>) {
        self.parent = parent.into();
    }

    pub fn reset_to_root(&mut self) {
        self.parent = self.root.clone();
    }

    pub fn tree(&self) -> &TreeCache {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut TreeCache {
        &mut self.tree
    }

    pub fn replace_tree(&mut self, tree: TreeCache) {
        self.tree = tree;
    }
}

#[async_trait]
pub trait Storage: Send {
    /// Short backend name used in messages ("local", "drive").
    fn label(&self) -> &'static str;

    fn state(&self) -> &StorageState;

    /// Items directly under the cursor, in cache order.
    fn list_contents(&self) -> Vec<&Item> {
        let state = self.state();
        state.tree().children_of(state.parent()).collect()
    }

    fn directory_exists(&self, name: &str) -> bool {
        self.get_directory_id(name).is_some()
    }

    fn file_exists(&self, name: &str) -> bool {
        self.get_file_id(name).is_some()
    }

    fn get_directory_id(&self, name: &str) -> Option<&str> {
        let state = self.state();
        state
            .tree()
            .find_directory(state.parent(), name)
            .map(Item::id)
    }

    /// Id of the directory at a positional index over the whole cache.
    fn get_directory_id_at(&self, index: i64) -> Option<&str> {
        self.state()
            .tree()
            .get(index)
            .filter(|i| i.is_directory())
            .map(Item::id)
    }

    fn get_file_id(&self, name: &str) -> Option<&str> {
        let state = self.state();
        state.tree().find_file(state.parent(), name).map(Item::id)
    }

    fn get_file_id_at(&self, index: i64) -> Option<&str> {
        self.state()
            .tree()
            .get(index)
            .filter(|i| !i.is_directory())
            .map(Item::id)
    }

    fn current_parent(&self) -> &str {
        self.state().parent()
    }

    fn root_id(&self) -> &str {
        self.state().root()
    }

    async fn return_to_root(&mut self) -> Result<()>;

    /// Move the cursor into `name`, or to the parent for `".."`.
    ///
    /// Fails with [`DriveshError::NotFound`] and leaves the cursor unchanged
    /// when the target does not exist, including `".."` at the root.
    async fn change_directory(&mut self, name: &str) -> Result<()>;

    async fn create_directory(&mut self, name: &str) -> Result<()>;

    async fn delete_directory(&mut self, name: &str) -> Result<()>;

    async fn delete_file(&mut self, name: &str) -> Result<()>;

    /// Rebuild the cache from the backend.
    async fn reload(&mut self) -> Result<()>;

    async fn upload_file(&mut self, _path: &Path) -> Result<()> {
        Err(DriveshError::Unsupported {
            backend: self.label(),
            operation: "upload",
        })
    }

    async fn download_file(&mut self, _name: &str, _path: &Path) -> Result<()> {
        Err(DriveshError::Unsupported {
            backend: self.label(),
            operation: "download",
        })
    }
}
