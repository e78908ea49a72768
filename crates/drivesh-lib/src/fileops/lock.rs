//! Advisory lock guarding rewrites of a shared file.
//!
//! Uses `fs2` exclusive locks on a `<file>.lock` sibling. The lock file is
//! removed when the [`LockGuard`] drops.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::errors::{DriveshError, Result};

pub struct FileLock {
    path: PathBuf,
}

/// Holds the exclusive lock until dropped.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl FileLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Lock for `target`, stored next to it as `<target>.lock`.
    pub fn beside(target: &Path) -> Self {
        let mut name = OsString::from(target.as_os_str());
        name.push(".lock");
        Self::new(PathBuf::from(name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Try to take the lock without blocking.
    ///
    /// Fails with [`DriveshError::LockConflict`] when another process or
    /// handle holds it.
    pub fn acquire(&self) -> Result<LockGuard> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.path)?;

        file.try_lock_exclusive().map_err(|_| DriveshError::LockConflict {
            path: self.path.clone(),
        })?;

        Ok(LockGuard {
            file,
            path: self.path.clone(),
        })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_beside_appends_lock_suffix() {
        let lock = FileLock::beside(Path::new("/etc/drivesh/client_secret.json"));
        assert_eq!(
            lock.path(),
            Path::new("/etc/drivesh/client_secret.json.lock")
        );
    }

    #[test]
    fn test_guard_drop_removes_lock_file() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("client_secret.json");
        let lock = FileLock::beside(&target);

        {
            let _guard = lock.acquire().unwrap();
            assert!(lock.path().exists());
        }
        assert!(!lock.path().exists());
    }

    #[test]
    fn test_second_acquire_conflicts() {
        let tmp = TempDir::new().unwrap();
        let lock_path = tmp.path().join("secret.json.lock");
        let lock = FileLock::new(&lock_path);

        let _guard = lock.acquire().unwrap();
        match lock.acquire() {
            Err(DriveshError::LockConflict { path }) => assert_eq!(path, lock_path),
            other => panic!("expected LockConflict, got {:?}", other),
        }
    }

    #[test]
    fn test_reacquire_after_release() {
        let tmp = TempDir::new().unwrap();
        let lock = FileLock::new(tmp.path().join("again.lock"));
        drop(lock.acquire().unwrap());
        let _guard = lock.acquire().unwrap();
    }
}
