//! Process-wide logging to an append-only text file.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing_subscriber::{fmt, EnvFilter};

use crate::errors::{DriveshError, Result};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Initialize the tracing subscriber writing to `log_file`.
///
/// The file is truncated first, then every event is appended as one line.
/// `RUST_LOG` overrides the level; otherwise `debug` enables DEBUG, else INFO.
pub fn init(log_file: &Path, debug: bool) -> Result<()> {
    let file = open_log_file(log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_timer(fmt::time::SystemTime)
        .with_level(true)
        .with_target(true)
        .try_init()
        .map_err(|e| DriveshError::Config(format!("Failed to install logger: {e}")))
}

/// Truncate the log file and reopen it in append mode.
fn open_log_file(log_file: &Path) -> Result<File> {
    if let Some(parent) = log_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    File::create(log_file)?;
    Ok(OpenOptions::new().append(true).open(log_file)?)
}

/// Set the global verbose mode flag.
pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::SeqCst);
}

/// Check whether verbose mode is currently enabled.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_verbose_set_and_get() {
        // Single test: the flag is process-global.
        set_verbose(true);
        assert!(is_verbose());

        set_verbose(false);
        assert!(!is_verbose());
    }

    #[test]
    fn test_open_log_file_truncates_previous_run() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("log.txt");
        std::fs::write(&path, "old session\n").unwrap();

        let mut file = open_log_file(&path).unwrap();
        writeln!(file, "first").unwrap();
        writeln!(file, "second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_open_log_file_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("logs/nested/log.txt");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
