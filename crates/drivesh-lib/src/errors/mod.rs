use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriveshError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Remote error: {error}{}", describe(.description))]
    Remote {
        error: String,
        description: Option<String>,
    },

    #[error("Malformed response: {0}")]
    Protocol(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{operation} is not supported by {backend} storage")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },

    #[error("Lock conflict: {path}")]
    LockConflict { path: PathBuf },

    #[error("Command error: {0}")]
    Command(String),
}

pub type Result<T> = std::result::Result<T, DriveshError>;

fn describe(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

/// Logs a fatal error and exits the process with code 1.
///
/// Only the binary calls this; the library always hands errors back.
pub fn handle_fatal(err: DriveshError) -> ! {
    tracing::error!("Fatal error: {}", err);
    crate::output::error(&format!("Fatal: {err}"));
    std::process::exit(1)
}

/// Maps a `DriveshError` to user-facing shell output with a hint where one helps.
pub fn handle_command_error(err: &DriveshError) {
    use crate::output;

    tracing::warn!(error = %err, "command failed");
    match err {
        DriveshError::Auth(msg) => {
            output::error(&format!("Authentication error: {}", msg));
            output::info(
                "Remove refresh_token from the credentials file to sign in again.",
            );
        }
        DriveshError::Remote { .. } => {
            output::error(&format!("{}", err));
        }
        DriveshError::Server { status, message } => {
            output::error(&format!("Google Drive error ({}): {}", status, message));
            output::info("Check your network connection and the credentials file.");
        }
        DriveshError::Http(e) => {
            output::error(&format!("Network error: {}", e));
            output::info("Check your internet connection.");
        }
        DriveshError::Io(e) => {
            output::error(&format!("File error: {}", e));
        }
        DriveshError::NotFound(what) => {
            output::error(&format!("Not found: {}", what));
            output::info("Use `list` to see the entries in the current directory.");
        }
        DriveshError::Command(msg) => {
            output::error(&format!("Error: {}", msg));
            output::info("Type `help` for the command list.");
        }
        DriveshError::LockConflict { path } => {
            output::error(&format!("Lock conflict: {}", path.display()));
            output::info("Another drivesh process may be writing the credentials file.");
        }
        _ => {
            output::error(&format!("{}", err));
        }
    }
    if crate::logger::is_verbose() {
        output::warning(&format!("Details: {:?}", err));
    }
}
