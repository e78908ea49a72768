use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::{DriveshError, Result};

/// Which backend a command line addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Local,
    Drive,
}

impl FromStr for Target {
    type Err = DriveshError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "local" => Ok(Self::Local),
            "drive" => Ok(Self::Drive),
            other => Err(DriveshError::Command(format!(
                "Invalid storage medium \"{other}\""
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteKind {
    Directory,
    File,
}

impl FromStr for DeleteKind {
    type Err = DriveshError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dir" | "folder" | "directory" => Ok(Self::Directory),
            "file" => Ok(Self::File),
            other => Err(DriveshError::Command(format!(
                "Unknown delete kind \"{other}\", expected dir, folder, directory or file"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    ChangeDirectory(String),
    MakeDirectory(String),
    Delete { kind: DeleteKind, name: String },
    Upload(PathBuf),
    Download { name: String, path: PathBuf },
    Root,
    Reload,
    Help,
}

impl ShellCommand {
    /// Parse the words following the storage selector.
    pub fn parse(words: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut words = words.into_iter();
        let command = words
            .next()
            .ok_or_else(|| DriveshError::Command("missing command".into()))?;

        let mut arg = |what: &str| {
            words
                .next()
                .ok_or_else(|| DriveshError::Command(format!("{command}: missing {what}")))
        };

        let parsed = match command.as_str() {
            "list" => Self::List,
            "chdir" => Self::ChangeDirectory(arg("directory name")?),
            "mkdir" => Self::MakeDirectory(arg("directory name")?),
            "delete" => {
                let kind = arg("kind")?.parse()?;
                Self::Delete {
                    kind,
                    name: arg("name")?,
                }
            }
            "upload" => Self::Upload(PathBuf::from(arg("path")?)),
            "download" => Self::Download {
                name: arg("file name")?,
                path: PathBuf::from(arg("destination path")?),
            },
            "root" => Self::Root,
            "reload" => Self::Reload,
            "help" => Self::Help,
            other => {
                return Err(DriveshError::Command(format!("Unknown command \"{other}\"")))
            }
        };
        Ok(parsed)
    }
}
