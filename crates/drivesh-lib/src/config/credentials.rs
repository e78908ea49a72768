//! OAuth client credentials file (`client_secret.json`).
//!
//! The file is the one downloaded from the Google Cloud console for an
//! "installed" application. A refresh token obtained by the device flow is
//! written back into the `installed` section; every other field is kept.

use std::path::{Path, PathBuf};

use oauth2::{ClientId, ClientSecret, RefreshToken};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{DriveshError, Result};
use crate::fileops::{self, lock::FileLock};

#[derive(Debug, Clone, Deserialize)]
pub struct InstalledCredentials {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
    #[serde(default)]
    pub refresh_token: Option<RefreshToken>,
}

#[derive(Debug, Clone)]
pub struct CredentialsFile {
    path: PathBuf,
    document: Value,
    installed: InstalledCredentials,
}

impl CredentialsFile {
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            DriveshError::Config(format!(
                "Cannot read credentials file {}: {e}",
                path.display()
            ))
        })?;
        Self::parse(path, &text)
    }

    fn parse(path: &Path, text: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(text).map_err(|e| {
            DriveshError::Config(format!("{} is not valid JSON: {e}", path.display()))
        })?;
        let section = document.get("installed").cloned().ok_or_else(|| {
            DriveshError::Config(format!(
                "{} has no \"installed\" section",
                path.display()
            ))
        })?;
        let installed: InstalledCredentials = serde_json::from_value(section).map_err(|e| {
            DriveshError::Config(format!("{}: {e}", path.display()))
        })?;

        tracing::debug!(
            path = %path.display(),
            has_refresh_token = installed.refresh_token.is_some(),
            "loaded credentials"
        );

        Ok(Self {
            path: path.to_path_buf(),
            document,
            installed,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn client_id(&self) -> &ClientId {
        &self.installed.client_id
    }

    pub fn client_secret(&self) -> &ClientSecret {
        &self.installed.client_secret
    }

    pub fn refresh_token(&self) -> Option<&RefreshToken> {
        self.installed.refresh_token.as_ref()
    }

    /// Record `token` in the `installed` section and rewrite the file.
    pub async fn store_refresh_token(&mut self, token: &RefreshToken) -> Result<()> {
        let _guard = FileLock::beside(&self.path).acquire()?;

        let mut document = self.document.clone();
        let section = document
            .get_mut("installed")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| {
                DriveshError::Config(format!(
                    "{} has no \"installed\" section",
                    self.path.display()
                ))
            })?;
        section.insert(
            "refresh_token".into(),
            Value::String(token.secret().clone()),
        );

        let text = serde_json::to_string_pretty(&document)?;
        fileops::write_atomic(&self.path, text.as_bytes()).await?;
        self.document = document;
        self.installed.refresh_token = Some(token.clone());

        tracing::info!(path = %self.path.display(), "stored refresh token");
        Ok(())
    }
}
