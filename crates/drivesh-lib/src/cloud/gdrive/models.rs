//! Wire schemas for the Google OAuth2 and Drive REST exchanges.
//!
//! Required fields are plain (non-`Option`) so a missing field fails
//! deserialization.

use oauth2::{AccessToken, DeviceCode, RefreshToken, UserCode};
use serde::{Deserialize, Serialize};

use crate::errors::{DriveshError, Result};
use crate::storage::Item;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
pub const DRIVE_FILE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";
pub const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Query parameters of every listing page.
pub const LIST_QUERY: [(&str, &str); 4] = [
    ("fields", "nextPageToken,files(name,id,size,parents,mimeType)"),
    ("orderBy", "name_natural"),
    ("pageSize", "256"),
    ("q", "trashed=false"),
];

// ---------------------------------------------------------------------------
// OAuth2
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCodeResponse {
    pub device_code: DeviceCode,
    pub user_code: UserCode,
    #[serde(alias = "verification_uri")]
    pub verification_url: String,
    pub expires_in: u64,
    pub interval: u64,
}

/// Token endpoint success body, for both the device grant and a refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: AccessToken,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<RefreshToken>,
}

// ---------------------------------------------------------------------------
// Drive
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AboutResponse {
    #[serde(rename = "rootFolderId")]
    pub root_folder_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileList {
    pub files: Vec<RemoteFile>,
    #[serde(rename = "nextPageToken", default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub parents: Vec<String>,
}

impl RemoteFile {
    pub fn is_folder(&self) -> bool {
        is_folder(&self.mime_type)
    }

    /// Convert into a cache item keyed under the first parent.
    pub fn into_item(self) -> Result<Item> {
        let is_directory = self.is_folder();
        let parent = self.parents.into_iter().next().ok_or_else(|| {
            DriveshError::Protocol(format!("file {} has an empty parents list", self.id))
        })?;
        Ok(Item::new(self.name, self.id, parent, is_directory))
    }
}

pub fn is_folder(mime_type: &str) -> bool {
    mime_type == FOLDER_MIME_TYPE
}

/// Metadata body for folder creation and for opening an upload session.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRequest {
    pub name: String,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
}

impl CreateRequest {
    pub fn folder(name: &str, parent: &str) -> Self {
        Self {
            name: name.to_string(),
            mime_type: Some(FOLDER_MIME_TYPE.to_string()),
            parents: non_empty_parent(parent),
        }
    }

    pub fn file(name: &str, parent: &str) -> Self {
        Self {
            name: name.to_string(),
            mime_type: None,
            parents: non_empty_parent(parent),
        }
    }
}

fn non_empty_parent(parent: &str) -> Option<Vec<String>> {
    (!parent.is_empty()).then(|| vec![parent.to_string()])
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedFile {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}
