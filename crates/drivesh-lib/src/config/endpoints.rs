//! Google OAuth2 and Drive REST endpoint URLs.

use serde::{Deserialize, Serialize};

pub const GOOGLE_API_BASE: &str = "https://www.googleapis.com";
pub const GOOGLE_OAUTH_BASE: &str = "https://oauth2.googleapis.com";

/// Every URL the Drive session talks to.
///
/// `Default` points at Google. Tests swap the bases for a mock server with
/// [`DriveEndpoints::with_base_urls`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriveEndpoints {
    pub device_code_url: String,
    pub token_url: String,
    /// Drive v2 "about" resource. v3 only exposes the `root` alias, and the
    /// tree cache needs the real id.
    pub about_url: String,
    pub files_url: String,
    pub upload_url: String,
}

impl DriveEndpoints {
    pub fn with_base_urls(api_base: &str, oauth_base: &str) -> Self {
        let api = api_base.trim_end_matches('/');
        let oauth = oauth_base.trim_end_matches('/');
        Self {
            device_code_url: format!("{oauth}/device/code"),
            token_url: format!("{oauth}/token"),
            about_url: format!("{api}/drive/v2/about"),
            files_url: format!("{api}/drive/v3/files"),
            upload_url: format!("{api}/upload/drive/v3/files"),
        }
    }

    /// URL of a single file resource.
    pub fn file_url(&self, id: &str) -> String {
        format!("{}/{}", self.files_url, id)
    }
}

impl Default for DriveEndpoints {
    fn default() -> Self {
        Self::with_base_urls(GOOGLE_API_BASE, GOOGLE_OAUTH_BASE)
    }
}
