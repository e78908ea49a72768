//! Google Drive storage session.
//!
//! Signs in with the OAuth2 device flow (or a stored refresh token), mirrors
//! the whole non-trashed file list into a [`TreeCache`], and maps navigation
//! and transfer commands onto the Drive v3 REST API.

pub mod auth;
pub mod models;

use std::path::Path;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, LOCATION};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

use self::auth::{DriveAuth, SignInPrompt};
use self::models::{
    is_folder, AboutResponse, CreateRequest, CreatedFile, FileList, UploadedFile, LIST_QUERY,
};
use crate::cloud::CloudClient;
use crate::config::credentials::CredentialsFile;
use crate::config::endpoints::DriveEndpoints;
use crate::errors::{DriveshError, Result};
use crate::fileops;
use crate::http_client::{self, HttpClient};
use crate::output::progress::create_transfer_progress;
use crate::storage::{Item, Storage, StorageState};

#[derive(Debug)]
pub struct GDriveSession {
    http: HttpClient,
    endpoints: DriveEndpoints,
    auth: DriveAuth,
    state: StorageState,
}

impl GDriveSession {
    /// Authenticate, resolve the root folder and list the drive.
    ///
    /// Uses the refresh token from `credentials` when present; otherwise runs
    /// the device flow through `prompt` and stores the new refresh token back
    /// into the credentials file.
    pub async fn connect(
        credentials: &mut CredentialsFile,
        endpoints: DriveEndpoints,
        http: HttpClient,
        prompt: &dyn SignInPrompt,
    ) -> Result<Self> {
        let mut auth = DriveAuth::from_credentials(credentials);
        if auth.refresh_token().is_some() {
            auth.refresh(&http, &endpoints).await?;
        } else {
            let refresh_token = auth.sign_in(&http, &endpoints, prompt).await?;
            credentials.store_refresh_token(&refresh_token).await?;
        }

        let root = Self::resolve_root(&mut auth, &http, &endpoints).await?;
        tracing::info!(root = %root, "resolved drive root");

        let mut session = Self {
            http,
            endpoints,
            auth,
            state: StorageState::new(root),
        };
        session.request_listing().await?;
        Ok(session)
    }

    pub fn auth(&self) -> &DriveAuth {
        &self.auth
    }

    pub fn endpoints(&self) -> &DriveEndpoints {
        &self.endpoints
    }

    async fn resolve_root(
        auth: &mut DriveAuth,
        http: &HttpClient,
        endpoints: &DriveEndpoints,
    ) -> Result<String> {
        let header = auth.authorize(http, endpoints).await?;
        let resp = http
            .client()
            .get(&endpoints.about_url)
            .header(AUTHORIZATION, header)
            .query(&[("fields", "rootFolderId")])
            .send()
            .await
            .map_err(DriveshError::Http)?;
        let about: AboutResponse = http_client::decode_json(resp, "about").await?;
        Ok(about.root_folder_id)
    }

    async fn authorize(&mut self) -> Result<String> {
        self.auth.authorize(&self.http, &self.endpoints).await
    }

    /// Clear the cache and re-list every page.
    ///
    /// Each page is converted in full before it is appended, so a malformed
    /// page contributes nothing and earlier pages stay cached.
    pub async fn request_listing(&mut self) -> Result<()> {
        self.state.tree_mut().clear();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let header = self.authorize().await?;
            let mut request = self
                .http
                .client()
                .get(&self.endpoints.files_url)
                .header(AUTHORIZATION, header)
                .query(&LIST_QUERY);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let resp = request.send().await.map_err(DriveshError::Http)?;
            let page: FileList = http_client::decode_json(resp, "list files").await?;
            let items = page
                .files
                .into_iter()
                .map(|f| f.into_item())
                .collect::<Result<Vec<Item>>>()?;

            pages += 1;
            tracing::debug!(page = pages, items = items.len(), "listing page");
            self.state.tree_mut().extend(items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::info!(pages, items = self.state.tree().len(), "listed drive");
        Ok(())
    }

    /// Delete `id` on the server, then drop it and anything cached below it.
    async fn delete_by_id(&mut self, id: String) -> Result<()> {
        let header = self.authorize().await?;
        let resp = self
            .http
            .client()
            .delete(self.endpoints.file_url(&id))
            .header(AUTHORIZATION, header)
            .send()
            .await
            .map_err(DriveshError::Http)?;
        http_client::check_response(resp, "delete").await?;

        let removed = self.state.tree_mut().remove_subtree(&id);
        tracing::info!(id = %id, removed, "deleted drive item");
        Ok(())
    }

    async fn write_body(resp: reqwest::Response, path: &Path, name: &str) -> Result<u64> {
        let total = resp.content_length().unwrap_or(0);
        let progress = create_transfer_progress(total, name);
        let mut file = tokio::fs::File::create(path).await?;
        let mut stream = resp.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(DriveshError::Http)?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            progress.inc(chunk.len() as u64);
        }
        file.flush().await?;
        progress.finish_and_clear();
        Ok(written)
    }
}

#[async_trait]
impl CloudClient for GDriveSession {
    fn name(&self) -> &str {
        "Google Drive"
    }

    async fn authenticate(&mut self) -> Result<()> {
        self.authorize().await.map(|_| ())
    }
}

#[async_trait]
impl Storage for GDriveSession {
    fn label(&self) -> &'static str {
        "drive"
    }

    fn state(&self) -> &StorageState {
        &self.state
    }

    async fn return_to_root(&mut self) -> Result<()> {
        self.state.reset_to_root();
        Ok(())
    }

    async fn change_directory(&mut self, name: &str) -> Result<()> {
        let target = if name == ".." {
            self.state
                .tree()
                .find_directory_by_id(self.state.parent())
                .map(|dir| dir.parent_id().to_string())
                .ok_or_else(|| DriveshError::NotFound("no parent directory".into()))?
        } else {
            self.get_directory_id(name)
                .map(str::to_string)
                .ok_or_else(|| DriveshError::NotFound(format!("directory {name}")))?
        };
        tracing::debug!(from = %self.state.parent(), to = %target, "change directory");
        self.state.set_parent(target);
        Ok(())
    }

    async fn create_directory(&mut self, name: &str) -> Result<()> {
        if self.directory_exists(name) {
            return Err(DriveshError::Command(format!(
                "directory {name} already exists"
            )));
        }

        let header = self.authorize().await?;
        let parent = self.state.parent().to_string();
        let resp = self
            .http
            .client()
            .post(&self.endpoints.files_url)
            .header(AUTHORIZATION, header)
            .json(&CreateRequest::folder(name, &parent))
            .send()
            .await
            .map_err(DriveshError::Http)?;
        let created: CreatedFile = http_client::decode_json(resp, "create folder").await?;

        tracing::info!(name, id = %created.id, "created drive folder");
        self.state
            .tree_mut()
            .push(Item::new(name, created.id, parent, true));
        Ok(())
    }

    async fn delete_directory(&mut self, name: &str) -> Result<()> {
        let id = self
            .get_directory_id(name)
            .map(str::to_string)
            .ok_or_else(|| DriveshError::NotFound(format!("directory {name}")))?;
        self.delete_by_id(id).await
    }

    async fn delete_file(&mut self, name: &str) -> Result<()> {
        let id = self
            .get_file_id(name)
            .map(str::to_string)
            .ok_or_else(|| DriveshError::NotFound(format!("file {name}")))?;
        self.delete_by_id(id).await
    }

    async fn reload(&mut self) -> Result<()> {
        self.request_listing().await
    }

    async fn upload_file(&mut self, path: &Path) -> Result<()> {
        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                DriveshError::Command(format!("{} has no file name", path.display()))
            })?;

        let header = self.authorize().await?;
        let parent = self.state.parent().to_string();
        let resp = self
            .http
            .client()
            .post(&self.endpoints.upload_url)
            .header(AUTHORIZATION, header)
            .header("X-Upload-Content-Length", size)
            .query(&[("uploadType", "resumable")])
            .json(&CreateRequest::file(&name, &parent))
            .send()
            .await
            .map_err(DriveshError::Http)?;
        let resp = http_client::ensure_success(resp, "open upload session").await?;
        let session_url = resp
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                DriveshError::Protocol("upload session response has no Location header".into())
            })?;
        tracing::debug!(name = %name, size, "upload session opened");

        let progress = create_transfer_progress(size, &name);
        let tracker = progress.clone();
        let stream = ReaderStream::new(file).inspect(move |chunk| {
            if let Ok(bytes) = chunk {
                tracker.inc(bytes.len() as u64);
            }
        });

        let resp = self
            .http
            .client()
            .put(&session_url)
            .header(CONTENT_LENGTH, size)
            .body(reqwest::Body::wrap_stream(stream))
            .send()
            .await
            .map_err(DriveshError::Http)?;
        let uploaded: UploadedFile = http_client::decode_json(resp, "upload").await?;
        progress.finish_and_clear();

        tracing::info!(name = %uploaded.name, id = %uploaded.id, size, "uploaded file");
        let is_directory = is_folder(&uploaded.mime_type);
        self.state.tree_mut().push(Item::new(
            uploaded.name,
            uploaded.id,
            parent,
            is_directory,
        ));
        Ok(())
    }

    async fn download_file(&mut self, name: &str, path: &Path) -> Result<()> {
        let id = self
            .get_file_id(name)
            .map(str::to_string)
            .ok_or_else(|| DriveshError::NotFound(format!("file {name}")))?;

        let header = self.authorize().await?;
        let resp = self
            .http
            .client()
            .get(self.endpoints.file_url(&id))
            .header(AUTHORIZATION, header)
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(DriveshError::Http)?;
        let resp = http_client::ensure_success(resp, "download").await?;

        // Stream into a sibling so a failed transfer never touches `path`.
        let partial = fileops::temp_sibling(path);
        let bytes = match Self::write_body(resp, &partial, name).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(e);
            }
        };
        if let Err(e) = tokio::fs::rename(&partial, path).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        tracing::info!(name, id = %id, bytes, path = %path.display(), "downloaded file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use oauth2::{AccessToken, ClientId, ClientSecret, RefreshToken};

    /// Session with a cache but no server; only cache-level operations work.
    fn offline_session() -> GDriveSession {
        let mut auth = DriveAuth::new(
            ClientId::new("id".into()),
            ClientSecret::new("secret".into()),
            Some(RefreshToken::new("r".into())),
        );
        auth.set_token(auth::TokenState::new(
            &AccessToken::new("a".into()),
            Utc::now() + ChronoDuration::hours(1),
        ));
        let mut state = StorageState::new("R");
        state.tree_mut().extend([
            Item::new("Saves", "D1", "R", true),
            Item::new("Saves", "D2", "D1", true),
            Item::new("slot1.bin", "F1", "D2", false),
        ]);
        GDriveSession {
            http: HttpClient::from_defaults().unwrap(),
            endpoints: DriveEndpoints::with_base_urls("http://127.0.0.1:9", "http://127.0.0.1:9"),
            auth,
            state,
        }
    }

    #[tokio::test]
    async fn test_nested_same_name_navigation() {
        let mut session = offline_session();
        session.change_directory("Saves").await.unwrap();
        assert_eq!(session.current_parent(), "D1");
        session.change_directory("Saves").await.unwrap();
        assert_eq!(session.current_parent(), "D2");
        assert!(session.file_exists("slot1.bin"));

        session.change_directory("..").await.unwrap();
        assert_eq!(session.current_parent(), "D1");
        session.change_directory("..").await.unwrap();
        assert_eq!(session.current_parent(), "R");
    }

    #[tokio::test]
    async fn test_parent_at_root_is_not_found() {
        let mut session = offline_session();
        let err = session.change_directory("..").await.unwrap_err();
        assert!(matches!(err, DriveshError::NotFound(_)));
        assert_eq!(session.current_parent(), "R");
    }

    #[tokio::test]
    async fn test_return_to_root() {
        let mut session = offline_session();
        session.change_directory("Saves").await.unwrap();
        session.return_to_root().await.unwrap();
        assert_eq!(session.current_parent(), "R");
    }

    #[tokio::test]
    async fn test_create_existing_directory_rejected_without_request() {
        let mut session = offline_session();
        let err = session.create_directory("Saves").await.unwrap_err();
        assert!(matches!(err, DriveshError::Command(_)));
    }

    #[tokio::test]
    async fn test_delete_unknown_file_is_not_found() {
        let mut session = offline_session();
        let err = session.delete_file("ghost.bin").await.unwrap_err();
        assert!(matches!(err, DriveshError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_upload_missing_file_fails_before_network() {
        let mut session = offline_session();
        let err = session
            .upload_file(Path::new("/definitely/not/here.bin"))
            .await
            .unwrap_err();
        assert!(matches!(err, DriveshError::Io(_)));
        assert_eq!(session.state().tree().len(), 3);
    }

    #[test]
    fn test_names() {
        let session = offline_session();
        assert_eq!(session.label(), "drive");
        assert_eq!(CloudClient::name(&session), "Google Drive");
    }
}
