pub mod gdrive;

use async_trait::async_trait;

use crate::errors::Result;

/// Common trait for cloud service integrations.
#[async_trait]
pub trait CloudClient: Send + Sync {
    /// Display name of the provider (e.g. "Google Drive").
    fn name(&self) -> &str;

    /// Make sure the session holds usable credentials, refreshing them if
    /// they have expired.
    async fn authenticate(&mut self) -> Result<()>;
}
