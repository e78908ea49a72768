//! Shared HTTP client with connection pooling.
//!
//! Wraps `reqwest::Client` built from [`HttpSettings`]. The client is cheap to
//! clone (internally `Arc`-ed).

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::http::HttpSettings;
use crate::errors::{DriveshError, Result};
use crate::json;

#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    /// Build a new `HttpClient` configured from `settings`.
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        Ok(Self {
            inner: Self::build_client(settings)?,
        })
    }

    /// Build an `HttpClient` using `HttpSettings::default()`.
    pub fn from_defaults() -> Result<Self> {
        Self::new(&HttpSettings::default())
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.inner
    }

    fn build_client(settings: &HttpSettings) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout as u64))
            .connect_timeout(Duration::from_secs(settings.connect_timeout as u64))
            .pool_max_idle_per_host(settings.max_idle_conns_per_host as usize)
            .pool_idle_timeout(Duration::from_secs(settings.idle_conn_timeout as u64))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(DriveshError::Http)
    }
}

/// Read a JSON response into `T`.
///
/// An `error` field in the body wins over the HTTP status; any other
/// non-success status becomes [`DriveshError::Server`].
pub async fn decode_json<T: DeserializeOwned>(resp: reqwest::Response, context: &str) -> Result<T> {
    let status = resp.status();
    let body = resp.text().await.map_err(DriveshError::Http)?;
    json::check_error(&body)?;
    if !status.is_success() {
        return Err(server_error(status, &body, context));
    }
    json::deserialize_response(&body, context)
}

/// Check a response whose body is expected to be empty on success.
pub async fn check_response(resp: reqwest::Response, context: &str) -> Result<()> {
    let status = resp.status();
    let body = resp.text().await.map_err(DriveshError::Http)?;
    json::check_error(&body)?;
    if !status.is_success() {
        return Err(server_error(status, &body, context));
    }
    Ok(())
}

/// Fail with [`DriveshError::Server`] on a non-success status, consuming the
/// body for the message. Successful responses are handed back untouched.
pub async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    json::check_error(&body)?;
    Err(server_error(status, &body, context))
}

fn server_error(status: reqwest::StatusCode, body: &str, context: &str) -> DriveshError {
    tracing::error!(context, status = status.as_u16(), "request failed");
    DriveshError::Server {
        status: status.as_u16(),
        message: format!("{context} failed: {}", body.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_defaults() {
        let client = HttpClient::from_defaults().expect("should build from defaults");
        let _inner = client.client();
    }

    #[test]
    fn test_custom_pool_settings() {
        let settings = HttpSettings {
            timeout: 15,
            connect_timeout: 5,
            idle_conn_timeout: 30,
            max_idle_conns_per_host: 10,
            user_agent: "drivesh-test".into(),
        };
        let client = HttpClient::new(&settings).expect("should build with custom settings");
        let _inner = client.client();
    }

    #[test]
    fn test_clone_is_usable() {
        let client = HttpClient::from_defaults().expect("should build");
        let cloned = client.clone();
        let _inner = cloned.client();
    }

    #[test]
    fn test_server_error_message() {
        let err = server_error(reqwest::StatusCode::BAD_GATEWAY, " upstream \n", "list files");
        match err {
            DriveshError::Server { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "list files failed: upstream");
            }
            other => panic!("expected Server, got {other:?}"),
        }
    }
}
