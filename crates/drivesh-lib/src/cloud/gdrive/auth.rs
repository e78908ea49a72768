//! OAuth2 device authorization grant and access-token lifecycle.
//!
//! The `oauth2` crate supplies the typed secrets; the exchanges themselves
//! are plain form posts over the shared [`HttpClient`].

use chrono::{DateTime, TimeDelta, Utc};
use oauth2::{AccessToken, ClientId, ClientSecret, RefreshToken};
use tokio::time::{sleep, Duration, Instant};

use super::models::{DeviceCodeResponse, TokenResponse, DEVICE_GRANT_TYPE, DRIVE_FILE_SCOPE};
use crate::config::credentials::CredentialsFile;
use crate::config::endpoints::DriveEndpoints;
use crate::errors::{DriveshError, Result};
use crate::http_client::{self, HttpClient};
use crate::{json, output};

/// Seconds before expiry at which an access token stops being used.
pub const TOKEN_GRACE_SECONDS: i64 = 10;

/// Added to the poll interval on a `slow_down` answer.
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

/// Operator-facing side of the device flow.
pub trait SignInPrompt: Send + Sync {
    /// Tell the operator where to go and which code to enter.
    fn show_code(&self, verification_url: &str, user_code: &str);

    /// Called before every poll of the token endpoint.
    fn waiting(&self) {}
}

/// Prints the device-flow instructions to the terminal.
pub struct ConsolePrompt;

impl SignInPrompt for ConsolePrompt {
    fn show_code(&self, verification_url: &str, user_code: &str) {
        output::info(&format!(
            "Go to {verification_url} and enter the code {user_code}"
        ));
    }

    fn waiting(&self) {
        output::info("Still waiting for sign-in...");
    }
}

#[derive(Debug, Clone)]
pub struct TokenState {
    expiry: DateTime<Utc>,
    auth_header: String,
}

impl TokenState {
    pub fn new(access_token: &AccessToken, expiry: DateTime<Utc>) -> Self {
        Self {
            expiry,
            auth_header: format!("Bearer {}", access_token.secret()),
        }
    }

    pub fn expiry(&self) -> DateTime<Utc> {
        self.expiry
    }

    /// Value of the `Authorization` header.
    pub fn auth_header(&self) -> &str {
        &self.auth_header
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .checked_sub_signed(TimeDelta::seconds(TOKEN_GRACE_SECONDS))
            .is_some_and(|cutoff| now < cutoff)
    }
}

#[derive(Debug)]
pub struct DriveAuth {
    client_id: ClientId,
    client_secret: ClientSecret,
    refresh_token: Option<RefreshToken>,
    token: Option<TokenState>,
}

impl DriveAuth {
    pub fn new(
        client_id: ClientId,
        client_secret: ClientSecret,
        refresh_token: Option<RefreshToken>,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            refresh_token,
            token: None,
        }
    }

    pub fn from_credentials(credentials: &CredentialsFile) -> Self {
        Self::new(
            credentials.client_id().clone(),
            credentials.client_secret().clone(),
            credentials.refresh_token().cloned(),
        )
    }

    pub fn refresh_token(&self) -> Option<&RefreshToken> {
        self.refresh_token.as_ref()
    }

    pub fn token(&self) -> Option<&TokenState> {
        self.token.as_ref()
    }

    pub fn set_token(&mut self, token: TokenState) {
        self.token = Some(token);
    }

    pub fn token_is_valid(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|t| t.is_valid_at(Utc::now()))
    }

    /// Authorization header for the next request, refreshing first if the
    /// current token is missing or inside the grace period.
    pub async fn authorize(
        &mut self,
        http: &HttpClient,
        endpoints: &DriveEndpoints,
    ) -> Result<String> {
        if !self.token_is_valid() {
            tracing::debug!("access token expired, refreshing");
            self.refresh(http, endpoints).await?;
        }
        self.token
            .as_ref()
            .map(|t| t.auth_header().to_string())
            .ok_or_else(|| DriveshError::Auth("no access token".into()))
    }

    /// Exchange the refresh token for a new access token.
    pub async fn refresh(&mut self, http: &HttpClient, endpoints: &DriveEndpoints) -> Result<()> {
        let refresh_token = self
            .refresh_token
            .as_ref()
            .ok_or_else(|| DriveshError::Auth("no refresh token available".into()))?;

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.secret().as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.secret().as_str()),
        ];
        let resp = http
            .client()
            .post(&endpoints.token_url)
            .form(&params)
            .send()
            .await
            .map_err(DriveshError::Http)?;
        let token: TokenResponse = http_client::decode_json(resp, "token refresh").await?;

        self.install(&token)?;
        tracing::info!(expires_in = token.expires_in, "refreshed access token");
        Ok(())
    }

    /// Run the device authorization grant.
    ///
    /// Returns the refresh token issued to this device; the caller persists it.
    pub async fn sign_in(
        &mut self,
        http: &HttpClient,
        endpoints: &DriveEndpoints,
        prompt: &dyn SignInPrompt,
    ) -> Result<RefreshToken> {
        let resp = http
            .client()
            .post(&endpoints.device_code_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("scope", DRIVE_FILE_SCOPE),
            ])
            .send()
            .await
            .map_err(DriveshError::Http)?;
        let device: DeviceCodeResponse = http_client::decode_json(resp, "device code").await?;

        tracing::info!(
            verification_url = %device.verification_url,
            expires_in = device.expires_in,
            interval = device.interval,
            "device sign-in started"
        );
        prompt.show_code(&device.verification_url, device.user_code.secret());

        let token = self.poll_token(http, endpoints, &device, prompt).await?;
        let refresh_token = token.refresh_token.clone().ok_or_else(|| {
            DriveshError::Protocol("device grant returned no refresh_token".into())
        })?;

        self.install(&token)?;
        self.refresh_token = Some(refresh_token.clone());
        tracing::info!("device sign-in completed");
        Ok(refresh_token)
    }

    async fn poll_token(
        &self,
        http: &HttpClient,
        endpoints: &DriveEndpoints,
        device: &DeviceCodeResponse,
        prompt: &dyn SignInPrompt,
    ) -> Result<TokenResponse> {
        let deadline = Instant::now()
            .checked_add(Duration::from_secs(device.expires_in))
            .ok_or_else(|| {
                DriveshError::Protocol(format!(
                    "device code expires_in {} is out of range",
                    device.expires_in
                ))
            })?;
        let mut interval = Duration::from_secs(device.interval);

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(sign_in_timed_out());
            }
            // No poll may go out once the device code has expired.
            sleep(interval.min(remaining)).await;
            if Instant::now() >= deadline {
                return Err(sign_in_timed_out());
            }
            prompt.waiting();

            let params = [
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.secret().as_str()),
                ("device_code", device.device_code.secret().as_str()),
                ("grant_type", DEVICE_GRANT_TYPE),
            ];
            let resp = http
                .client()
                .post(&endpoints.token_url)
                .form(&params)
                .send()
                .await
                .map_err(DriveshError::Http)?;
            let status = resp.status();
            let body = resp.text().await.map_err(DriveshError::Http)?;

            let pending = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| json::error_object(&v));
            if let Some((error, description)) = pending {
                match error.as_str() {
                    "authorization_pending" => {
                        tracing::debug!("authorization pending");
                    }
                    "slow_down" => {
                        interval += SLOW_DOWN_STEP;
                        tracing::debug!(interval_secs = interval.as_secs(), "slow down");
                    }
                    "access_denied" | "expired_token" => {
                        tracing::error!(error = %error, "device sign-in rejected");
                        return Err(DriveshError::Remote { error, description });
                    }
                    _ => {
                        tracing::debug!(error = %error, description = ?description, "token poll error");
                    }
                }
                continue;
            }

            if !status.is_success() {
                return Err(DriveshError::Server {
                    status: status.as_u16(),
                    message: format!("device token poll failed: {}", body.trim()),
                });
            }
            return json::deserialize_response(&body, "device token");
        }
    }

    fn install(&mut self, token: &TokenResponse) -> Result<()> {
        let expiry = TimeDelta::try_seconds(token.expires_in)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                DriveshError::Protocol(format!(
                    "token expires_in {} is out of range",
                    token.expires_in
                ))
            })?;
        let state = TokenState::new(&token.access_token, expiry);
        tracing::debug!(expiry = %state.expiry(), "installed access token");
        self.token = Some(state);
        Ok(())
    }
}

fn sign_in_timed_out() -> DriveshError {
    tracing::warn!("device sign-in timed out");
    DriveshError::Auth("device sign-in timed out".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn token_expiring_at(expiry: DateTime<Utc>) -> TokenState {
        TokenState::new(&AccessToken::new("ya29.test".into()), expiry)
    }

    #[test]
    fn test_auth_header_is_bearer() {
        let token = token_expiring_at(Utc::now());
        assert_eq!(token.auth_header(), "Bearer ya29.test");
    }

    #[test]
    fn test_validity_at_grace_boundary() {
        let expiry = Utc::now();
        let token = token_expiring_at(expiry);
        let boundary = expiry - TimeDelta::seconds(TOKEN_GRACE_SECONDS);
        assert!(!token.is_valid_at(boundary));
        assert!(token.is_valid_at(boundary - TimeDelta::milliseconds(1)));
        assert!(!token.is_valid_at(expiry));
    }

    #[test]
    fn test_no_token_is_invalid() {
        let auth = DriveAuth::new(
            ClientId::new("id".into()),
            ClientSecret::new("secret".into()),
            None,
        );
        assert!(!auth.token_is_valid());
        assert!(auth.refresh_token().is_none());
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_is_auth_error() {
        let mut auth = DriveAuth::new(
            ClientId::new("id".into()),
            ClientSecret::new("secret".into()),
            None,
        );
        let http = HttpClient::from_defaults().unwrap();
        // Unroutable endpoints: the call must fail before any request.
        let endpoints = DriveEndpoints::with_base_urls("http://127.0.0.1:9", "http://127.0.0.1:9");
        let err = auth.authorize(&http, &endpoints).await.unwrap_err();
        assert!(matches!(err, DriveshError::Auth(_)));
    }

    proptest! {
        #[test]
        fn validity_matches_grace_window(offset_ms in -60_000i64..60_000) {
            let expiry = Utc::now();
            let token = token_expiring_at(expiry);
            let now = expiry - TimeDelta::seconds(TOKEN_GRACE_SECONDS)
                + TimeDelta::milliseconds(offset_ms);
            prop_assert_eq!(token.is_valid_at(now), offset_ms < 0);
        }
    }
}
