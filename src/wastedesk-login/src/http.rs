//! HTTP implementation of the auth and permission transports.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::constants::{API_URL_ENV_VAR, DEFAULT_API_URL, USER_AGENT};
use crate::error::TransportError;
use crate::transport::{AuthTransport, PermissionTransport};
use crate::types::{LoginResponse, OtpVerification};

/// Configuration for [`HttpTransport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpTransportConfig {
    /// API base URL; endpoint paths are appended to it.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    pub login_path: String,
    pub send_otp_path: String,
    pub verify_otp_path: String,
    pub permissions_path: String,
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            login_path: "/auth/login".to_string(),
            send_otp_path: "/auth/send-otp".to_string(),
            verify_otp_path: "/auth/verify-otp".to_string(),
            permissions_path: "/auth/permissions".to_string(),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl HttpTransportConfig {
    /// Defaults, with the base URL taken from `WASTEDESK_API_URL` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(API_URL_ENV_VAR) {
            if !url.trim().is_empty() {
                tracing::debug!(base_url = %url, "Using API URL from environment");
                config.base_url = url.trim().to_string();
            }
        }
        config
    }

    /// Builder: set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Permission payloads come either bare or wrapped.
#[derive(Deserialize)]
#[serde(untagged)]
enum PermissionsBody {
    List(Vec<serde_json::Value>),
    Wrapped { permissions: Vec<serde_json::Value> },
}

impl PermissionsBody {
    fn into_codes(self) -> Vec<String> {
        let (Self::List(items) | Self::Wrapped { permissions: items }) = self;
        items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    }
}

/// reqwest-backed transport for both auth and permissions.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: HttpTransportConfig,
}

impl HttpTransport {
    /// Creates a transport, validating the base URL.
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        url::Url::parse(&config.base_url)
            .map_err(|e| TransportError::Config(format!("invalid base_url '{}': {e}", config.base_url)))?;

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, TransportError> {
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = rejection_message(&body)
            .unwrap_or_else(|| format!("request failed with status {status}"));
        tracing::debug!(status = status.as_u16(), %message, "Request rejected");

        Err(TransportError::Rejected {
            status: Some(status.as_u16()),
            message,
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, TransportError> {
        response
            .json::<T>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// Pulls a human-readable reason out of an error body.
fn rejection_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error", "detail"]
        .iter()
        .find_map(|field| value.get(*field).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[async_trait]
impl AuthTransport for HttpTransport {
    async fn login(
        &self,
        username_or_email: &str,
        password: &str,
    ) -> Result<LoginResponse, TransportError> {
        let request = self
            .client
            .post(self.endpoint(&self.config.login_path))
            .json(&json!({ "usernameOrEmail": username_or_email, "password": password }));
        Self::decode(self.send(request).await?).await
    }

    async fn send_otp(&self, username_or_email: &str) -> Result<(), TransportError> {
        let request = self
            .client
            .post(self.endpoint(&self.config.send_otp_path))
            .json(&json!({ "usernameOrEmail": username_or_email }));
        self.send(request).await?;
        Ok(())
    }

    async fn verify_otp(
        &self,
        username_or_email: &str,
        code: &str,
    ) -> Result<OtpVerification, TransportError> {
        let request = self
            .client
            .post(self.endpoint(&self.config.verify_otp_path))
            .json(&json!({ "usernameOrEmail": username_or_email, "otp": code }));
        Self::decode(self.send(request).await?).await
    }
}

#[async_trait]
impl PermissionTransport for HttpTransport {
    async fn fetch_permissions(&self, token: &str) -> Result<Vec<String>, TransportError> {
        let request = self
            .client
            .get(self.endpoint(&self.config.permissions_path))
            .bearer_auth(token);
        let body: PermissionsBody = Self::decode(self.send(request).await?).await?;
        Ok(body.into_codes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joining() {
        let transport = HttpTransport::new(
            HttpTransportConfig::default().with_base_url("https://erp.example.com/api/"),
        )
        .unwrap();
        assert_eq!(
            transport.endpoint("/auth/login"),
            "https://erp.example.com/api/auth/login"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpTransport::new(HttpTransportConfig::default().with_base_url("not a url"))
            .unwrap_err();
        assert!(matches!(err, TransportError::Config(_)));
    }

    #[test]
    fn test_rejection_message() {
        assert_eq!(
            rejection_message(r#"{"message":"Invalid OTP"}"#).as_deref(),
            Some("Invalid OTP")
        );
        assert_eq!(rejection_message(r#"{"error":"locked"}"#).as_deref(), Some("locked"));
        assert_eq!(rejection_message("<html>"), None);
        assert_eq!(rejection_message(r#"{"code":7}"#), None);
    }

    #[test]
    fn test_permissions_body_shapes() {
        let bare: PermissionsBody = serde_json::from_str(r#"["A", 1, "B"]"#).unwrap();
        assert_eq!(bare.into_codes(), vec!["A", "B"]);

        let wrapped: PermissionsBody = serde_json::from_str(r#"{"permissions":["*"]}"#).unwrap();
        assert_eq!(wrapped.into_codes(), vec!["*"]);

        assert!(serde_json::from_str::<PermissionsBody>(r#"{"data":[]}"#).is_err());
        assert!(serde_json::from_str::<PermissionsBody>("null").is_err());
    }
}
