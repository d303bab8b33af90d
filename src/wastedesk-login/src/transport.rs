//! Collaborator interfaces consumed by [`crate::AuthSession`].

use async_trait::async_trait;

use crate::error::TransportError;
use crate::types::{LoginResponse, OtpVerification};

/// Credential and OTP exchange with the auth backend.
#[async_trait]
pub trait AuthTransport: Send + Sync {
    /// Submits credentials.
    async fn login(
        &self,
        username_or_email: &str,
        password: &str,
    ) -> Result<LoginResponse, TransportError>;

    /// Asks the backend to (re)send a one-time password.
    async fn send_otp(&self, username_or_email: &str) -> Result<(), TransportError>;

    /// Exchanges a one-time password for an identity and token.
    async fn verify_otp(
        &self,
        username_or_email: &str,
        code: &str,
    ) -> Result<OtpVerification, TransportError>;
}

/// Permission list retrieval.
#[async_trait]
pub trait PermissionTransport: Send + Sync {
    /// Fetches the flat permission list for `token`. `"*"` is a valid element.
    async fn fetch_permissions(&self, token: &str) -> Result<Vec<String>, TransportError>;
}
