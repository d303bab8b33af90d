//! Type definitions for login and persisted session data.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use wastedesk_access::Identity;

/// Username/password pair submitted at login.
#[derive(Debug)]
pub struct Credentials {
    pub username_or_email: String,
    /// Password (protected in memory).
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username_or_email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username_or_email: username_or_email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Auth transport answer to a login request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    /// The server wants a one-time password before issuing a token.
    #[serde(rename = "requiresOTP", alias = "requiresOtp", alias = "requires_otp", default)]
    pub requires_otp: bool,
    /// Address the OTP was sent to.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "user")]
    pub identity: Option<Identity>,
    #[serde(default)]
    pub token: Option<String>,
}

impl LoginResponse {
    /// A completed login.
    pub fn authenticated(identity: Identity, token: impl Into<String>) -> Self {
        Self {
            requires_otp: false,
            email: None,
            identity: Some(identity),
            token: Some(token.into()),
        }
    }

    /// A login waiting on OTP verification.
    pub fn otp_required(email: impl Into<String>) -> Self {
        Self {
            requires_otp: true,
            email: Some(email.into()),
            identity: None,
            token: None,
        }
    }
}

/// Auth transport answer to a successful OTP verification.
#[derive(Debug, Clone, Deserialize)]
pub struct OtpVerification {
    #[serde(alias = "user")]
    pub identity: Identity,
    pub token: String,
}

/// What [`crate::AuthSession::login`] reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub requires_otp: bool,
    pub email: Option<String>,
    /// Set when the session was established.
    pub identity: Option<Identity>,
}

/// Identity + token blob kept in the persistent store.
#[derive(Serialize, Deserialize)]
pub(crate) struct PersistedSession {
    pub identity: Identity,
    pub token: String,
}
