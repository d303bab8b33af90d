//! Wastedesk Login - session lifecycle for the ERP front end.
//!
//! Provides:
//! - [`AuthSession`]: restore, login, OTP, permission loading, logout
//! - Transport traits for the auth and permission backends, with a
//!   reqwest-backed [`HttpTransport`]
//! - Persistent stores ([`MemoryStore`], [`FileStore`])
//!
//! Session facts are published as [`wastedesk_access::SessionSnapshot`]s and
//! evaluated by the policy functions in `wastedesk-access`.
//!
//! # Lifecycle
//!
//! ```text
//!  restore() ──valid──► identity+token ──► load_permissions() ──► Loaded | Failed
//!     │                      ▲
//!   invalid            login() / verify_otp()
//!     │                      │
//!     ▼                 requires OTP ──► logout()
//!  discard all ◄────────── logout()
//! ```

// Core modules
pub mod constants;
mod error;
mod token;
mod types;
mod utils;

// Collaborators
mod http;
mod storage;
mod transport;

// Session
mod session;

pub use constants::{
    API_URL_ENV_VAR, DEFAULT_API_URL, DEFAULT_STORE_DIR, PERMISSIONS_KEY, SESSION_KEY,
};
pub use error::{Result, SessionError, StoreError, TransportError};
pub use http::{HttpTransport, HttpTransportConfig};
pub use session::AuthSession;
pub use storage::{FileStore, MemoryStore, SessionStore};
pub use token::is_well_formed_token;
pub use transport::{AuthTransport, PermissionTransport};
pub use types::{Credentials, LoginOutcome, LoginResponse, OtpVerification};
pub use utils::mask_login;
