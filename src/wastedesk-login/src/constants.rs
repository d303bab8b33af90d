//! Constants for the wastedesk-login crate.

/// Store key for the persisted identity + token blob.
pub const SESSION_KEY: &str = "session";

/// Store key for the cached permission list.
pub const PERMISSIONS_KEY: &str = "permissions";

/// Environment variable overriding the API base URL.
pub const API_URL_ENV_VAR: &str = "WASTEDESK_API_URL";

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Directory under the user's home used by [`crate::FileStore::default_location`].
pub const DEFAULT_STORE_DIR: &str = ".wastedesk";

/// User-Agent string for HTTP requests
pub const USER_AGENT: &str = concat!("wastedesk-login/", env!("CARGO_PKG_VERSION"));
