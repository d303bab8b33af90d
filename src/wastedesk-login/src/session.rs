//! Session lifecycle: restore, login, OTP, permission loading, logout.
//!
//! [`AuthSession`] is the single owner of the process-wide session. Policy
//! code never sees it directly; it evaluates [`SessionSnapshot`]s taken from
//! [`AuthSession::snapshot`] or received through [`AuthSession::subscribe`].
//!
//! Every identity change bumps an internal epoch. A permission fetch records
//! the epoch it started under and its result is dropped if the epoch moved on
//! (logout, or another user logging in) before it resolved.
//!
//! Store writes happen while the state lock is held, so the persisted blob
//! and permission cache always belong to the epoch that is current in memory.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use wastedesk_access::{Identity, PermissionSet, PermissionsLoadState, SessionSnapshot};

use crate::constants::{PERMISSIONS_KEY, SESSION_KEY};
use crate::error::{Result, SessionError, StoreError};
use crate::storage::SessionStore;
use crate::token::is_well_formed_token;
use crate::transport::{AuthTransport, PermissionTransport};
use crate::types::{Credentials, LoginOutcome, PersistedSession};
use crate::utils::mask_login;

#[derive(Default)]
struct SessionState {
    identity: Option<Identity>,
    token: Option<SecretString>,
    permissions: PermissionSet,
    load_state: PermissionsLoadState,
    last_error: Option<String>,
    epoch: u64,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            identity: self.identity.clone(),
            permissions: self.permissions.clone(),
            permissions_load_state: self.load_state,
        }
    }

    fn set_load_state(&mut self, next: PermissionsLoadState) {
        debug_assert!(
            self.load_state.can_transition_to(next),
            "invalid load state transition {} -> {next}",
            self.load_state
        );
        self.load_state = next;
    }

    /// Drops everything and starts a new epoch.
    fn reset(&mut self) {
        let epoch = self.epoch + 1;
        *self = Self {
            epoch,
            ..Self::default()
        };
    }
}

struct Inner {
    auth: Arc<dyn AuthTransport>,
    permissions: Arc<dyn PermissionTransport>,
    store: Arc<dyn SessionStore>,
    state: Mutex<SessionState>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

/// Owner of the current session. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("AuthSession")
            .field("identity", &state.identity)
            .field("has_token", &state.token.is_some())
            .field("permissions", &state.permissions.len())
            .field("load_state", &state.load_state)
            .finish()
    }
}

impl AuthSession {
    /// Creates a logged-out session.
    pub fn new(
        auth: Arc<dyn AuthTransport>,
        permissions: Arc<dyn PermissionTransport>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::anonymous());
        Self {
            inner: Arc::new(Inner {
                auth,
                permissions,
                store,
                state: Mutex::new(SessionState::default()),
                snapshot_tx,
            }),
        }
    }

    /// Creates a session using one transport for both auth and permissions.
    pub fn with_transport<T>(transport: Arc<T>, store: Arc<dyn SessionStore>) -> Self
    where
        T: AuthTransport + PermissionTransport + 'static,
    {
        Self::new(transport.clone(), transport, store)
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &SessionState) {
        self.inner.snapshot_tx.send_replace(state.snapshot());
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Current identity, permissions and load state, copied atomically.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state().snapshot()
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().identity.is_some()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state().identity.clone()
    }

    pub fn permissions_load_state(&self) -> PermissionsLoadState {
        self.state().load_state
    }

    /// Message of the most recent failed permission fetch, cleared on success.
    pub fn last_permission_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    // ------------------------------------------------------------------------
    // Restore
    // ------------------------------------------------------------------------

    /// Restores a previously persisted session.
    ///
    /// Anything that fails validation discards all persisted state and
    /// leaves the session logged out. Cached permissions are only trusted
    /// alongside a valid identity and token.
    pub fn restore(&self) -> Option<SessionSnapshot> {
        let mut state = self.state();
        state.reset();

        let restored = match self.read_persisted() {
            Ok(Some(persisted)) => {
                state.identity = Some(persisted.identity);
                state.token = Some(SecretString::from(persisted.token));
                state.permissions = self.read_cached_permissions();

                tracing::info!(
                    user_id = state.identity.as_ref().map(|i| i.id.as_str()),
                    cached_permissions = state.permissions.len(),
                    "Restored session"
                );
                Some(state.snapshot())
            }
            Ok(None) => {
                tracing::debug!("No persisted session");
                self.discard_persisted();
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding persisted session");
                self.discard_persisted();
                None
            }
        };

        self.publish(&state);
        restored
    }

    /// Restores the session and, if one was found, loads its permissions.
    pub async fn initialize(&self) -> Option<SessionSnapshot> {
        self.restore()?;
        self.load_permissions().await;
        Some(self.snapshot())
    }

    fn read_persisted(&self) -> Result<Option<PersistedSession>> {
        let Some(raw) = self.inner.store.get(SESSION_KEY)? else {
            return Ok(None);
        };

        let persisted: PersistedSession = serde_json::from_str(&raw)
            .map_err(|e| SessionError::MalformedSession(format!("unreadable session blob: {e}")))?;

        if !persisted.identity.is_well_formed() {
            return Err(SessionError::MalformedSession("identity has no id".to_string()));
        }
        if !is_well_formed_token(&persisted.token) {
            return Err(SessionError::MalformedSession(
                "token is not a three-segment bearer token".to_string(),
            ));
        }

        Ok(Some(persisted))
    }

    fn read_cached_permissions(&self) -> PermissionSet {
        match self.inner.store.get(PERMISSIONS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(value) => PermissionSet::from_json(&value),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring unreadable permission cache");
                    PermissionSet::empty()
                }
            },
            Ok(None) => PermissionSet::empty(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read permission cache");
                PermissionSet::empty()
            }
        }
    }

    // ------------------------------------------------------------------------
    // Permissions
    // ------------------------------------------------------------------------

    /// Fetches permissions for the current session.
    ///
    /// On failure the held set is kept and the load state becomes `Failed`.
    /// Returns the set held once the fetch has been applied (or discarded).
    pub async fn load_permissions(&self) -> PermissionSet {
        match self.try_load_permissions().await {
            Ok(set) => set,
            Err(e) => {
                tracing::debug!(error = %e, "Keeping previously held permissions");
                self.state().permissions.clone()
            }
        }
    }

    /// Caller-initiated retry; same as [`load_permissions`](Self::load_permissions).
    pub async fn refresh_permissions(&self) -> PermissionSet {
        self.load_permissions().await
    }

    /// Like [`load_permissions`](Self::load_permissions) but reports fetch failures.
    ///
    /// With no session, or with a fetch already in flight, returns the held
    /// set without starting a request.
    pub async fn try_load_permissions(&self) -> Result<PermissionSet> {
        let (token, epoch) = {
            let mut state = self.state();
            let Some(token) = state.token.as_ref().map(|t| t.expose_secret().to_string()) else {
                tracing::debug!("No session, skipping permission fetch");
                return Ok(state.permissions.clone());
            };
            if state.load_state == PermissionsLoadState::Loading {
                tracing::debug!("Permission fetch already in flight");
                return Ok(state.permissions.clone());
            }
            state.set_load_state(PermissionsLoadState::Loading);
            self.publish(&state);
            (token, state.epoch)
        };

        tracing::debug!(epoch, "Fetching permissions");
        let result = self
            .inner
            .permissions
            .fetch_permissions(&token)
            .await;

        let mut state = self.state();
        if state.epoch != epoch {
            tracing::debug!(
                started = epoch,
                current = state.epoch,
                "Discarding permission result for a replaced session"
            );
            return Ok(state.permissions.clone());
        }

        match result {
            Ok(codes) => {
                let set = PermissionSet::new(codes);
                state.permissions = set.clone();
                state.last_error = None;
                state.set_load_state(PermissionsLoadState::Loaded);
                self.persist_permissions(&set);
                self.publish(&state);

                tracing::info!(count = set.len(), wildcard = set.contains_wildcard(), "Permissions loaded");
                Ok(set)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Permission fetch failed");
                state.last_error = Some(e.to_string());
                state.set_load_state(PermissionsLoadState::Failed);
                self.publish(&state);
                Err(SessionError::PermissionFetch(e))
            }
        }
    }

    /// Writes the permission cache. Callers hold the state lock.
    fn persist_permissions(&self, set: &PermissionSet) {
        let result = serde_json::to_string(set)
            .map_err(|source| StoreError::Serialize {
                key: PERMISSIONS_KEY.to_string(),
                source,
            })
            .and_then(|json| self.inner.store.set(PERMISSIONS_KEY, &json));
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to cache permissions");
        }
    }

    // ------------------------------------------------------------------------
    // Login / OTP
    // ------------------------------------------------------------------------

    /// Submits credentials.
    ///
    /// Without OTP the session is established and permissions are loaded
    /// before returning. When OTP is required any prior session is cleared
    /// first, so nothing from a previous user outlives the OTP screen. A
    /// refused login leaves the session untouched.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome> {
        let login = mask_login(&credentials.username_or_email);
        let response = self
            .inner
            .auth
            .login(
                &credentials.username_or_email,
                credentials.password.expose_secret(),
            )
            .await
            .map_err(|e| {
                tracing::info!(login = %login, error = %e, "Login failed");
                SessionError::from_auth(e)
            })?;

        if response.requires_otp {
            tracing::info!(login = %login, "Login requires OTP, clearing prior session");
            self.logout();
            return Ok(LoginOutcome {
                requires_otp: true,
                email: response.email,
                identity: None,
            });
        }

        let (Some(identity), Some(token)) = (response.identity, response.token) else {
            return Err(SessionError::Authentication(
                "login response is missing identity or token".to_string(),
            ));
        };

        self.establish(identity.clone(), token)?;
        self.load_permissions().await;

        Ok(LoginOutcome {
            requires_otp: false,
            email: response.email,
            identity: Some(identity),
        })
    }

    /// Requests a one-time password.
    pub async fn send_otp(&self, username_or_email: &str) -> Result<()> {
        self.inner
            .auth
            .send_otp(username_or_email)
            .await
            .map_err(SessionError::from_auth)?;
        tracing::info!(login = %mask_login(username_or_email), "OTP sent");
        Ok(())
    }

    /// Verifies a one-time password, establishing the session on success.
    pub async fn verify_otp(&self, username_or_email: &str, code: &str) -> Result<Identity> {
        let verified = self
            .inner
            .auth
            .verify_otp(username_or_email, code)
            .await
            .map_err(SessionError::from_auth)?;

        self.establish(verified.identity.clone(), verified.token)?;
        self.load_permissions().await;
        Ok(verified.identity)
    }

    /// Installs a new identity and token, replacing whatever was there.
    fn establish(&self, identity: Identity, token: String) -> Result<()> {
        if !identity.is_well_formed() {
            return Err(SessionError::MalformedSession(
                "server returned an identity without id".to_string(),
            ));
        }
        if !is_well_formed_token(&token) {
            return Err(SessionError::MalformedSession(
                "server returned a token that is not a three-segment bearer token".to_string(),
            ));
        }

        let blob = serde_json::to_string(&PersistedSession {
            identity: identity.clone(),
            token: token.clone(),
        })
        .map_err(|source| StoreError::Serialize {
            key: SESSION_KEY.to_string(),
            source,
        })?;

        let mut state = self.state();
        state.reset();
        tracing::info!(user_id = %identity.id, epoch = state.epoch, "Session established");
        state.identity = Some(identity);
        state.token = Some(SecretString::from(token));

        // The cache belongs to whoever was logged in before.
        if let Err(e) = self.inner.store.remove(PERMISSIONS_KEY) {
            tracing::warn!(error = %e, "Failed to clear permission cache");
        }
        if let Err(e) = self.inner.store.set(SESSION_KEY, &blob) {
            tracing::warn!(error = %e, "Failed to persist session");
        }
        self.publish(&state);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Logout
    // ------------------------------------------------------------------------

    /// Clears identity, token, permissions and persisted state. Idempotent.
    ///
    /// Any permission fetch still in flight is implicitly cancelled: its
    /// result is discarded when it resolves.
    pub fn logout(&self) {
        let mut state = self.state();
        let was_authenticated = state.identity.is_some();
        state.reset();
        self.discard_persisted();
        self.publish(&state);

        if was_authenticated {
            tracing::info!("Logged out");
        }
    }

    /// Removes the session blob and permission cache. Callers hold the state lock.
    fn discard_persisted(&self) {
        for key in [SESSION_KEY, PERMISSIONS_KEY] {
            if let Err(e) = self.inner.store.remove(key) {
                tracing::warn!(key, error = %e, "Failed to remove persisted state");
            }
        }
    }
}
