//! Read-only session facts evaluated by the access policy.

use serde::{Deserialize, Serialize};

use crate::permission::PermissionSet;

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// User ID.
    pub id: String,
    /// Name shown in the UI.
    #[serde(default)]
    pub display_name: String,
    /// Roles declared for the user by the server.
    #[serde(default, alias = "roles")]
    pub roles_declared: Vec<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            roles_declared: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles_declared.push(role.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles_declared.iter().any(|r| r == role)
    }

    /// Returns `true` if any declared role appears in `roles`.
    pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|r| self.has_role(r.as_ref()))
    }

    /// Structural check used when restoring persisted state.
    pub fn is_well_formed(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

/// Progress of the permission fetch for the current session.
///
/// ```text
/// NotStarted -> Loading -> Loaded | Failed
/// Failed -> Loading            (retry)
/// any -> NotStarted            (logout, restore failure)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionsLoadState {
    #[default]
    NotStarted,
    Loading,
    Loaded,
    Failed,
}

impl PermissionsLoadState {
    /// Returns `true` once a fetch has completed, successfully or not.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Loaded | Self::Failed)
    }

    /// Returns `true` if the transition is allowed outside of a reset.
    pub fn can_transition_to(&self, next: Self) -> bool {
        match (self, next) {
            (_, Self::NotStarted) => true,
            (Self::NotStarted | Self::Failed | Self::Loaded, Self::Loading) => true,
            (Self::Loading, Self::Loaded | Self::Failed) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for PermissionsLoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::Loading => write!(f, "loading"),
            Self::Loaded => write!(f, "loaded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A point-in-time copy of the session, safe to evaluate without locks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    pub permissions: PermissionSet,
    pub permissions_load_state: PermissionsLoadState,
}

impl SessionSnapshot {
    /// A logged-out snapshot.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A logged-in snapshot whose permissions have loaded.
    pub fn loaded(identity: Identity, permissions: PermissionSet) -> Self {
        Self {
            identity: Some(identity),
            permissions,
            permissions_load_state: PermissionsLoadState::Loaded,
        }
    }

    #[must_use]
    pub fn with_load_state(mut self, state: PermissionsLoadState) -> Self {
        self.permissions_load_state = state;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_roles() {
        let identity = Identity::new("u1", "Dispatcher").with_role("dispatcher");
        assert!(identity.has_role("dispatcher"));
        assert!(!identity.has_role("admin"));
        assert!(identity.has_any_role(&["admin", "dispatcher"]));
        assert!(!identity.has_any_role::<&str>(&[]));
    }

    #[test]
    fn test_identity_well_formed() {
        assert!(Identity::new("u1", "").is_well_formed());
        assert!(!Identity::new("  ", "Nobody").is_well_formed());
    }

    #[test]
    fn test_identity_deserializes_roles_alias() {
        let identity: Identity =
            serde_json::from_str(r#"{"id":"7","displayName":"Ana","roles":["admin"]}"#).unwrap();
        assert_eq!(identity.display_name, "Ana");
        assert_eq!(identity.roles_declared, vec!["admin"]);
    }

    #[test]
    fn test_load_state_transitions() {
        use PermissionsLoadState::*;
        assert!(NotStarted.can_transition_to(Loading));
        assert!(Loading.can_transition_to(Loaded));
        assert!(Loading.can_transition_to(Failed));
        assert!(Failed.can_transition_to(Loading));
        assert!(Loaded.can_transition_to(NotStarted));
        assert!(!NotStarted.can_transition_to(Loaded));
        assert!(!Loading.can_transition_to(Loading));
    }

    #[test]
    fn test_load_state_settled() {
        assert!(!PermissionsLoadState::NotStarted.is_settled());
        assert!(!PermissionsLoadState::Loading.is_settled());
        assert!(PermissionsLoadState::Loaded.is_settled());
        assert!(PermissionsLoadState::Failed.is_settled());
    }
}
