//! Access policy gates.
//!
//! All gates are pure functions of a [`SessionSnapshot`] and the gate being checked.
//! Malformed or missing input degrades to deny; nothing here panics or
//! returns an error.

use serde::{Deserialize, Serialize};

use crate::config::{ModulePolicy, RouteConfig};
use crate::matcher::{satisfies, satisfies_any};
use crate::snapshot::{PermissionsLoadState, SessionSnapshot};

/// Guard attached to a protected route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteGuardSpec {
    /// The path being entered.
    pub path: String,
    /// Roles of which the identity must declare at least one. Empty means any role.
    #[serde(default)]
    pub required_roles: Vec<String>,
}

impl RouteGuardSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            required_roles: Vec::new(),
        }
    }

    /// Builder: require one of the given roles.
    #[must_use]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_roles = roles.into_iter().map(Into::into).collect();
        self
    }
}

/// Where a denied route sends the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedirectTarget {
    Login,
    NotAuthorized,
}

impl RedirectTarget {
    /// Resolves the target against configured paths.
    pub fn path<'a>(&self, routes: &'a RouteConfig) -> &'a str {
        match self {
            Self::Login => &routes.login_path,
            Self::NotAuthorized => &routes.not_authorized_path,
        }
    }
}

/// Outcome of the route guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteDecision {
    /// Render the route.
    Allow,
    /// Permissions are still loading; show a waiting state, do not redirect.
    Pending,
    /// Navigate elsewhere.
    RedirectTo(RedirectTarget),
}

impl RouteDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn redirect_target(&self) -> Option<RedirectTarget> {
        match self {
            Self::RedirectTo(target) => Some(*target),
            _ => None,
        }
    }
}

impl std::fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allow => write!(f, "ALLOW"),
            Self::Pending => write!(f, "PENDING"),
            Self::RedirectTo(RedirectTarget::Login) => write!(f, "REDIRECT(login)"),
            Self::RedirectTo(RedirectTarget::NotAuthorized) => write!(f, "REDIRECT(not_authorized)"),
        }
    }
}

/// Decides whether the session may enter a route.
///
/// Rules, first match wins:
/// 1. identity present, permissions not yet settled: `Pending`
/// 2. no identity: redirect to login
/// 3. zero permissions, target is not the not-authorized page: redirect there
/// 4. roles required and none declared: redirect to login
/// 5. otherwise `Allow`
pub fn can_enter_route(
    session: &SessionSnapshot,
    guard: &RouteGuardSpec,
    routes: &RouteConfig,
) -> RouteDecision {
    let Some(identity) = session.identity.as_ref() else {
        return RouteDecision::RedirectTo(RedirectTarget::Login);
    };

    if matches!(
        session.permissions_load_state,
        PermissionsLoadState::NotStarted | PermissionsLoadState::Loading
    ) {
        return RouteDecision::Pending;
    }

    if guard.path != routes.not_authorized_path && session.permissions.is_empty() {
        return RouteDecision::RedirectTo(RedirectTarget::NotAuthorized);
    }

    if !guard.required_roles.is_empty() && !identity.has_any_role(guard.required_roles.as_slice()) {
        return RouteDecision::RedirectTo(RedirectTarget::Login);
    }

    RouteDecision::Allow
}

/// Any-of gate for a single screen or action button.
///
/// A wildcard holder passes regardless of the list. Everyone else needs
/// at least one non-blank code in `any_of` to match.
pub fn can_access_if_any<S: AsRef<str>>(session: &SessionSnapshot, any_of: &[S]) -> bool {
    session.permissions.contains_wildcard() || satisfies_any(&session.permissions, any_of)
}

/// Single-code gate.
pub fn has_permission(session: &SessionSnapshot, code: &str) -> bool {
    satisfies(&session.permissions, code)
}

/// Module visibility gate. Unknown module keys are denied.
pub fn can_access_module(session: &SessionSnapshot, modules: &ModulePolicy, module_key: &str) -> bool {
    match modules.get(module_key) {
        Some(any_of) => can_access_if_any(session, any_of),
        None => {
            tracing::debug!(module = module_key, "Module not configured, denying");
            false
        }
    }
}
