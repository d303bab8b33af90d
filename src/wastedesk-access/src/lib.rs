//! Wastedesk Access - client-side permission evaluation.
//!
//! Decides what the current session may see and do in the ERP front end:
//! - Route guard (`Allow`, `Pending`, or a redirect)
//! - Any-of gates for screens and action buttons
//! - Module visibility gates
//! - Filtered navigation menu
//!
//! This layer is UI-only. The backend remains the authorization source of
//! truth; everything here fails closed on missing or malformed input.
//!
//! # Evaluation
//!
//! ```text
//!   permission fetch ──► PermissionSet ──► SessionSnapshot
//!                                               │
//!              ┌────────────────┬───────────────┼────────────────┐
//!              ▼                ▼               ▼                ▼
//!       can_enter_route  can_access_if_any  can_access_module  build_nav_entries
//!              │                │               │                │
//!              └────────────────┴──── matcher ──┴────────────────┘
//!                       (wildcard, dotted/underscored variants)
//! ```


mod config;
mod error;
mod matcher;
mod navigation;
mod permission;
mod policy;
mod snapshot;

pub use config::{
    AccessConfig, MenuItem, ModulePolicy, RouteConfig, SubmenuItem, default_menu,
    default_module_policy,
};
pub use error::{ConfigError, Result};
pub use matcher::{satisfies, satisfies_any};
pub use navigation::{NavChild, NavEntry, build, build_nav_entries};
pub use permission::{PermissionCode, PermissionSet, WILDCARD};
pub use policy::{
    RedirectTarget, RouteDecision, RouteGuardSpec, can_access_if_any, can_access_module,
    can_enter_route, has_permission,
};
pub use snapshot::{Identity, PermissionsLoadState, SessionSnapshot};
