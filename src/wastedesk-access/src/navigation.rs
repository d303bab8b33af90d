//! Navigation menu filtering.
//!
//! Navigation display is the one place where an unconfigured module is
//! allowed: a menu entry whose module key has no [`ModulePolicy`] entry is
//! shown to every authenticated user. [`can_access_module`] denies the same
//! key.
//!
//! Submenu items get no such exception: each goes through the any-of gate,
//! so an item with no requirement is shown to wildcard holders only.

use serde::Serialize;

use crate::config::{AccessConfig, MenuItem, ModulePolicy};
use crate::policy::{can_access_if_any, can_access_module};
use crate::snapshot::SessionSnapshot;

/// A rendered top-level navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub module_key: String,
    pub label: String,
    pub icon: String,
    pub path: String,
    pub active: bool,
    /// Visible submenu items, in definition order.
    pub children: Vec<NavChild>,
}

/// A rendered submenu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavChild {
    pub label: String,
    pub path: String,
    pub active: bool,
}

/// Builds the navigation list using the menu and module policy in `config`.
pub fn build_nav_entries(
    session: &SessionSnapshot,
    config: &AccessConfig,
    current_path: &str,
) -> Vec<NavEntry> {
    build(session, &config.modules, &config.menu, current_path)
}

/// Filters `menu` through the module and submenu gates.
///
/// Output order is the definition order.
pub fn build(
    session: &SessionSnapshot,
    modules: &ModulePolicy,
    menu: &[MenuItem],
    current_path: &str,
) -> Vec<NavEntry> {
    menu.iter()
        .filter_map(|item| build_entry(session, modules, item, current_path))
        .collect()
}

fn build_entry(
    session: &SessionSnapshot,
    modules: &ModulePolicy,
    item: &MenuItem,
    current_path: &str,
) -> Option<NavEntry> {
    let visible = !modules.is_configured(&item.module_key)
        || can_access_module(session, modules, &item.module_key);
    if !visible {
        return None;
    }

    let children: Vec<NavChild> = item
        .submenu
        .iter()
        .filter(|sub| can_access_if_any(session, sub.any_of.as_slice()))
        .map(|sub| NavChild {
            label: sub.label.clone(),
            path: sub.path.clone(),
            active: is_active(&sub.path, current_path),
        })
        .collect();

    if !item.submenu.is_empty() && children.is_empty() {
        tracing::trace!(module = %item.module_key, "All submenu items hidden, dropping entry");
        return None;
    }

    let active = is_active(&item.path, current_path) || children.iter().any(|c| c.active);

    Some(NavEntry {
        module_key: item.module_key.clone(),
        label: item.label.clone(),
        icon: item.icon.clone(),
        path: item.path.clone(),
        active,
        children,
    })
}

/// Router active-link rule: exact match or a path-segment prefix.
fn is_active(path: &str, current_path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    if current_path == path {
        return true;
    }
    match current_path.strip_prefix(path) {
        Some(rest) => path.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}
