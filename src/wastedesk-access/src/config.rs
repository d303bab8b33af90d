//! Access configuration: guard paths, module policy and the menu definition.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Paths the route guard redirects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Where unauthenticated users are sent.
    pub login_path: String,
    /// The one page reachable with zero permissions.
    pub not_authorized_path: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            not_authorized_path: "/not-authorized".to_string(),
        }
    }
}

/// Module key -> alternative permission codes; any one grants the module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModulePolicy {
    modules: BTreeMap<String, Vec<String>>,
}

impl ModulePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register a module and its alternatives.
    #[must_use]
    pub fn with_module<I, S>(mut self, key: impl Into<String>, any_of: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(key, any_of);
        self
    }

    pub fn insert<I, S>(&mut self, key: impl Into<String>, any_of: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modules
            .insert(key.into(), any_of.into_iter().map(Into::into).collect());
    }

    /// Alternatives for a module, or `None` if the key is not configured.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.modules.get(key).map(Vec::as_slice)
    }

    pub fn is_configured(&self, key: &str) -> bool {
        self.modules.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// A submenu entry with its own any-of requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmenuItem {
    pub label: String,
    pub path: String,
    /// Alternatives gating this item. Empty hides it from everyone but wildcard holders.
    #[serde(default)]
    pub any_of: Vec<String>,
}

impl SubmenuItem {
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            any_of: Vec::new(),
        }
    }

    #[must_use]
    pub fn requires<I, S>(mut self, any_of: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.any_of = any_of.into_iter().map(Into::into).collect();
        self
    }
}

/// A top-level entry of the static menu definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub module_key: String,
    pub label: String,
    #[serde(default)]
    pub icon: String,
    pub path: String,
    #[serde(default)]
    pub submenu: Vec<SubmenuItem>,
}

impl MenuItem {
    pub fn new(
        module_key: impl Into<String>,
        label: impl Into<String>,
        icon: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            module_key: module_key.into(),
            label: label.into(),
            icon: icon.into(),
            path: path.into(),
            submenu: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_submenu(mut self, item: SubmenuItem) -> Self {
        self.submenu.push(item);
        self
    }
}

/// Complete access configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub routes: RouteConfig,
    pub modules: ModulePolicy,
    pub menu: Vec<MenuItem>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            routes: RouteConfig::default(),
            modules: default_module_policy(),
            menu: default_menu(),
        }
    }
}

impl AccessConfig {
    /// Parses and validates a TOML config.
    ///
    /// Sections left out of the document keep their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            modules = config.modules.len(),
            menu_items = config.menu.len(),
            "Loaded access config"
        );
        Ok(config)
    }

    /// Checks the structural rules the builder and guard rely on.
    ///
    /// An unconfigured module key in the menu is not an error: the nav
    /// builder shows such entries to everyone.
    pub fn validate(&self) -> Result<()> {
        if self.routes.login_path.trim().is_empty() {
            return Err(ConfigError::Invalid("routes.login_path is empty".to_string()));
        }
        if self.routes.not_authorized_path.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "routes.not_authorized_path is empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for item in &self.menu {
            if item.module_key.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "menu entry '{}' has an empty module_key",
                    item.label
                )));
            }
            if item.path.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "menu entry '{}' has an empty path",
                    item.module_key
                )));
            }
            if !seen.insert(item.module_key.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate menu module_key '{}'",
                    item.module_key
                )));
            }
            if let Some(sub) = item.submenu.iter().find(|s| s.path.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "submenu entry '{}' under '{}' has an empty path",
                    sub.label, item.module_key
                )));
            }
        }

        for key in self.modules.keys() {
            if !self.menu.iter().any(|m| m.module_key == key) {
                tracing::debug!(module = key, "Module policy has no menu entry");
            }
        }

        Ok(())
    }
}

/// Built-in module policy for the ERP front end.
pub fn default_module_policy() -> ModulePolicy {
    ModulePolicy::new()
        .with_module("dashboard", ["DASHBOARD_VIEW"])
        .with_module(
            "master",
            [
                "MASTER.VIEW",
                "CUSTOMER_VIEW",
                "SITE_VIEW",
                "WASTE_TYPE_VIEW",
                "VEHICLE_VIEW",
            ],
        )
        .with_module(
            "operations",
            ["OPERATIONS.VIEW", "COLLECTION_VIEW", "ROUTE_VIEW", "WEIGHBRIDGE_VIEW"],
        )
        .with_module(
            "finance",
            ["FINANCE.VIEW", "INVOICE_VIEW", "PAYMENT_VIEW", "CREDIT_NOTE_VIEW"],
        )
        .with_module("reports", ["REPORT.VIEW", "REPORT_EXPORT"])
        .with_module("administration", ["USER_MANAGE", "ROLE_MANAGE", "TENANT_MANAGE"])
}

/// Built-in ordered menu definition.
pub fn default_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::new("dashboard", "Dashboard", "gauge", "/dashboard"),
        MenuItem::new("master", "Master Data", "database", "/master")
            .with_submenu(SubmenuItem::new("Customers", "/master/customers").requires(["CUSTOMER_VIEW"]))
            .with_submenu(SubmenuItem::new("Sites", "/master/sites").requires(["SITE_VIEW"]))
            .with_submenu(
                SubmenuItem::new("Waste Types", "/master/waste-types").requires(["WASTE_TYPE_VIEW"]),
            )
            .with_submenu(SubmenuItem::new("Vehicles", "/master/vehicles").requires(["VEHICLE_VIEW"])),
        MenuItem::new("operations", "Operations", "truck", "/operations")
            .with_submenu(
                SubmenuItem::new("Collections", "/operations/collections")
                    .requires(["COLLECTION_VIEW"]),
            )
            .with_submenu(SubmenuItem::new("Routes", "/operations/routes").requires(["ROUTE_VIEW"]))
            .with_submenu(
                SubmenuItem::new("Weighbridge", "/operations/weighbridge")
                    .requires(["WEIGHBRIDGE_VIEW"]),
            ),
        MenuItem::new("finance", "Finance", "receipt", "/finance")
            .with_submenu(SubmenuItem::new("Invoices", "/finance/invoices").requires(["INVOICE_VIEW"]))
            .with_submenu(SubmenuItem::new("Payments", "/finance/payments").requires(["PAYMENT_VIEW"]))
            .with_submenu(
                SubmenuItem::new("Credit Notes", "/finance/credit-notes")
                    .requires(["CREDIT_NOTE_VIEW"]),
            ),
        MenuItem::new("reports", "Reports", "chart", "/reports"),
        MenuItem::new("administration", "Administration", "shield", "/admin")
            .with_submenu(SubmenuItem::new("Users", "/admin/users").requires(["USER_MANAGE"]))
            .with_submenu(SubmenuItem::new("Roles", "/admin/roles").requires(["ROLE_MANAGE"]))
            .with_submenu(SubmenuItem::new("Tenants", "/admin/tenants").requires(["TENANT_MANAGE"])),
        MenuItem::new("help", "Help", "life-buoy", "/help"),
    ]
}
