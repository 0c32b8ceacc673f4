//! Host platform capabilities
//!
//! The reconciler never reaches into the host directly. Everything it needs (module
//! registry, module manager, admin router, request context) is injected through the
//! traits below, so tests can substitute in-memory fakes.

pub mod snapshot;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, host};

/// Shop identifier in a multi-shop context
pub type ShopId = u32;

/// A row of the host module registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// Registry identifier
    pub id: u64,
    /// Registry-level active flag
    pub active: bool,
    /// Installed version
    pub version: String,
}

/// A module found on disk by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInstance {
    /// Technical name
    pub name: String,
    /// Version shipped on disk
    pub version: String,
}

/// What to hand to the host install primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallSource<'a> {
    /// Let the host locate the module by name
    Name,
    /// Install from a package archive
    Archive(&'a Path),
}

/// Module manager actions exposed as admin routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleAction {
    Install,
    Enable,
    Upgrade,
}

impl ModuleAction {
    /// All actions, in output order
    pub const ALL: [ModuleAction; 3] = [Self::Install, Self::Enable, Self::Upgrade];

    /// Action name as used by the admin router
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Enable => "enable",
            Self::Upgrade => "upgrade",
        }
    }
}

impl fmt::Display for ModuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read access to the host module registry
pub trait ModuleRegistry {
    /// Registry row of a module, `None` when it was never installed
    fn find(&self, name: &str) -> Result<Option<ModuleRecord>>;

    /// Number of the given shops in which the module is active
    fn count_active_shops(&self, module_id: u64, shop_ids: &[ShopId]) -> Result<usize>;

    /// The module as found on disk, `None` when it cannot be located
    fn instance(&self, name: &str) -> Option<ModuleInstance>;

    /// Whether the module is installed
    fn is_installed(&self, name: &str) -> bool;

    /// Whether the module is enabled in the current context
    fn is_enabled(&self, name: &str) -> bool;
}

/// Install and activation primitives of the host
pub trait ModuleManager {
    fn install(&self, name: &str, source: InstallSource<'_>) -> Result<bool>;

    fn enable(&self, name: &str) -> Result<bool>;

    fn uninstall(&self, name: &str) -> Result<bool>;
}

/// Admin URL generation
pub trait Router {
    /// URL of a module manager action for a module
    fn module_action(&self, action: ModuleAction, module_name: &str) -> Result<String>;
}

/// Facts about the running host and the current admin request
pub trait ContextProvider {
    /// Host platform version, e.g. `8.1.2` or `1.7.8.10`
    fn platform_version(&self) -> String;

    /// Runtime version reported to the frontend
    fn runtime_version(&self) -> String;

    /// Language preference of the current operator
    fn operator_locale(&self) -> Option<String>;

    /// Shops of the current multi-shop context
    fn shop_ids(&self) -> Vec<ShopId>;
}

/// The capabilities a reconciliation runs against
#[derive(Clone, Copy)]
pub struct HostServices<'a> {
    pub registry: &'a dyn ModuleRegistry,
    pub context: &'a dyn ContextProvider,
    pub manager: Option<&'a dyn ModuleManager>,
    pub router: Option<&'a dyn Router>,
}

impl<'a> HostServices<'a> {
    /// Services with only the read-side capabilities
    pub fn new(registry: &'a dyn ModuleRegistry, context: &'a dyn ContextProvider) -> Self {
        Self {
            registry,
            context,
            manager: None,
            router: None,
        }
    }

    #[must_use]
    pub fn with_manager(mut self, manager: &'a dyn ModuleManager) -> Self {
        self.manager = Some(manager);
        self
    }

    #[must_use]
    pub fn with_router(mut self, router: &'a dyn Router) -> Self {
        self.router = Some(router);
        self
    }

    /// The module manager, or `HostUnavailable`
    pub fn manager(&self) -> Result<&'a dyn ModuleManager> {
        self.manager.ok_or_else(|| host::unavailable("module manager"))
    }

    /// The admin router, or `HostUnavailable`
    pub fn router(&self) -> Result<&'a dyn Router> {
        self.router.ok_or_else(|| host::unavailable("router"))
    }
}
