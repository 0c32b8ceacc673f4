//! JSON-file-backed host
//!
//! A `SnapshotHost` describes a host platform in one JSON document (platform facts,
//! module registry rows, shops) and implements every host capability on top of it.
//! The CLI and the integration tests run the reconciler against it.
//!
//! ```json
//! {
//!   "platform_version": "8.1.0",
//!   "runtime_version": "8.2.10",
//!   "locale": "fr-FR",
//!   "shop_ids": [1, 2],
//!   "admin_url": "https://shop.test/admin-dev",
//!   "owner": { "name": "ps_checkout", "display_name": "Checkout", "version": "4.0.0" },
//!   "modules": [
//!     { "name": "ps_mbo", "id": 12, "version": "4.0.0", "installed": true,
//!       "active": false, "active_shops": [1] }
//!   ],
//!   "catalog": { "ps_mbo": "4.11.0" }
//! }
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    ContextProvider, InstallSource, ModuleAction, ModuleInstance, ModuleManager, ModuleRecord,
    ModuleRegistry, Router, ShopId,
};
use crate::error::{MboError, Result, fs as fs_error, host};

/// The module owning the manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerModule {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub version: String,
}

/// A module known to the snapshot host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotModule {
    pub name: String,

    #[serde(default)]
    pub id: u64,

    #[serde(default)]
    pub version: String,

    /// Present in the module directory
    #[serde(default = "default_true")]
    pub on_disk: bool,

    #[serde(default)]
    pub installed: bool,

    /// Registry-level active flag
    #[serde(default)]
    pub active: bool,

    /// Shops in which the module is active
    #[serde(default)]
    pub active_shops: Vec<ShopId>,
}

fn default_true() -> bool {
    true
}

/// The serialized host state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub platform_version: String,

    #[serde(default)]
    pub runtime_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    #[serde(default = "default_shops")]
    pub shop_ids: Vec<ShopId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_url: Option<String>,

    #[serde(default)]
    pub owner: OwnerModule,

    #[serde(default)]
    pub modules: Vec<SnapshotModule>,

    /// Modules the host can fetch by name, with the version it would install
    #[serde(default)]
    pub catalog: BTreeMap<String, String>,
}

fn default_shops() -> Vec<ShopId> {
    vec![1]
}

/// Host capabilities backed by a [`HostSnapshot`]
#[derive(Debug)]
pub struct SnapshotHost {
    state: RefCell<HostSnapshot>,
}

impl SnapshotHost {
    pub fn new(snapshot: HostSnapshot) -> Self {
        Self {
            state: RefCell::new(snapshot),
        }
    }

    /// Load a snapshot file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| MboError::IoError {
            message: format!("Failed to read host snapshot {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;
        let snapshot: HostSnapshot = serde_json::from_str(&content).map_err(|e| {
            fs_error::io_error(format!(
                "Failed to parse host snapshot {}: {e}",
                path.display()
            ))
        })?;
        Ok(Self::new(snapshot))
    }

    /// Write the current state back to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&*self.state.borrow())
            .map_err(|e| fs_error::io_error(format!("Failed to serialize host snapshot: {e}")))?;
        fs::write(path, content + "\n").map_err(|e| MboError::IoError {
            message: format!("Failed to write host snapshot {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })
    }

    /// A copy of the current state
    pub fn snapshot(&self) -> HostSnapshot {
        self.state.borrow().clone()
    }

    /// Replace the whole state
    pub fn replace(&self, snapshot: HostSnapshot) {
        *self.state.borrow_mut() = snapshot;
    }

    /// Whether an admin URL is configured, i.e. whether routes can be generated
    pub fn has_router(&self) -> bool {
        self.state.borrow().admin_url.is_some()
    }

    fn with_module<T>(&self, name: &str, f: impl FnOnce(&SnapshotModule) -> T) -> Option<T> {
        self.state
            .borrow()
            .modules
            .iter()
            .find(|m| m.name == name)
            .map(f)
    }

    fn mark_installed(&self, name: &str, version: Option<String>) {
        let mut state = self.state.borrow_mut();
        let shops = state.shop_ids.clone();
        let next_id = state.modules.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        let catalog_version = state.catalog.get(name).cloned();

        let module = match state.modules.iter().position(|m| m.name == name) {
            Some(index) => &mut state.modules[index],
            None => {
                state.modules.push(SnapshotModule {
                    name: name.to_string(),
                    id: 0,
                    version: String::new(),
                    on_disk: true,
                    installed: false,
                    active: false,
                    active_shops: Vec::new(),
                });
                let last = state.modules.len() - 1;
                &mut state.modules[last]
            }
        };

        if module.id == 0 {
            module.id = next_id;
        }
        if let Some(version) = version.or(catalog_version) {
            module.version = version;
        }
        module.on_disk = true;
        module.installed = true;
        module.active = true;
        module.active_shops = shops;
    }
}

/// Version declared by a package archive, read from its `<name>/config.xml` if present
fn archive_version(path: &Path, name: &str) -> Result<Option<String>> {
    let file = File::open(path).map_err(|e| fs_error::extract_failed(path, e.to_string()))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| fs_error::extract_failed(path, e.to_string()))?;

    let prefix = format!("{name}/");
    if !archive.file_names().any(|entry| entry.starts_with(&prefix)) {
        return Err(fs_error::extract_failed(
            path,
            format!("archive does not contain a '{prefix}' directory"),
        ));
    }

    let config = format!("{name}/config.xml");
    let Ok(mut entry) = archive.by_name(&config) else {
        return Ok(None);
    };
    let mut content = String::new();
    std::io::Read::read_to_string(&mut entry, &mut content)
        .map_err(|e| fs_error::extract_failed(path, e.to_string()))?;

    Ok(config_version(&content))
}

/// Text of the first `<version>` element of a module `config.xml`.
///
/// This is not an XML parser. It handles the flat shape module packages ship, where
/// `<version>` appears once, without attributes or nested elements, holding plain text
/// or a single CDATA section. Anything else reads as no version and the catalog
/// version is used instead.
fn config_version(content: &str) -> Option<String> {
    let (_, rest) = content.split_once("<version>")?;
    let (raw, _) = rest.split_once("</version>")?;
    let raw = raw.trim();
    let value = raw
        .strip_prefix("<![CDATA[")
        .and_then(|inner| inner.strip_suffix("]]>"))
        .unwrap_or(raw)
        .trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl ModuleRegistry for SnapshotHost {
    fn find(&self, name: &str) -> Result<Option<ModuleRecord>> {
        Ok(self
            .with_module(name, |m| {
                m.installed.then(|| ModuleRecord {
                    id: m.id,
                    active: m.active,
                    version: m.version.clone(),
                })
            })
            .flatten())
    }

    fn count_active_shops(&self, module_id: u64, shop_ids: &[ShopId]) -> Result<usize> {
        let state = self.state.borrow();
        Ok(state
            .modules
            .iter()
            .find(|m| m.installed && m.id == module_id)
            .map_or(0, |m| {
                shop_ids
                    .iter()
                    .filter(|shop| m.active_shops.contains(shop))
                    .count()
            }))
    }

    fn instance(&self, name: &str) -> Option<ModuleInstance> {
        self.with_module(name, |m| {
            m.on_disk.then(|| ModuleInstance {
                name: m.name.clone(),
                version: m.version.clone(),
            })
        })
        .flatten()
    }

    fn is_installed(&self, name: &str) -> bool {
        self.with_module(name, |m| m.installed).unwrap_or(false)
    }

    fn is_enabled(&self, name: &str) -> bool {
        self.with_module(name, |m| m.installed && m.active)
            .unwrap_or(false)
    }
}

impl ModuleManager for SnapshotHost {
    fn install(&self, name: &str, source: InstallSource<'_>) -> Result<bool> {
        match source {
            InstallSource::Archive(path) => {
                let version = archive_version(path, name)?;
                self.mark_installed(name, version);
                Ok(true)
            }
            InstallSource::Name => {
                let known = self.with_module(name, |m| m.on_disk).unwrap_or(false)
                    || self.state.borrow().catalog.contains_key(name);
                if !known {
                    return Ok(false);
                }
                self.mark_installed(name, None);
                Ok(true)
            }
        }
    }

    fn enable(&self, name: &str) -> Result<bool> {
        if !self.is_installed(name) {
            return Ok(false);
        }
        let mut state = self.state.borrow_mut();
        let shops = state.shop_ids.clone();
        if let Some(module) = state.modules.iter_mut().find(|m| m.name == name) {
            module.active = true;
            module.active_shops = shops;
        }
        Ok(true)
    }

    fn uninstall(&self, name: &str) -> Result<bool> {
        let mut state = self.state.borrow_mut();
        let Some(module) = state
            .modules
            .iter_mut()
            .find(|m| m.name == name && m.installed)
        else {
            return Ok(false);
        };
        module.installed = false;
        module.active = false;
        module.active_shops.clear();
        Ok(true)
    }
}

impl Router for SnapshotHost {
    fn module_action(&self, action: ModuleAction, module_name: &str) -> Result<String> {
        let state = self.state.borrow();
        let admin_url = state
            .admin_url
            .as_deref()
            .ok_or_else(|| host::unavailable("router"))?;
        Ok(format!(
            "{}/improve/modules/manage/action/{action}/{module_name}",
            admin_url.trim_end_matches('/')
        ))
    }
}

impl ContextProvider for SnapshotHost {
    fn platform_version(&self) -> String {
        self.state.borrow().platform_version.clone()
    }

    fn runtime_version(&self) -> String {
        self.state.borrow().runtime_version.clone()
    }

    fn operator_locale(&self) -> Option<String> {
        self.state.borrow().locale.clone()
    }

    fn shop_ids(&self) -> Vec<ShopId> {
        self.state.borrow().shop_ids.clone()
    }
}
