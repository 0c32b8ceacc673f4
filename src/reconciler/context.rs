//! Reconciliation output
//!
//! [`AppContext`] is the payload handed back to the frontend:
//!
//! ```json
//! {
//!   "module_display_name": "Checkout",
//!   "module_name": "ps_checkout",
//!   "module_version": "4.0.0",
//!   "platform_version": "8.1.0",
//!   "runtime_version": "8.2.10",
//!   "locale": "en",
//!   "help_url": "https://...",
//!   "dependencies": {
//!     "ps_mbo": { "installed": false, "enabled": false, "current_version": null }
//!   }
//! }
//! ```

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::host::ModuleAction;
use crate::manifest::DependencyDeclaration;

/// Keys owned by the reconciler; manifest metadata never overrides them
const RESERVED_KEYS: &[&str] = &[
    "installed",
    "enabled",
    "current_version",
    "min_version",
    "install",
    "enable",
    "upgrade",
];

/// Admin URLs acting on a dependency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionRoutes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade: Option<String>,
}

impl ActionRoutes {
    pub fn set(&mut self, action: ModuleAction, url: String) {
        match action {
            ModuleAction::Install => self.install = Some(url),
            ModuleAction::Enable => self.enable = Some(url),
            ModuleAction::Upgrade => self.upgrade = Some(url),
        }
    }
}

/// Live status of one dependency merged with its declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyStatus {
    #[serde(skip)]
    pub name: String,

    /// Free-form fields of the declaration
    #[serde(flatten)]
    pub metadata: Map<String, Value>,

    pub installed: bool,

    pub enabled: bool,

    pub current_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,

    #[serde(flatten)]
    pub routes: ActionRoutes,
}

impl DependencyStatus {
    /// Status of a declared module absent from the registry
    pub fn missing(declaration: &DependencyDeclaration) -> Self {
        Self::from_declaration(declaration, false, false, None)
    }

    /// Status of a declared module found in the registry
    pub fn found(declaration: &DependencyDeclaration, enabled: bool, version: String) -> Self {
        Self::from_declaration(declaration, true, enabled, Some(version))
    }

    fn from_declaration(
        declaration: &DependencyDeclaration,
        installed: bool,
        enabled: bool,
        current_version: Option<String>,
    ) -> Self {
        let mut metadata = declaration.metadata.clone();
        metadata.retain(|key, _| !RESERVED_KEYS.contains(&key.as_str()));

        Self {
            name: declaration.name.clone(),
            metadata,
            installed,
            enabled,
            current_version,
            min_version: declaration.min_version.clone(),
            routes: ActionRoutes::default(),
        }
    }

    /// Installed and enabled
    pub fn is_met(&self) -> bool {
        self.installed && self.enabled
    }
}

/// Everything the frontend needs to decide whether the module can start
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppContext {
    pub module_display_name: String,
    pub module_name: String,
    pub module_version: String,
    pub platform_version: String,
    pub runtime_version: String,
    pub locale: String,
    pub help_url: String,
    #[serde(serialize_with = "serialize_dependencies")]
    pub dependencies: Vec<DependencyStatus>,
}

impl AppContext {
    /// True iff every dependency is installed and enabled
    pub fn are_dependencies_met(&self) -> bool {
        self.dependencies.iter().all(DependencyStatus::is_met)
    }

    /// Status of a dependency by name
    pub fn dependency(&self, name: &str) -> Option<&DependencyStatus> {
        self.dependencies.iter().find(|d| d.name == name)
    }

    /// JSON rendering of the context
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Dependencies are kept in manifest order and rendered as a name-keyed object
fn serialize_dependencies<S>(
    dependencies: &[DependencyStatus],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(dependencies.len()))?;
    for dependency in dependencies {
        map.serialize_entry(&dependency.name, dependency)?;
    }
    map.end()
}
