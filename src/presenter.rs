//! Installation state of a single module

use serde::Serialize;

use crate::host::ModuleRegistry;

/// Ground truth of the host registry for one module, recomputed on every call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationState {
    pub is_present_on_disk: bool,
    pub is_installed: bool,
    pub is_enabled: bool,
    pub version: Option<String>,
}

impl InstallationState {
    /// Installed and enabled
    pub fn is_ready(&self) -> bool {
        self.is_installed && self.is_enabled
    }
}

/// Read-only view of the host module registry
pub struct Presenter<'a> {
    registry: &'a dyn ModuleRegistry,
}

impl<'a> Presenter<'a> {
    pub fn new(registry: &'a dyn ModuleRegistry) -> Self {
        Self { registry }
    }

    /// Current state of a module. A module that cannot be located reads as all-false.
    pub fn present(&self, module_name: &str) -> InstallationState {
        let Some(instance) = self.registry.instance(module_name) else {
            tracing::debug!("{module_name} is not present on disk");
            return InstallationState::default();
        };

        let state = InstallationState {
            is_present_on_disk: true,
            is_installed: self.registry.is_installed(module_name),
            is_enabled: self.registry.is_enabled(module_name),
            version: Some(instance.version),
        };
        tracing::debug!(
            "{module_name}: installed={} enabled={} version={:?}",
            state.is_installed,
            state.is_enabled,
            state.version
        );
        state
    }
}
