//! Module installation
//!
//! This module handles:
//! - Downloading module packages from the marketplace (recent platforms only)
//! - Storing the package in a temporary file that is removed on every exit path
//! - Handing the package (or just the module name) to the host module manager
//! - Enabling and uninstalling modules through the host

pub mod archive;


use std::io::Write;

use tempfile::NamedTempFile;

use crate::config::Settings;
use crate::error::{Result, fs, transport};
use crate::host::{HostServices, InstallSource, ModuleManager};
use crate::marketplace::{DownloadRequest, MarketplaceClient};
use crate::version::PlatformVersion;

/// Prefix of downloaded package files
const PACKAGE_PREFIX: &str = "mod";

/// Installs and enables modules through the host module manager
pub struct Installer<'a> {
    manager: &'a dyn ModuleManager,
    marketplace: &'a dyn MarketplaceClient,
    settings: &'a Settings,
    platform_version: PlatformVersion,
}

impl<'a> Installer<'a> {
    /// Create an installer for a given host platform version
    pub fn new(
        manager: &'a dyn ModuleManager,
        marketplace: &'a dyn MarketplaceClient,
        settings: &'a Settings,
        platform_version: &str,
    ) -> Result<Self> {
        Ok(Self {
            manager,
            marketplace,
            settings,
            platform_version: PlatformVersion::parse(platform_version)?,
        })
    }

    /// Create an installer from host services.
    ///
    /// Fails with `HostUnavailable` when the host did not provide a module manager.
    pub fn from_host(
        host: &HostServices<'a>,
        marketplace: &'a dyn MarketplaceClient,
        settings: &'a Settings,
    ) -> Result<Self> {
        Self::new(
            host.manager()?,
            marketplace,
            settings,
            &host.context.platform_version(),
        )
    }

    /// Whether packages must be downloaded before installing on this platform
    pub fn downloads_packages(&self) -> bool {
        self.platform_version >= self.settings.download_required_from
    }

    /// Install a module, returning what the host install primitive reported.
    ///
    /// On platforms from `download_required_from` on, the package is downloaded first
    /// and handed over as an archive (or extracted into `extract_dir`). Older hosts
    /// fetch the module themselves and only get its name.
    pub fn install_module(&self, module_name: &str) -> Result<bool> {
        if !self.downloads_packages() {
            tracing::info!(
                "installing {module_name} by name on platform {}",
                self.platform_version
            );
            return self.manager.install(module_name, InstallSource::Name);
        }

        let package = self.download_module(module_name)?;
        let package_path = package.path();
        archive::validate(package_path)?;

        let installed = match &self.settings.extract_dir {
            Some(destination) => {
                archive::extract_module(package_path, module_name, destination)?;
                self.manager.install(module_name, InstallSource::Name)?
            }
            None => self
                .manager
                .install(module_name, InstallSource::Archive(package_path))?,
        };

        tracing::info!("install of {module_name} returned {installed}");
        Ok(installed)
    }

    /// Enable an installed module
    pub fn enable_module(&self, module_name: &str) -> Result<bool> {
        let enabled = self.manager.enable(module_name)?;
        tracing::info!("enable of {module_name} returned {enabled}");
        Ok(enabled)
    }

    /// Uninstall a module
    pub fn uninstall_module(&self, module_name: &str) -> Result<bool> {
        let uninstalled = self.manager.uninstall(module_name)?;
        tracing::info!("uninstall of {module_name} returned {uninstalled}");
        Ok(uninstalled)
    }

    /// Download a module package into a temporary file.
    ///
    /// The file is deleted when the returned handle is dropped.
    pub fn download_module(&self, module_name: &str) -> Result<NamedTempFile> {
        let module_id = self
            .settings
            .marketplace_id(module_name)
            .ok_or_else(|| transport::unknown_module(module_name))?;

        let request = DownloadRequest::new(module_id, self.platform_version.as_str());
        let content = self.marketplace.download(&request)?;

        let dir = &self.settings.download_dir;
        let mut package = tempfile::Builder::new()
            .prefix(PACKAGE_PREFIX)
            .suffix(".zip")
            .tempfile_in(dir)
            .map_err(|e| fs::temp_file_failed(dir, e.to_string()))?;

        package
            .write_all(&content)
            .and_then(|()| package.flush())
            .map_err(|e| fs::temp_file_failed(dir, e.to_string()))?;

        tracing::debug!(
            "stored {} bytes of {module_name} in {}",
            content.len(),
            package.path().display()
        );
        Ok(package)
    }
}
