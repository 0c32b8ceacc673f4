//! Command helper utilities
//!
//! Every command works against the same set of collaborators: the host snapshot, the
//! owning module's directory, settings, and the marketplace client. [`Session`] wires
//! them together once.

use std::path::{Path, PathBuf};

use serde::Serialize;

use mbo_installer::error::{MboError, Result, fs};
use mbo_installer::host::snapshot::SnapshotHost;
use mbo_installer::{
    DependencyBuilder, HostServices, HttpMarketplace, Installer, ModuleDescriptor, Settings,
};

use crate::cli::HostOptions;

/// Resolve the module directory to an absolute path
///
/// Relative paths are taken from the current directory.
pub fn resolve_module_dir(module_dir: &Path) -> Result<PathBuf> {
    if module_dir.is_absolute() {
        return Ok(module_dir.to_path_buf());
    }
    let current_dir = std::env::current_dir().map_err(|e| MboError::IoError {
        message: format!("Failed to get current directory: {e}"),
        source: Some(Box::new(e)),
    })?;
    Ok(current_dir.join(module_dir))
}

/// Print a value as pretty JSON on stdout
pub fn print_json(value: &impl Serialize) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| fs::io_error(format!("Failed to render JSON output: {e}")))?;
    println!("{rendered}");
    Ok(())
}

/// Collaborators shared by every command
pub struct Session {
    snapshot_path: PathBuf,
    module_dir: PathBuf,
    host: SnapshotHost,
    settings: Settings,
    marketplace: HttpMarketplace,
}

impl Session {
    pub fn open(options: &HostOptions) -> Result<Self> {
        let mut settings = Settings::from_env()?;
        if let Some(url) = &options.marketplace_url {
            settings.marketplace_url.clone_from(url);
        }

        let host = SnapshotHost::load(&options.snapshot)?;
        let marketplace = HttpMarketplace::from_settings(&settings)?;
        tracing::debug!(
            "host snapshot {} on platform {}",
            options.snapshot.display(),
            host.snapshot().platform_version
        );

        Ok(Self {
            snapshot_path: options.snapshot.clone(),
            module_dir: resolve_module_dir(&options.module_dir)?,
            host,
            settings,
            marketplace,
        })
    }

    /// Host capabilities; the router is only offered when the snapshot has an admin URL
    pub fn services(&self) -> HostServices<'_> {
        let services = HostServices::new(&self.host, &self.host).with_manager(&self.host);
        if self.host.has_router() {
            services.with_router(&self.host)
        } else {
            services
        }
    }

    pub fn builder(&self) -> DependencyBuilder<'_> {
        let owner = self.host.snapshot().owner;
        let module = ModuleDescriptor {
            name: owner.name,
            display_name: owner.display_name,
            version: owner.version,
            local_path: self.module_dir.clone(),
        };
        DependencyBuilder::new(module, self.services(), &self.marketplace, &self.settings)
    }

    pub fn installer(&self) -> Result<Installer<'_>> {
        let platform_version = self.host.snapshot().platform_version;
        Installer::new(
            &self.host,
            &self.marketplace,
            &self.settings,
            &platform_version,
        )
    }

    /// The admin request URL, defaulting to the snapshot's admin URL
    pub fn request_url(&self, url: Option<&str>) -> String {
        url.map(str::to_string)
            .or_else(|| self.host.snapshot().admin_url)
            .unwrap_or_default()
    }

    /// Persist the host state back to the snapshot file
    pub fn save(&self) -> Result<()> {
        self.host.save(&self.snapshot_path)?;
        tracing::debug!("host snapshot written to {}", self.snapshot_path.display());
        Ok(())
    }
}
