//! Dependency reconciliation
//!
//! This module handles:
//! - Reading the owning module's dependency manifest
//! - Probing the host registry for every declared dependency, plus the implicitly
//!   required companion module
//! - Merging declarations, live state, and admin action routes into an [`AppContext`]
//! - Installing or enabling the companion module when the request asks for it, and
//!   telling the caller to answer with a [`ShortCircuitPayload`] instead of the page
//!
//! Conceptually a request moves from `LAUNCHABLE` to `MBO_INSTALL_IN_PROGRESS` when it
//! carries the trigger parameter and the companion is missing or disabled. Nothing of
//! that state is persisted; every call reads the registry afresh.

pub mod context;
pub mod outcome;


use std::path::PathBuf;

use crate::config::{HelpUrls, Settings};
use crate::error::Result;
use crate::host::{HostServices, ModuleAction, ModuleRecord};
use crate::installer::Installer;
use crate::manifest::{DependencyDeclaration, Manifest};
use crate::marketplace::MarketplaceClient;
use crate::presenter::Presenter;
use crate::version::PlatformVersion;

pub use context::{ActionRoutes, AppContext, DependencyStatus};
pub use outcome::{ReconciliationOutcome, RequestContext, ShortCircuitPayload};

/// The module whose dependencies are reconciled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Technical name
    pub name: String,
    /// Name shown to operators
    pub display_name: String,
    /// Installed version
    pub version: String,
    /// Install directory, where the manifest lives
    pub local_path: PathBuf,
}

/// Builds dependency status for a module and bootstraps the companion module
pub struct DependencyBuilder<'a> {
    module: ModuleDescriptor,
    host: HostServices<'a>,
    marketplace: &'a dyn MarketplaceClient,
    settings: &'a Settings,
}

impl<'a> DependencyBuilder<'a> {
    pub fn new(
        module: ModuleDescriptor,
        host: HostServices<'a>,
        marketplace: &'a dyn MarketplaceClient,
        settings: &'a Settings,
    ) -> Self {
        Self {
            module,
            host,
            marketplace,
            settings,
        }
    }

    /// Host platform version
    pub fn platform_version(&self) -> Result<PlatformVersion> {
        PlatformVersion::parse(&self.host.context.platform_version())
    }

    /// Whether the host platform needs the companion module
    pub fn is_companion_required(&self) -> Result<bool> {
        Ok(self.platform_version()? >= self.settings.companion_required_from)
    }

    /// Entry point for an admin request.
    ///
    /// Without the trigger parameter (or on platforms that do not need the companion)
    /// this only builds the context. With it, a missing companion is installed, or a
    /// disabled one enabled, and the caller is told to short-circuit the response.
    /// Errors of that action end up in the payload; errors while building the context
    /// are returned.
    pub fn handle_dependencies(&self, request: &RequestContext) -> Result<ReconciliationOutcome> {
        if request.has_parameter(&self.settings.trigger_parameter)
            && self.is_companion_required()?
        {
            if let Some(payload) = self.run_companion_action() {
                return Ok(ReconciliationOutcome::ShortCircuit(payload));
            }
        }

        Ok(ReconciliationOutcome::Continue(
            self.build_dependencies_context(request)?,
        ))
    }

    /// Install (or else enable) the companion module.
    /// Returns `None` when it is already installed and enabled.
    fn run_companion_action(&self) -> Option<ShortCircuitPayload> {
        let companion = &self.settings.companion.name;
        let state = Presenter::new(self.host.registry).present(companion);
        if state.is_ready() {
            tracing::debug!("{companion} already installed and enabled, nothing to trigger");
            return None;
        }

        let result = Installer::from_host(&self.host, self.marketplace, self.settings).and_then(
            |installer| {
                if state.is_installed {
                    installer.enable_module(companion)
                } else {
                    installer.install_module(companion)
                }
            },
        );

        let payload = match result {
            Ok(status) => ShortCircuitPayload::status(companion.as_str(), status),
            Err(e) => {
                tracing::warn!("triggered action on {companion} failed: {e}");
                ShortCircuitPayload::failure(companion.as_str(), e.to_string())
            }
        };
        tracing::info!("short-circuiting request with {companion} status {}", payload.status);
        Some(payload)
    }

    /// Dependency status without action routes
    pub fn build_dependencies(&self) -> Result<AppContext> {
        self.build(None)
    }

    /// Dependency status with `install`/`enable`/`upgrade` routes for every dependency.
    ///
    /// The companion's install route points back at the current request with the
    /// trigger parameter, so the frontend goes through [`Self::handle_dependencies`].
    pub fn build_dependencies_context(&self, request: &RequestContext) -> Result<AppContext> {
        self.build(Some(request))
    }

    /// True iff every declared (and implicit) dependency is installed and enabled
    pub fn are_dependencies_met(&self) -> Result<bool> {
        Ok(self.build_dependencies()?.are_dependencies_met())
    }

    /// Locale of the current operator, or the default one
    pub fn resolve_locale(&self) -> String {
        self.host
            .context
            .operator_locale()
            .map(|locale| locale.trim().to_string())
            .filter(|locale| !locale.is_empty())
            .unwrap_or_else(|| self.settings.default_locale.clone())
    }

    /// Help URL for a locale, from the manifest table when it ships one
    pub fn help_url(&self, manifest: &Manifest, locale: &str) -> String {
        let builtin = &self.settings.help_urls;
        let default_locale = &self.settings.default_locale;

        match &manifest.help_url {
            None => builtin.resolve(locale, default_locale).to_string(),
            Some(document) => match HelpUrls::from_document(document, builtin) {
                Some(table) => table.resolve(locale, default_locale).to_string(),
                None => {
                    tracing::warn!(
                        "ignoring malformed help_url in {}",
                        manifest.path.display()
                    );
                    builtin.default_url().to_string()
                }
            },
        }
    }

    fn build(&self, routes_for: Option<&RequestContext>) -> Result<AppContext> {
        let manifest = Manifest::locate(&self.module.local_path, self.settings)?;
        let platform = self.platform_version()?;
        let locale = self.resolve_locale();
        let help_url = self.help_url(&manifest, &locale);

        let mut declarations = manifest.dependencies.clone();
        if let Some(companion) = self.implicit_companion(&manifest, &platform) {
            declarations.push(companion);
        }

        let mut dependencies = Vec::with_capacity(declarations.len());
        for declaration in &declarations {
            let mut status = self.live_status(declaration, &platform)?;
            if let Some(request) = routes_for {
                status.routes = self.routes(&declaration.name, request)?;
            }
            dependencies.push(status);
        }

        Ok(AppContext {
            module_display_name: self.module.display_name.clone(),
            module_name: self.module.name.clone(),
            module_version: self.module.version.clone(),
            platform_version: platform.to_string(),
            runtime_version: self.host.context.runtime_version(),
            locale,
            help_url,
            dependencies,
        })
    }

    /// The companion entry to append, if the platform needs it, the manifest does not
    /// already declare it, and it is not installed and enabled yet
    fn implicit_companion(
        &self,
        manifest: &Manifest,
        platform: &PlatformVersion,
    ) -> Option<DependencyDeclaration> {
        let companion = &self.settings.companion.name;
        if *platform < self.settings.companion_required_from || manifest.declares(companion) {
            return None;
        }
        if Presenter::new(self.host.registry).present(companion).is_ready() {
            return None;
        }
        Some(DependencyDeclaration::named(companion.as_str()))
    }

    fn live_status(
        &self,
        declaration: &DependencyDeclaration,
        platform: &PlatformVersion,
    ) -> Result<DependencyStatus> {
        let Some(record) = self.host.registry.find(&declaration.name)? else {
            tracing::debug!("{} is not installed", declaration.name);
            return Ok(DependencyStatus::missing(declaration));
        };

        let enabled = self.is_enabled(&record, platform)?;
        tracing::debug!(
            "{} {} installed, enabled={enabled}",
            declaration.name,
            record.version
        );
        Ok(DependencyStatus::found(declaration, enabled, record.version))
    }

    /// Recent platforms trust the registry flag. Older ones require the module to be
    /// active in every shop of the current context.
    fn is_enabled(&self, record: &ModuleRecord, platform: &PlatformVersion) -> Result<bool> {
        if *platform >= self.settings.registry_active_flag_from {
            return Ok(record.active);
        }

        let shops = self.host.context.shop_ids();
        if shops.is_empty() {
            return Ok(false);
        }
        let active_shops = self.host.registry.count_active_shops(record.id, &shops)?;
        Ok(active_shops == shops.len())
    }

    fn routes(&self, module_name: &str, request: &RequestContext) -> Result<ActionRoutes> {
        let router = self.host.router()?;
        let mut routes = ActionRoutes::default();

        for action in ModuleAction::ALL {
            let url = if action == ModuleAction::Install
                && module_name == self.settings.companion.name
            {
                request.url_with_parameter(&self.settings.trigger_parameter)
            } else {
                router.module_action(action, module_name)?
            };
            routes.set(action, url);
        }

        Ok(routes)
    }
}
