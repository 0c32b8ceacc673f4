//! Installer settings
//!
//! Every constant the reconciler and the installer branch on lives here, so that the
//! manifest filename, version gates, and marketplace coordinates are data rather than
//! code paths.

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::help::HelpUrls;
use crate::error::{Result, config};
use crate::version::PlatformVersion;

/// Primary manifest filename
pub const MANIFEST_FILENAME: &str = "ps_dependencies.json";

/// Manifest filenames used by earlier releases, tried when the primary one is absent
pub const LEGACY_MANIFEST_FILENAMES: &[&str] = &["module_dependencies.json"];

/// Companion module technical name
pub const COMPANION_MODULE_NAME: &str = "ps_mbo";

/// Companion module marketplace identifier
pub const COMPANION_MODULE_ID: u64 = 39574;

/// Default marketplace endpoint
pub const MARKETPLACE_URL: &str = "https://api-addons.prestashop.com";

/// Query parameter asking for a synchronous install/enable of the companion module
pub const TRIGGER_PARAMETER: &str = "mbo_action_needed";

/// Locale used when the operator has no language preference
pub const DEFAULT_LOCALE: &str = "en";

/// Environment variable overriding the marketplace URL
pub const ENV_MARKETPLACE_URL: &str = "MBO_INSTALLER_MARKETPLACE_URL";

/// Environment variable overriding the HTTP timeout (seconds)
pub const ENV_TIMEOUT_SECS: &str = "MBO_INSTALLER_TIMEOUT_SECS";

/// Environment variable overriding the download directory
pub const ENV_DOWNLOAD_DIR: &str = "MBO_INSTALLER_DOWNLOAD_DIR";

/// The module this library exists to bootstrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionModule {
    /// Technical name
    pub name: String,
    /// Marketplace identifier
    pub marketplace_id: u64,
}

impl Default for CompanionModule {
    fn default() -> Self {
        Self {
            name: COMPANION_MODULE_NAME.to_string(),
            marketplace_id: COMPANION_MODULE_ID,
        }
    }
}

/// Reconciler and installer configuration
#[derive(Debug, Clone)]
pub struct Settings {
    /// Manifest filename inside the owning module directory
    pub manifest_filename: String,

    /// Fallback manifest filenames
    pub legacy_manifest_filenames: Vec<String>,

    /// Implicitly required companion module
    pub companion: CompanionModule,

    /// Platform version from which the companion module is required
    pub companion_required_from: PlatformVersion,

    /// Platform version from which the registry-level active flag decides enablement.
    /// Below it, a module must be active in every shop of the context.
    pub registry_active_flag_from: PlatformVersion,

    /// Platform version from which packages are downloaded before installing
    pub download_required_from: PlatformVersion,

    /// Marketplace base URL
    pub marketplace_url: String,

    /// Known marketplace identifiers by module name
    pub marketplace_ids: BTreeMap<String, u64>,

    /// Query parameter name of the install trigger
    pub trigger_parameter: String,

    /// Locale used when none can be resolved
    pub default_locale: String,

    /// Built-in help URL table
    pub help_urls: HelpUrls,

    /// Marketplace request timeout
    pub http_timeout: Duration,

    /// Maximum number of redirects followed by the marketplace client
    pub max_redirects: usize,

    /// Directory receiving downloaded packages
    pub download_dir: PathBuf,

    /// When set, downloaded archives are extracted here and installed by name
    pub extract_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        let companion = CompanionModule::default();
        let mut marketplace_ids = BTreeMap::new();
        marketplace_ids.insert(companion.name.clone(), companion.marketplace_id);
        marketplace_ids.insert("ps_eventbus".to_string(), 50756);

        Self {
            manifest_filename: MANIFEST_FILENAME.to_string(),
            legacy_manifest_filenames: LEGACY_MANIFEST_FILENAMES
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            companion,
            companion_required_from: known_version(1, 7, 5),
            registry_active_flag_from: known_version(8, 0, 0),
            download_required_from: known_version(8, 0, 0),
            marketplace_url: MARKETPLACE_URL.to_string(),
            marketplace_ids,
            trigger_parameter: TRIGGER_PARAMETER.to_string(),
            default_locale: DEFAULT_LOCALE.to_string(),
            help_urls: HelpUrls::default(),
            http_timeout: Duration::from_secs(30),
            max_redirects: 5,
            download_dir: temp_dir_base(),
            extract_dir: None,
        }
    }
}

impl Settings {
    /// Default settings with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();

        if let Ok(url) = env::var(ENV_MARKETPLACE_URL) {
            if !url.trim().is_empty() {
                settings.marketplace_url = url.trim().to_string();
            }
        }

        if let Ok(secs) = env::var(ENV_TIMEOUT_SECS) {
            let secs = secs.trim().parse::<u64>().map_err(|e| {
                config::invalid_env(ENV_TIMEOUT_SECS, format!("must be a number of seconds: {e}"))
            })?;
            settings.http_timeout = Duration::from_secs(secs);
        }

        if let Ok(dir) = env::var(ENV_DOWNLOAD_DIR) {
            let dir = PathBuf::from(dir);
            if dir.is_absolute() {
                settings.download_dir = dir;
            } else {
                tracing::warn!(
                    "ignoring relative {ENV_DOWNLOAD_DIR}={}, using {}",
                    dir.display(),
                    settings.download_dir.display()
                );
            }
        }

        Ok(settings)
    }

    /// Marketplace identifier of a module, if known
    pub fn marketplace_id(&self, module_name: &str) -> Option<u64> {
        self.marketplace_ids.get(module_name).copied()
    }

    /// Manifest filenames in lookup order
    pub fn manifest_candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.manifest_filename.as_str())
            .chain(self.legacy_manifest_filenames.iter().map(String::as_str))
    }
}

fn known_version(major: u64, minor: u64, patch: u64) -> PlatformVersion {
    PlatformVersion::from_parts(&[major, minor, patch])
}

/// Returns a directory path suitable for temporary package files.
/// Never returns a relative path, so downloads never land under the current working
/// directory (e.g. when TMPDIR=tmp).
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        #[cfg(windows)]
        {
            env::var("TEMP")
                .or_else(|_| env::var("TMP"))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
        }
        #[cfg(not(windows))]
        {
            PathBuf::from("/tmp")
        }
    }
}
