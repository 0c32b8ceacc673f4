//! Error types and handling for the module installer
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`config`]: Settings and environment errors
//! - [`manifest`]: Dependency manifest errors
//! - [`transport`]: Marketplace transport errors
//! - [`fs`]: Temporary artifact and archive errors
//! - [`host`]: Host capability and primitive errors

pub mod config;
pub mod fs;
pub mod host;
pub mod manifest;
pub mod transport;


use miette::Diagnostic;
use thiserror::Error;

/// Main error type for dependency reconciliation and installation
#[derive(Error, Diagnostic, Debug)]
pub enum MboError {
    // Manifest errors
    #[error("Dependency manifest not found: {path}")]
    #[diagnostic(
        code(mbo::manifest::not_found),
        help("Ship a ps_dependencies.json file in the module directory")
    )]
    ManifestNotFound { path: String },

    #[error("Failed to parse dependency manifest {path}: {reason}")]
    #[diagnostic(code(mbo::manifest::parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    #[error("Invalid dependency manifest {path}: {message}")]
    #[diagnostic(
        code(mbo::manifest::invalid),
        help("The manifest needs a 'dependencies' key holding a map or a list of named records")
    )]
    ManifestInvalid { path: String, message: String },

    #[error("Invalid version string: '{version}'")]
    #[diagnostic(code(mbo::version::invalid))]
    InvalidVersion { version: String },

    // Configuration errors
    #[error("Invalid value for {name}: {reason}")]
    #[diagnostic(
        code(mbo::config::invalid_env),
        help("Fix or unset the environment variable")
    )]
    InvalidEnv { name: String, reason: String },

    // Transport errors
    #[error("Marketplace request to {url} failed: {reason}")]
    #[diagnostic(
        code(mbo::transport::failed),
        help("Check network access to the marketplace or retry from the module page")
    )]
    TransportFailed { url: String, reason: String },

    #[error("Marketplace answered {url} with HTTP {status}")]
    #[diagnostic(code(mbo::transport::status))]
    MarketplaceStatus { url: String, status: u16 },

    #[error("No marketplace identifier is known for module '{name}'")]
    #[diagnostic(code(mbo::install::unknown_module))]
    UnknownMarketplaceModule { name: String },

    // File system errors
    #[error("Cannot store module package in temporary file under {dir}: {reason}")]
    #[diagnostic(code(mbo::fs::temp_file_failed))]
    TempFileFailed { dir: String, reason: String },

    #[error("Cannot extract module content from {path}: {reason}")]
    #[diagnostic(code(mbo::fs::extract_failed))]
    ArchiveExtractFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(mbo::fs::io_error))]
    IoError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Host errors
    #[error("Host capability unavailable: {capability}")]
    #[diagnostic(
        code(mbo::host::unavailable),
        help("The host context did not provide this capability; check how the reconciler is wired")
    )]
    HostUnavailable { capability: String },

    #[error("Host {operation} of module '{name}' failed: {reason}")]
    #[diagnostic(code(mbo::host::operation_failed))]
    HostOperationFailed {
        operation: String,
        name: String,
        reason: String,
    },
}

impl MboError {
    /// Whether the error belongs to the manifest domain
    pub fn is_manifest_error(&self) -> bool {
        matches!(
            self,
            MboError::ManifestNotFound { .. }
                | MboError::ManifestParseFailed { .. }
                | MboError::ManifestInvalid { .. }
        )
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, MboError>;
