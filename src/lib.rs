//! MBO installer - module dependency reconciliation
//!
//! A module running inside a hosting e-commerce platform declares the other modules it
//! needs in a JSON manifest. This crate reads that manifest, queries the host for the
//! live state of every dependency (plus the companion marketplace module the platform
//! requires from 1.7.5 onwards), and produces the context the admin UI renders. When
//! the request asks for it, the companion is downloaded, installed or enabled before
//! the page is shown.
//!
//! The host itself is reached through the capability traits in [`host`]; the crate
//! never talks to a database or filesystem layout of its own.

pub mod config;
pub mod error;
pub mod host;
pub mod installer;
pub mod manifest;
pub mod marketplace;
pub mod presenter;
pub mod reconciler;
pub mod version;

#[cfg(test)]
mod test_fixtures;

pub use config::Settings;
pub use error::{MboError, Result};
pub use host::{
    ContextProvider, HostServices, InstallSource, ModuleAction, ModuleManager, ModuleRegistry,
    Router,
};
pub use installer::Installer;
pub use manifest::{DependencyDeclaration, Manifest};
pub use marketplace::{DownloadRequest, HttpMarketplace, MarketplaceClient};
pub use presenter::{InstallationState, Presenter};
pub use reconciler::{
    AppContext, DependencyBuilder, DependencyStatus, ModuleDescriptor, ReconciliationOutcome,
    RequestContext, ShortCircuitPayload,
};
pub use version::PlatformVersion;
