//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - status: status and handle command arguments
//! - module: install, enable and uninstall command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod module;
pub mod status;

pub use module::ModuleArgs;
pub use status::{HandleArgs, StatusArgs};

/// MBO installer - module dependency reconciliation
///
/// Inspect and reconcile the dependencies of a platform module against a host snapshot.
#[derive(Parser, Debug)]
#[command(
    name = "mbo-installer",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Dependency reconciliation for e-commerce platform modules",
    long_about = "Reads a module's dependency manifest, checks the host for every dependency \
                  and the companion marketplace module, and installs or enables the companion \
                  when asked to. The host is described by a JSON snapshot file.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  mbo-installer --host shop.json --module-dir ./ps_checkout status          \x1b[90m# Dependency status\x1b[0m\n   \
                  mbo-installer --host shop.json --module-dir ./ps_checkout check           \x1b[90m# Exit 1 unless all met\x1b[0m\n   \
                  mbo-installer --host shop.json --module-dir ./ps_checkout handle --url URL \x1b[90m# Simulate an admin request\x1b[0m\n   \
                  mbo-installer --host shop.json install ps_mbo                             \x1b[90m# Install a module\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub host: HostOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the host and the owning module live
#[derive(Args, Debug, Clone)]
pub struct HostOptions {
    /// Host snapshot file (JSON)
    #[arg(long = "host", env = "MBO_INSTALLER_HOST")]
    pub snapshot: PathBuf,

    /// Directory of the owning module, where its dependency manifest lives
    #[arg(long, env = "MBO_INSTALLER_MODULE_DIR", default_value = ".")]
    pub module_dir: PathBuf,

    /// Marketplace API base URL
    #[arg(long, env = "MBO_INSTALLER_MARKETPLACE_URL")]
    pub marketplace_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the dependency context as JSON
    Status(StatusArgs),

    /// Exit successfully only when every dependency is installed and enabled
    Check,

    /// Handle an admin request, installing or enabling the companion when triggered
    Handle(HandleArgs),

    /// Install a module (downloading it from the marketplace when the platform needs it)
    Install(ModuleArgs),

    /// Enable an installed module
    Enable(ModuleArgs),

    /// Uninstall a module
    Uninstall(ModuleArgs),
}
