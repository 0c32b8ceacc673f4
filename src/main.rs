//! mbo-installer - module dependency reconciliation CLI
//!
//! Runs the dependency reconciler against a host described by a JSON snapshot file.
//! JSON results go to stdout, logs and errors to stderr.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

/// Environment variable holding a `tracing` filter directive
const LOG_ENV: &str = "MBO_INSTALLER_LOG";

fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "mbo_installer=debug"
    } else {
        "mbo_installer=warn"
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Status(args) => commands::status::run(&cli.host, args),
        Commands::Check => commands::check::run(&cli.host),
        Commands::Handle(args) => commands::handle::run(&cli.host, args),
        Commands::Install(args) => commands::module::install(&cli.host, args),
        Commands::Enable(args) => commands::module::enable(&cli.host, args),
        Commands::Uninstall(args) => commands::module::uninstall(&cli.host, args),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            std::process::exit(1);
        }
    }
}
