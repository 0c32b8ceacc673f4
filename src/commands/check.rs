//! Check command implementation

use mbo_installer::error::Result;

use crate::cli::HostOptions;
use crate::commands::session::Session;

/// Run check command
///
/// Prints `true` or `false`; a `false` makes the process exit with status 1.
pub fn run(options: &HostOptions) -> Result<bool> {
    let session = Session::open(options)?;
    let met = session.builder().are_dependencies_met()?;
    println!("{met}");
    Ok(met)
}
