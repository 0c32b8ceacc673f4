//! Install, enable and uninstall command implementations
//!
//! Each prints `{"<name>": {"status": bool}}` and writes the host snapshot back when the
//! host accepted the change.

use mbo_installer::ShortCircuitPayload;
use mbo_installer::error::Result;

use crate::cli::{HostOptions, ModuleArgs};
use crate::commands::session::{Session, print_json};

/// Run install command
pub fn install(options: &HostOptions, args: &ModuleArgs) -> Result<bool> {
    run(options, args, |session, name| session.installer()?.install_module(name))
}

/// Run enable command
pub fn enable(options: &HostOptions, args: &ModuleArgs) -> Result<bool> {
    run(options, args, |session, name| session.installer()?.enable_module(name))
}

/// Run uninstall command
pub fn uninstall(options: &HostOptions, args: &ModuleArgs) -> Result<bool> {
    run(options, args, |session, name| {
        session.installer()?.uninstall_module(name)
    })
}

fn run(
    options: &HostOptions,
    args: &ModuleArgs,
    action: impl FnOnce(&Session, &str) -> Result<bool>,
) -> Result<bool> {
    let session = Session::open(options)?;
    let status = action(&session, &args.name)?;
    if status {
        session.save()?;
    }
    print_json(&ShortCircuitPayload::status(args.name.as_str(), status))?;
    Ok(status)
}
