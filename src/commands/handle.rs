//! Handle command implementation
//!
//! Runs the reconciler the way the admin controller does: when the request carries the
//! trigger parameter the companion gets installed or enabled and only the action
//! payload is printed; otherwise the page context is.

use mbo_installer::error::Result;
use mbo_installer::{ReconciliationOutcome, RequestContext};

use crate::cli::{HandleArgs, HostOptions};
use crate::commands::session::{Session, print_json};

/// Run handle command
pub fn run(options: &HostOptions, args: &HandleArgs) -> Result<bool> {
    let session = Session::open(options)?;
    let request = RequestContext::from_url(session.request_url(args.url.as_deref()));

    match session.builder().handle_dependencies(&request)? {
        ReconciliationOutcome::Continue(context) => {
            print_json(&context)?;
            Ok(true)
        }
        ReconciliationOutcome::ShortCircuit(payload) => {
            session.save()?;
            print_json(&payload)?;
            Ok(payload.status)
        }
    }
}
