//! Status command implementation

use mbo_installer::RequestContext;
use mbo_installer::error::Result;

use crate::cli::{HostOptions, StatusArgs};
use crate::commands::session::{Session, print_json};

/// Run status command
pub fn run(options: &HostOptions, args: &StatusArgs) -> Result<bool> {
    let session = Session::open(options)?;
    let builder = session.builder();

    let context = if args.routes {
        let request = RequestContext::from_url(session.request_url(args.url.as_deref()));
        builder.build_dependencies_context(&request)?
    } else {
        builder.build_dependencies()?
    };

    print_json(&context)?;
    Ok(true)
}
