use clap::Parser;

/// Arguments for the status command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Dependency status:\n    mbo-installer --host shop.json status\n\n\
                  With admin action routes:\n    mbo-installer --host shop.json status --routes\n\n\
                  Routes relative to a given admin page:\n    \
                  mbo-installer --host shop.json status --routes --url 'https://shop/admin/index.php?controller=AdminCheckout'")]
pub struct StatusArgs {
    /// Include install/enable/upgrade URLs for every dependency
    #[arg(long)]
    pub routes: bool,

    /// URL of the admin request (defaults to the snapshot's admin URL)
    #[arg(long)]
    pub url: Option<String>,
}

/// Arguments for the handle command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Render the page context:\n    mbo-installer --host shop.json handle\n\n\
                  Follow the companion install link:\n    \
                  mbo-installer --host shop.json handle --url 'https://shop/admin/index.php?mbo_action_needed=1'")]
pub struct HandleArgs {
    /// URL of the admin request (defaults to the snapshot's admin URL)
    #[arg(long)]
    pub url: Option<String>,
}
