use clap::Parser;

/// Arguments for the install, enable and uninstall commands
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Install the companion module:\n    mbo-installer --host shop.json install ps_mbo\n\n\
                  Install from a local marketplace mirror:\n    \
                  mbo-installer --host shop.json --marketplace-url http://127.0.0.1:8080 install ps_eventbus")]
pub struct ModuleArgs {
    /// Technical module name (e.g. ps_mbo)
    pub name: String,
}
