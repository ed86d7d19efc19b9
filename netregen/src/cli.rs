use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "netregen")]
#[command(about = "Regenerate network service configuration from the directory service")]
pub struct Cli {
    /// Configuration file (defaults to /etc/netregen/config.toml, then
    /// ./config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Suppress step-by-step progress output.
    #[arg(short, long, global = true)]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Fetch the list of services to regenerate and run them.
    Regen(RegenArgs),
    /// Show the services the directory marks for regeneration on this host.
    List,
    /// Fetch DNS data and write zone files without verification or reload.
    RenderZones,
}

#[derive(Parser, Debug)]
pub struct RegenArgs {
    /// Services to regenerate in addition to the ones the directory
    /// requests.
    pub force: Vec<String>,
    /// Do not report completed regenerations back to the directory.
    #[arg(long)]
    pub no_notify: bool,
}
