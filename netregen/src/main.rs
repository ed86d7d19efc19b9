use anyhow::{bail, Context, Result};
use clap::Parser;
use netregen::client::AuthClient;
use netregen::config;
use netregen::error::ServiceError;
use netregen::progress::Progress;
use netregen::services::{dns, Services};

mod cli;

use cli::{Cli, Command, RegenArgs};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref()).context("failed to load configuration")?;
    let progress = Progress::new(cli.quiet);
    let mut client =
        AuthClient::new(config.server.clone()).context("failed to initialize HTTP client")?;

    let outcome = match cli.command {
        Command::Regen(args) => run_regen(&config, &mut client, progress, &args),
        Command::List => run_list(&config, &mut client, progress),
        Command::RenderZones => run_render_zones(&config, &mut client, progress),
    };

    client.save_cookies();
    outcome
}

fn run_regen(
    config: &config::Config,
    client: &mut AuthClient,
    progress: Progress,
    args: &RegenArgs,
) -> Result<()> {
    let mut services = Services::new(config, client, progress, !args.no_notify);
    services.fetch_to_regen();
    for name in &args.force {
        services.force(name);
    }
    services.regen_all();
    finish(services.errors)
}

fn run_list(config: &config::Config, client: &mut AuthClient, progress: Progress) -> Result<()> {
    let mut services = Services::new(config, client, progress, false);
    services.fetch_to_regen();
    for name in services.queued_names() {
        println!("{name}");
    }
    finish(services.errors)
}

fn run_render_zones(
    config: &config::Config,
    client: &mut AuthClient,
    progress: Progress,
) -> Result<()> {
    finish(dns::render_only(config, client, progress))
}

fn finish(errors: Vec<ServiceError>) -> Result<()> {
    for err in &errors {
        log::error!("{err}");
    }
    if !errors.is_empty() {
        bail!("{} error(s) during regeneration", errors.len());
    }
    Ok(())
}
