//! trafdash - resilient command-line client for the traffic analytics backend

use clap::Parser;

mod cache;
mod cli;
mod client;
mod config;
mod dashboard;
mod error;
mod output;

use cli::args::GlobalOptions;
use cli::watch::WatchOptions;
use cli::{Cli, CommandContext, Commands, ConfigCommands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise warn, or debug with `--debug`
fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Version => {
            println!("trafdash version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Show => cli::config::show(&opts),
            ConfigCommands::Init { force } => cli::config::init(&opts, force),
        },
        Commands::Dashboard => {
            let ctx = CommandContext::new(&opts)?;
            cli::dashboard::run(&ctx).await
        }
        Commands::Field { name } => {
            let ctx = CommandContext::new(&opts)?;
            cli::field::run(&ctx, name).await
        }
        Commands::Structures => {
            let ctx = CommandContext::new(&opts)?;
            cli::structures::run(&ctx).await
        }
        Commands::Probe => {
            let ctx = CommandContext::new(&opts)?;
            cli::probe::run(&ctx).await
        }
        Commands::Watch {
            interval,
            force,
            count,
        } => {
            let ctx = CommandContext::new(&opts)?;
            let watch_opts = WatchOptions::resolve(&ctx, interval, force, count)?;
            cli::watch::run(&ctx, watch_opts).await
        }
    }
}
