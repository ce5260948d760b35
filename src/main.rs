//! Kuberns CLI - companion for the Kuberns deployment platform

use clap::Parser;

mod cli;
mod client;
mod config;
mod error;
mod output;
mod wizard;

use cli::{AppCommands, Cli, CommandContext, Commands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match cli.command {
        Commands::Init => cli::init::run(cli.config.as_deref(), cli.api_host.clone()).await,
        Commands::Status => cli::status::run(cli.config.as_deref()),
        Commands::Version => {
            println!("kuberns version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::App(app_cmd) => {
            let ctx =
                CommandContext::new(cli.format, cli.config.as_deref(), cli.api_host.clone())?;
            match app_cmd {
                AppCommands::List => cli::app::list(&ctx).await,
                AppCommands::Get { app_id } => cli::app::get(&ctx, app_id).await,
                AppCommands::Create => cli::app::create(&ctx).await,
            }
        }
        Commands::Logs {
            instance_id,
            follow,
        } => {
            let ctx =
                CommandContext::new(cli.format, cli.config.as_deref(), cli.api_host.clone())?;
            cli::logs::run(&ctx, instance_id, follow).await
        }
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}
