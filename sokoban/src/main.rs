use anyhow::Result;
use clap::Parser;
use sokoban::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;
    match &cli.command {
        Commands::Play { .. } => sokoban::app::play(&config),
        Commands::Train { render, .. } => sokoban::app::train(&config, *render),
        Commands::Watch { model, .. } => {
            let model = model.clone().unwrap_or_else(|| config.train.final_path());
            sokoban::app::watch(&config, &model)
        }
    }
}
