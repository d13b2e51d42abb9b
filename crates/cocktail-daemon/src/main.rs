mod cli;

use clap::Parser;
use cli::{
    checks::run_checks, commands::ConfigAction, config_cmd::handle_config, init::init_daemon,
    init_logging, run::run_daemon, status::show_status, Cli, Commands,
};
use cocktail_types::CocktailResult;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> CocktailResult<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| {
        dirs::home_dir().map(|h| h.join(".cocktaild")).unwrap_or_else(|| PathBuf::from("/var/lib/cocktaild"))
    });
    let config_path = cli.config.clone().unwrap_or_else(|| data_dir.join("config.toml"));

    match cli.command {
        Commands::Run { fake_system } => {
            run_daemon(&config_path, &data_dir, fake_system).await?;
        }
        Commands::Init { force } => {
            init_daemon(&config_path, &data_dir, force)?;
        }
        Commands::Status => {
            show_status(&config_path, &data_dir, &cli.format).await?;
        }
        Commands::Check => {
            run_checks(&config_path, &data_dir).await?;
        }
        Commands::Config { action } => {
            let action = action.unwrap_or(ConfigAction::Show);
            handle_config(&config_path, Some(action))?;
        }
    }

    Ok(())
}
