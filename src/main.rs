use anyhow::Result;
use clap::Parser;

use llmcompare::cli::{Args, Commands};
use llmcompare::commands;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger based on debug flag
    if args.debug {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::init();
    }

    match args.command {
        Commands::Compare {
            models,
            volume,
            columns,
            json,
        } => commands::handle_compare_command(&models, volume, columns, json).await,
        Commands::List {
            search,
            limit,
            json,
        } => commands::handle_list_command(search.as_deref(), limit, json).await,
        Commands::Volumes => {
            commands::handle_volumes_command();
            Ok(())
        }
    }
}
