//! Command-line entry point for schema_tidy

use anyhow::Context;
use clap::{Parser, Subcommand};

use schema_tidy::utils::logging;
use schema_tidy::{config, rewrite_schema, seed_database};

#[derive(Parser)]
#[command(
    name = "schema_tidy",
    about = "Rewrites a Prisma schema's identifier casing and seeds initial data",
    version
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "schema_tidy.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rewrite the schema file's identifier casing in place
    Rename,
    /// Insert the initial seed rows
    Seed,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        tracing::error!(error = %error, "schema_tidy failed");
        eprintln!("Error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::load_from_file(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config))?;
    logging::init_logging(&config.logging)?;

    match cli.command {
        Command::Rename => {
            let stats = rewrite_schema(&config)?;
            for (original, renamed) in &stats.renamed_models {
                tracing::info!(
                    original = original.as_str(),
                    renamed = renamed.as_str(),
                    "Renamed model"
                );
            }
        }
        Command::Seed => seed_database(&config).await?,
    }

    Ok(())
}
