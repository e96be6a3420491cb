use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pokegraph::config::Config;

mod commands;

#[derive(Parser)]
#[command(
    name = "pokegraph",
    version,
    about = "Pokémon knowledge graph builder with Turtle publishing and SHACL validation",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); environment variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the category, extract every entity and publish the graph
    Build {
        /// Process at most this many entities
        #[arg(short, long)]
        limit: Option<usize>,

        /// Turtle output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only write the local file, do not POST to the store
        #[arg(long, default_value = "false")]
        no_publish: bool,
    },

    /// Validate the stored graph against the shape document
    Validate {
        /// Shape document (Turtle)
        #[arg(short, long)]
        shapes: Option<PathBuf>,
    },

    /// Extract one entity page and print its triples as Turtle
    Extract {
        /// Entity name as listed in the category
        name: String,
    },

    /// Print the entity names of the category
    List,

    /// Show the translations recorded for an English name
    Lookup {
        /// English name (case-insensitive)
        english_name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    // Initialize tracing/logging
    let log_format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    setup_tracing(log_format, &config.logging.level, cli.verbose)?;

    tracing::info!("pokegraph starting");

    match cli.command {
        Commands::Build {
            limit,
            output,
            no_publish,
        } => {
            tracing::info!(
                limit = ?limit,
                output = ?output,
                no_publish = %no_publish,
                "Starting build command"
            );
            commands::build(&config, limit, output, no_publish).await?;
        }

        Commands::Validate { shapes } => {
            tracing::info!(shapes = ?shapes, "Starting validate command");
            commands::validate(&config, shapes).await?;
        }

        Commands::Extract { name } => {
            tracing::info!(name = %name, "Starting extract command");
            commands::extract(&config, &name).await?;
        }

        Commands::List => {
            tracing::info!("Starting list command");
            commands::list(&config).await?;
        }

        Commands::Lookup { english_name } => {
            tracing::info!(english_name = %english_name, "Starting lookup command");
            commands::lookup(&config, &english_name)?;
        }
    }

    tracing::info!("pokegraph completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("pokegraph=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("pokegraph={level},warn")))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
