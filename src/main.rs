mod config;
mod database;
mod entities;
mod http_server;
mod logging;
mod models;
mod ports;
mod repositories;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{
    config::Config,
    database::Database,
    http_server::app::HttpServerConfig,
    logging::{LogFormat, init_tracing},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "GAME_CATALOG_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Tracing filter directive, e.g. `info` or `game_catalog=debug,sea_orm=warn`
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// Console log format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    /// OTLP (gRPC) endpoint to export spans to
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT", global = true)]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// The port to run the server on (overrides the config file)
        #[arg(short, long, env = "GAME_CATALOG_HTTP_PORT")]
        port: Option<u16>,

        /// SQLite database file (overrides the config file)
        #[arg(short, long, env = "GAME_CATALOG_DATABASE")]
        database: Option<PathBuf>,
    },
    /// Create the database if needed and apply pending migrations
    Migrate {
        /// SQLite database file (overrides the config file)
        #[arg(short, long, env = "GAME_CATALOG_DATABASE")]
        database: Option<PathBuf>,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let tracer_provider = init_tracing(
        env!("CARGO_PKG_NAME"),
        args.otlp_endpoint.as_deref(),
        &args.log_level,
        args.log_format,
    )?;

    let result = run(args).await;

    if let Some(provider) = tracer_provider {
        if let Err(e) = provider.shutdown() {
            eprintln!("Failed to flush traces: {e}");
        }
    }

    result
}

async fn run(args: Args) -> Result<()> {
    tracing::debug!("Game catalog starting");

    let mut config = match &args.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .wrap_err("Failed to load game-catalog config")?;

    match args.command {
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                let path = Config::create_default()?;
                tracing::info!("Default config available at: {}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
        Commands::Migrate { database } => {
            if let Some(database) = database {
                config.set_database_path(&database);
            }
            Database::open(&config.database_path()).await?;
            tracing::info!("Migrations applied");
        }
        Commands::Serve { port, database } => {
            if let Some(database) = database {
                config.set_database_path(&database);
            }
            let port = port.unwrap_or(config.port);

            let database = Database::open(&config.database_path()).await?;

            tracing::info!("Starting HTTP server on port: {}", port);
            http_server::app::start(HttpServerConfig {
                port,
                database: Arc::new(database),
                allowed_origins: config.allowed_origins,
            })
            .await?;
        }
    }

    Ok(())
}
