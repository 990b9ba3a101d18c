use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, error, warn};

mod commands;

use commands::*;
use mango_core::{init_logging, ConfigSource, DataSource, MangoConfig};

#[derive(Parser)]
#[command(name = "mango")]
#[command(about = "Compile and run Mango selectors")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "mango.toml", env = "MANGO_CONFIG")]
    config: PathBuf,

    /// Data source the query targets
    #[arg(short, long, default_value = "docs")]
    source: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a request and print the compiled form
    Compile {
        /// Request file (`{"selector": ..., "fields": ...}`), or `-` for stdin
        request: PathBuf,
        /// Print only the explain text
        #[arg(long)]
        explain: bool,
    },
    /// Run a request against a JSON array of documents
    Query {
        /// Request file, or `-` for stdin
        request: PathBuf,
        /// Documents file
        #[arg(short, long)]
        documents: PathBuf,
    },
    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, config_source) = MangoConfig::load_with_source(&cli.config)?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    init_logging(&config.logging)?;

    match config_source {
        ConfigSource::File => debug!(config = %cli.config.display(), "loaded config"),
        ConfigSource::Defaults => warn!(
            config = %cli.config.display(),
            "config file not found, using defaults"
        ),
    }

    let source = DataSource::new(cli.source);
    let result = match cli.command {
        Commands::Compile { request, explain } => {
            execute_compile(&config, &source, &request, explain)
        }
        Commands::Query { request, documents } => {
            execute_query(&config, &source, &request, &documents)
        }
        Commands::Config { action } => execute_config_command(&cli.config, &config, action),
    };

    match result {
        Ok(output) => {
            print!("{}", output);
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            Err(e)
        }
    }
}
