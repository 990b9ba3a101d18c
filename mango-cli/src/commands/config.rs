use anyhow::{Context, Result};
use clap::Subcommand;
use mango_core::MangoConfig;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write the default configuration to the config path
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

pub fn execute_config_command(
    path: &Path,
    config: &MangoConfig,
    command: ConfigCommands,
) -> Result<String> {
    match command {
        ConfigCommands::Show => {
            toml::to_string_pretty(config).context("Failed to serialize configuration")
        }
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            MangoConfig::default().save(path)?;
            Ok(format!("✓ Wrote default configuration to {}\n", path.display()))
        }
    }
}
