//! `offert config`: shows or creates the config file.

use std::path::Path;

use anyhow::{bail, Result};
use clap::Subcommand;
use tracing::info;

use crate::config::OffertConfig;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration (file + environment) as TOML.
    Show,
    /// Write a config file with default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

pub fn run(command: ConfigCommand, config_path: Option<&Path>, config: &OffertConfig) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigCommand::Init { force } => {
            let target = config_path
                .map(Path::to_path_buf)
                .or_else(OffertConfig::default_config_path);
            if let Some(path) = &target {
                if path.exists() && !force {
                    bail!("{} already exists (use --force to overwrite)", path.display());
                }
            }
            let written = OffertConfig::default().save(target.as_deref())?;
            info!(path = %written.display(), "Config file created");
            println!("{}", written.display());
        }
    }
    Ok(())
}
