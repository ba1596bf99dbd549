use anyhow::{Context, Result};
use clap::Subcommand;

use crate::cli::output::get_formatter;
use crate::models::{Config, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved configuration
    Show,

    /// Write a default configuration file
    Init,

    /// Print the configuration file path
    Path,
}

pub async fn handle_config(
    command: ConfigCommand,
    format: OutputFormat,
    _verbose: bool,
) -> Result<()> {
    let formatter = get_formatter(format);

    match command {
        ConfigCommand::Show => {
            let config = Config::load()?;
            let rendered = toml::to_string_pretty(&config).context("failed to render config")?;
            print!("{}", rendered);
        }
        ConfigCommand::Init => {
            let config = Config::default();
            config.save().context("failed to write config")?;
            let path = Config::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            print!("{}", formatter.format_message(&format!("wrote {}", path)));
        }
        ConfigCommand::Path => {
            let path = Config::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            print!("{}", formatter.format_message(&path));
        }
    }

    Ok(())
}
