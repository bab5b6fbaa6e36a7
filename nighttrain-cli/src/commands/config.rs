//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, `config path` and
//! `config init` for viewing and modifying settings from the command line.

use clap::Subcommand;
use nighttrain::config::{ConfigFile, ConfigKey};

use super::common::ConfigLocation;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., window.ahead)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., window.ahead)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,

    /// Write a configuration file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, location: &ConfigLocation) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key, location),
        ConfigCommands::Set { key, value } => run_set(&key, &value, location),
        ConfigCommands::List => run_list(location),
        ConfigCommands::Path => run_path(location),
        ConfigCommands::Init { force } => run_init(force, location),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'nighttrain config list' to see available keys.",
            key
        ))
    })
}

/// Get a configuration value.
fn run_get(key: &str, location: &ConfigLocation) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let config = location.load()?;
    println!("{}", config_key.get(&config));
    Ok(())
}

/// Set a configuration value.
fn run_set(key: &str, value: &str, location: &ConfigLocation) -> Result<(), CliError> {
    let config_key = parse_key(key)?;

    let mut config = location.load()?;
    config_key
        .set(&mut config, value)
        .map_err(|e| CliError::Config(e.to_string()))?;
    config.save_to(&location.file)?;

    println!("Set {} = {}", config_key.name(), config_key.get(&config));
    Ok(())
}

/// List all configuration settings.
fn run_list(location: &ConfigLocation) -> Result<(), CliError> {
    let config = location.load()?;

    println!("Configuration Settings");
    println!("======================");
    println!();

    let mut current_section = "";
    for key in ConfigKey::all() {
        let section = key.section();
        if section != current_section {
            if !current_section.is_empty() {
                println!();
            }
            println!("[{}]", section);
            current_section = section;
        }
        println!("  {} = {}", key.key_name(), key.get(&config));
    }

    Ok(())
}

/// Show the configuration file path.
fn run_path(location: &ConfigLocation) -> Result<(), CliError> {
    println!("{}", location.file.display());
    Ok(())
}

/// Write the default configuration.
fn run_init(force: bool, location: &ConfigLocation) -> Result<(), CliError> {
    if location.file.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists. Use --force to overwrite it.",
            location.file.display()
        )));
    }

    ConfigFile::default().save_to(&location.file)?;

    println!("Configuration file: {}", location.file.display());
    println!();
    println!("Edit this file to customize NightTrain settings.");
    println!("Record a path into general.path_file before running a simulation.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn location(dir: &TempDir) -> ConfigLocation {
        ConfigLocation::new(Some(dir.path().join("nested").join("config.ini")))
    }

    #[test]
    fn test_init_then_refuse_overwrite() {
        let dir = TempDir::new().unwrap();
        let location = location(&dir);

        run_init(false, &location).unwrap();
        assert!(location.file.exists());
        assert!(run_init(false, &location).is_err());
        run_init(true, &location).unwrap();
    }

    #[test]
    fn test_set_persists_value() {
        let dir = TempDir::new().unwrap();
        let location = location(&dir);

        run_set("window.ahead", "45", &location).unwrap();
        let config = location.load().unwrap();
        assert_eq!(config.window.ahead, 45);
    }

    #[test]
    fn test_set_rejects_bad_value_and_key() {
        let dir = TempDir::new().unwrap();
        let location = location(&dir);

        assert!(run_set("window.ahead", "lots", &location).is_err());
        assert!(run_set("window.sideways", "3", &location).is_err());
        assert!(!location.file.exists());
    }
}
