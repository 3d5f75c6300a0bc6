//! The `captioner config` command: inspect and bootstrap the config file.

use std::path::Path;

use captioner_core::Config;
use clap::{Args, Subcommand};

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Print where the config file is looked up
    Path,

    /// Write a config file with default caption settings
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load()?;
            print!("{}", config.to_toml()?);
            if config.llm.openai.api_key.starts_with("${") {
                eprintln!(
                    "\n  Note: api_key is read from the environment ({}) at run time.",
                    config.llm.openai.api_key
                );
            }
        }

        ConfigCommand::Path => {
            let path = Config::default_path();
            let state = if path.exists() { "" } else { " (not created yet)" };
            println!("{}{state}", path.display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();
            write_default_config(&path, force)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
            println!("Set OPENAI_API_KEY (or put it in a .env file) before captioning.");
        }
    }

    Ok(())
}

/// Write the default config to `path`, refusing to clobber an existing file
/// unless `force` is set.
fn write_default_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Config::default().to_toml()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        write_default_config(&path, false).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.caption.max_tokens, 100);
        assert_eq!(config.llm.openai.api_key, "${OPENAI_API_KEY}");
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "# mine\n").unwrap();

        let err = write_default_config(&path, false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

        write_default_config(&path, true).unwrap();
        assert!(Config::load_from(&path).is_ok());
    }
}
