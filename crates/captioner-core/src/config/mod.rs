//! Configuration management for Captioner.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section is optional in the TOML file.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use crate::prompt::PromptTemplate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Captioner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Caption request settings
    pub caption: CaptionConfig,

    /// Processing settings
    pub processing: ProcessingConfig,

    /// Retry settings
    pub pipeline: PipelineConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Caption service settings
    pub llm: LlmConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.captioner.captioner/config.toml
    /// - Linux: ~/.config/captioner/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\captioner\config\config.toml
    ///
    /// Falls back to ~/.captioner/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "captioner", "captioner")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".captioner").join("config.toml")
            })
    }

    /// Resolve the instruction template: the custom prompt if set, else the
    /// built-in template selected by `caption.template`.
    pub fn prompt_template(&self) -> Result<PromptTemplate, ConfigError> {
        match &self.caption.prompt {
            Some(text) => PromptTemplate::custom(text),
            None => Ok(PromptTemplate::builtin(self.caption.template)),
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}
