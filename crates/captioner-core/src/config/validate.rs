//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::prompt::TRIGGER_PLACEHOLDER;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if self.caption.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "caption.max_tokens must be > 0".into(),
            ));
        }
        if let Some(temperature) = self.caption.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::ValidationError(
                    "caption.temperature must be between 0.0 and 2.0".into(),
                ));
            }
        }
        if let Some(prompt) = &self.caption.prompt {
            if !prompt.contains(TRIGGER_PLACEHOLDER) {
                return Err(ConfigError::ValidationError(format!(
                    "caption.prompt must contain {TRIGGER_PLACEHOLDER}"
                )));
            }
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.request_timeout_ms must be > 0".into(),
            ));
        }
        if self.llm.openai.endpoint.is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.openai.endpoint must not be empty".into(),
            ));
        }
        Ok(())
    }
}
