//! Caption provider trait and request/response types.
//!
//! Defines the interface every caption service client implements, plus the
//! factory that builds the configured client with its credentials.

use crate::config::LlmConfig;
use crate::error::{ConfigError, PipelineError};
use async_trait::async_trait;
use base64::Engine;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Base64-encoded image ready to embed in a request payload.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and a file extension.
    pub fn from_bytes(bytes: &[u8], extension: &str) -> Self {
        let media_type = match extension.to_lowercase().as_str() {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            other => {
                tracing::warn!("Unknown image extension '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Create an `ImageInput` from bytes read from `path`, typed by its extension.
    pub fn from_path_bytes(path: &Path, bytes: &[u8]) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_bytes(bytes, extension)
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// A request for one caption.
#[derive(Debug, Clone)]
pub struct CaptionRequest {
    /// Where the image came from; named in per-image errors
    pub path: PathBuf,
    /// The image to caption
    pub image: ImageInput,
    /// Rendered instruction text (trigger word already substituted)
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature; `None` leaves the service default
    pub temperature: Option<f32>,
}

/// The response from a caption call.
#[derive(Debug, Clone)]
pub struct CaptionResponse {
    /// Generated caption, whitespace-trimmed
    pub text: String,
    /// Model identifier reported by the service
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all caption service clients implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn CaptionProvider>` for dynamic dispatch).
#[async_trait]
pub trait CaptionProvider: Send + Sync {
    /// Provider name for logging (e.g., "openai").
    fn name(&self) -> &str;

    /// Generate a caption for the given request.
    async fn generate(&self, request: &CaptionRequest) -> Result<CaptionResponse, PipelineError>;

    /// Per-request timeout; the batch gives up on a call after this long.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Factory that creates the configured provider.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a caption provider from config.
    ///
    /// # Arguments
    /// * `config` - The caption service config section
    /// * `model_override` - Optional model name that overrides the config default
    /// * `api_key_override` - Optional key used instead of `api_key` from config
    /// * `timeout` - Per-request timeout (`limits.request_timeout_ms`)
    pub fn create(
        config: &LlmConfig,
        model_override: Option<&str>,
        api_key_override: Option<&str>,
        timeout: Duration,
    ) -> Result<Box<dyn CaptionProvider>, ConfigError> {
        match config.provider.as_str() {
            "openai" => {
                let cfg = &config.openai;
                let api_key = api_key_override
                    .map(String::from)
                    .or_else(|| resolve_env_var(&cfg.api_key))
                    .ok_or_else(|| {
                        ConfigError::ValidationError(
                            "OpenAI API key not set. Set OPENAI_API_KEY env var.".to_string(),
                        )
                    })?;
                let model = model_override.unwrap_or(&cfg.model);
                Ok(Box::new(
                    super::openai::OpenAiProvider::with_endpoint(&api_key, model, &cfg.endpoint)
                        .with_timeout(timeout),
                ))
            }
            other => Err(ConfigError::ValidationError(format!(
                "Unknown caption provider: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(60);

    #[test]
    fn test_image_input_from_bytes_jpeg() {
        let input = ImageInput::from_bytes(&[0xFF, 0xD8, 0xFF], "JPG");
        assert_eq!(input.media_type, "image/jpeg");
        assert_eq!(input.data, "/9j/");
    }

    #[test]
    fn test_image_input_from_bytes_png() {
        let input = ImageInput::from_bytes(&[0x89, 0x50, 0x4E, 0x47], "png");
        assert_eq!(input.media_type, "image/png");
    }

    #[test]
    fn test_image_input_from_path_bytes() {
        let input = ImageInput::from_path_bytes(Path::new("dir/cat.jpeg"), b"abc");
        assert_eq!(input.media_type, "image/jpeg");
        assert_eq!(input.data, "YWJj");
    }

    #[test]
    fn test_image_input_data_url() {
        let input = ImageInput::from_bytes(&[1, 2, 3], "png");
        assert_eq!(input.data_url(), "data:image/png;base64,AQID");
    }

    #[test]
    fn test_resolve_env_var() {
        // Non-env-var strings pass through
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        // Empty returns None
        assert_eq!(resolve_env_var(""), None);
        // Unset env var returns None
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), None);
    }

    #[test]
    fn test_factory_uses_key_override() {
        let mut config = LlmConfig::default();
        config.openai.api_key = "${DEFINITELY_NOT_SET_XYZ_456}".to_string();
        let provider =
            ProviderFactory::create(&config, None, Some("sk-test"), TIMEOUT).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_factory_applies_configured_timeout() {
        let provider = ProviderFactory::create(
            &LlmConfig::default(),
            None,
            Some("sk-test"),
            Duration::from_secs(120),
        )
        .unwrap();
        assert_eq!(provider.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_factory_rejects_missing_key() {
        let mut config = LlmConfig::default();
        config.openai.api_key = "${DEFINITELY_NOT_SET_XYZ_789}".to_string();
        let err = ProviderFactory::create(&config, None, None, TIMEOUT).err().unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_factory_rejects_unknown_provider() {
        let config = LlmConfig {
            provider: "carrier-pigeon".to_string(),
            ..LlmConfig::default()
        };
        let err = ProviderFactory::create(&config, None, Some("key"), TIMEOUT).err().unwrap();
        assert!(err.to_string().contains("carrier-pigeon"));
    }
}
