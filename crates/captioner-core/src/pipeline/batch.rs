//! Caption batch processor.
//!
//! Walks the images of one directory in order and, for each, asks the caption
//! service for a caption and writes it next to the image as `<stem>.txt`.
//! Images are handled strictly one after another. A failure is recorded for
//! that image and the batch moves on; nothing a single image does can abort
//! the run.

use std::path::Path;
use std::time::Instant;

use crate::config::{Config, ProcessingConfig};
use crate::error::{ConfigError, PipelineError, PipelineResult};
use crate::llm::provider::{CaptionProvider, CaptionRequest, CaptionResponse, ImageInput};
use crate::llm::retry;
use crate::pipeline::discovery::FileDiscovery;
use crate::prompt::{PromptTemplate, TemplateKind, TriggerWord};
use crate::types::{BatchSummary, CaptionOutcome, ImageRecord};

/// Everything a batch needs besides the provider and the run arguments.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Instruction template rendered with the trigger word
    pub template: PromptTemplate,
    /// Maximum output tokens per caption
    pub max_tokens: u32,
    /// Sampling temperature; `None` leaves the service default
    pub temperature: Option<f32>,
    /// Extra attempts for retryable failures (0 = one call per image)
    pub retry_attempts: u32,
    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,
    /// Images above this size are not sent
    pub max_file_size_mb: u64,
    /// Which files count as images
    pub processing: ProcessingConfig,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            template: PromptTemplate::builtin(TemplateKind::Garment),
            max_tokens: 100,
            temperature: None,
            retry_attempts: 0,
            retry_delay_ms: 1000,
            max_file_size_mb: 20,
            processing: ProcessingConfig::default(),
        }
    }
}

impl BatchOptions {
    /// Build options from a loaded config.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            template: config.prompt_template()?,
            max_tokens: config.caption.max_tokens,
            temperature: config.caption.temperature,
            retry_attempts: config.pipeline.retry_attempts,
            retry_delay_ms: config.pipeline.retry_delay_ms,
            max_file_size_mb: config.limits.max_file_size_mb,
            processing: config.processing.clone(),
        })
    }
}

/// Sequential caption generator for a directory of images.
pub struct CaptionBatch {
    provider: Box<dyn CaptionProvider>,
    options: BatchOptions,
    discovery: FileDiscovery,
}

impl CaptionBatch {
    pub fn new(provider: Box<dyn CaptionProvider>, options: BatchOptions) -> Self {
        let discovery = FileDiscovery::new(options.processing.clone());
        Self {
            provider,
            options,
            discovery,
        }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// List the images a run over `dir` would process.
    pub fn discover(&self, dir: &Path) -> PipelineResult<Vec<ImageRecord>> {
        self.discovery.discover(dir)
    }

    /// Caption every image in `dir`.
    ///
    /// Fails only when the directory cannot be listed. `on_outcome` is called
    /// once per image, in processing order.
    pub async fn run<F>(
        &self,
        dir: &Path,
        trigger_word: &TriggerWord,
        on_outcome: F,
    ) -> PipelineResult<BatchSummary>
    where
        F: FnMut(&CaptionOutcome),
    {
        let images = self.discover(dir)?;
        Ok(self.run_images(&images, trigger_word, on_outcome).await)
    }

    /// Caption an already-discovered list of images.
    pub async fn run_images<F>(
        &self,
        images: &[ImageRecord],
        trigger_word: &TriggerWord,
        mut on_outcome: F,
    ) -> BatchSummary
    where
        F: FnMut(&CaptionOutcome),
    {
        let start = Instant::now();
        let prompt = self.options.template.render(trigger_word.as_str());
        let mut summary = BatchSummary::default();

        for image in images {
            let file_name = image.file_name();
            tracing::info!("Processing image: {file_name}");

            let outcome = match self.caption_single(image, &prompt).await {
                Ok(response) => {
                    let caption_path = image.caption_path();
                    tracing::info!("Caption saved to {:?}", caption_path);
                    CaptionOutcome::Captioned {
                        file_name,
                        image_path: image.path.clone(),
                        caption_path,
                        caption: response.text,
                        model: response.model,
                        tokens_used: response.tokens_used,
                        latency_ms: response.latency_ms,
                    }
                }
                Err(e) => {
                    let status_code = match &e {
                        PipelineError::Service { status_code, .. } => *status_code,
                        _ => None,
                    };
                    if matches!(e, PipelineError::EmptyCaption { .. }) {
                        tracing::warn!("No caption generated for {file_name}");
                    } else {
                        tracing::error!("Error processing {file_name}: {e}");
                    }
                    CaptionOutcome::Failed {
                        file_name,
                        image_path: image.path.clone(),
                        error: e.to_string(),
                        status_code,
                    }
                }
            };

            on_outcome(&outcome);
            summary.push(outcome);
        }

        summary.elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Caption generation completed: {} captioned, {} failed",
            summary.succeeded,
            summary.failed
        );
        summary
    }

    /// Read, request and write the caption for one image.
    async fn caption_single(
        &self,
        image: &ImageRecord,
        prompt: &str,
    ) -> Result<CaptionResponse, PipelineError> {
        let max_bytes = self.options.max_file_size_mb.saturating_mul(1024 * 1024);
        if image.size > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: image.path.clone(),
                size_mb: image.size / (1024 * 1024),
                max_mb: self.options.max_file_size_mb,
            });
        }

        let bytes = tokio::fs::read(&image.path)
            .await
            .map_err(|e| PipelineError::Read {
                path: image.path.clone(),
                message: e.to_string(),
            })?;

        let request = CaptionRequest {
            path: image.path.clone(),
            image: ImageInput::from_path_bytes(&image.path, &bytes),
            prompt: prompt.to_string(),
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
        };

        let response = self.request_with_retry(image, &request).await?;

        let caption_path = image.caption_path();
        tokio::fs::write(&caption_path, &response.text)
            .await
            .map_err(|e| PipelineError::Write {
                path: caption_path,
                message: e.to_string(),
            })?;

        Ok(response)
    }

    /// Call the provider, retrying transient failures up to `retry_attempts` times.
    ///
    /// Each attempt is bounded by the provider's own timeout.
    async fn request_with_retry(
        &self,
        image: &ImageRecord,
        request: &CaptionRequest,
    ) -> Result<CaptionResponse, PipelineError> {
        let timeout = self.provider.timeout();
        let mut last_error = None;

        for attempt in 0..=self.options.retry_attempts {
            if attempt > 0 {
                let delay = retry::backoff_duration(attempt - 1, self.options.retry_delay_ms);
                tracing::debug!(
                    "Retry {attempt}/{} for {:?} after {delay:?}",
                    self.options.retry_attempts,
                    image.path
                );
                tokio::time::sleep(delay).await;
            }

            let error = match tokio::time::timeout(timeout, self.provider.generate(request)).await
            {
                Ok(Ok(mut response)) => {
                    response.text = response.text.trim().to_string();
                    if response.text.is_empty() {
                        return Err(PipelineError::EmptyCaption {
                            path: image.path.clone(),
                        });
                    }
                    return Ok(response);
                }
                Ok(Err(e)) => e,
                Err(_) => PipelineError::Timeout {
                    path: image.path.clone(),
                    timeout_ms: timeout.as_millis() as u64,
                },
            };

            let retryable = retry::is_retryable(&error);
            last_error = Some(error);
            if !retryable {
                break;
            }
        }

        Err(last_error.unwrap_or_else(|| PipelineError::Service {
            message: format!("No caption request was made for {:?}", image.path),
            status_code: None,
        }))
    }
}
