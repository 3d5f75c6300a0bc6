//! Captioner Core - batch caption generation for LoRA training images.
//!
//! Captioner takes a directory of garment or person images and writes one
//! caption per image, produced by a hosted vision-language model, into a
//! sibling `<stem>.txt` file. Every caption refers to the subject through a
//! trigger word.
//!
//! # Architecture
//!
//! ```text
//! Directory → Discover → Read + base64 → Caption service → <stem>.txt
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use captioner_core::{Captioner, Config, TriggerWord};
//!
//! #[tokio::main]
//! async fn main() -> captioner_core::Result<()> {
//!     let config = Config::load()?;
//!     let captioner = Captioner::new(&config, None)?;
//!
//!     let trigger = TriggerWord::new("SW_A").expect("non-empty");
//!     let summary = captioner.run_batch("./SW_A".as_ref(), &trigger).await?;
//!     println!("{} captioned, {} failed", summary.succeeded, summary.failed);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{CaptionError, ConfigError, PipelineError, PipelineResult, Result};
pub use llm::{CaptionProvider, ProviderFactory};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{BatchOptions, CaptionBatch};
pub use prompt::{PromptTemplate, TemplateKind, TriggerWord};
pub use types::{BatchSummary, CaptionOutcome, ImageRecord};

use std::path::Path;
use std::time::Duration;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Captioner - the main entry point for batch captioning.
///
/// Binds the configured caption service (with its credentials) to the batch
/// options derived from a [`Config`].
pub struct Captioner {
    batch: CaptionBatch,
}

impl Captioner {
    /// Build a captioner from config.
    ///
    /// `api_key` overrides the key configured under `llm.openai.api_key`.
    pub fn new(config: &Config, api_key: Option<&str>) -> Result<Self> {
        tracing::debug!("Initializing Captioner v{}", VERSION);
        let timeout = Duration::from_millis(config.limits.request_timeout_ms);
        let provider = ProviderFactory::create(&config.llm, None, api_key, timeout)?;
        let options = BatchOptions::from_config(config)?;
        Ok(Self::with_provider(provider, options))
    }

    /// Build a captioner around an explicit provider.
    pub fn with_provider(provider: Box<dyn CaptionProvider>, options: BatchOptions) -> Self {
        Self {
            batch: CaptionBatch::new(provider, options),
        }
    }

    /// The underlying batch processor.
    pub fn batch(&self) -> &CaptionBatch {
        &self.batch
    }

    /// Caption every image in `dir` using `trigger_word`.
    pub async fn run_batch(&self, dir: &Path, trigger_word: &TriggerWord) -> Result<BatchSummary> {
        Ok(self.batch.run(dir, trigger_word, |_| {}).await?)
    }
}
