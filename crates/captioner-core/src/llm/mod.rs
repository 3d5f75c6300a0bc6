//! Caption service integration.
//!
//! Provides the provider abstraction over the vision-language service, the
//! OpenAI Chat Completions client, and retry classification for transient
//! failures.

pub mod openai;
pub mod provider;
pub(crate) mod retry;

pub use openai::OpenAiProvider;
pub use provider::{
    CaptionProvider, CaptionRequest, CaptionResponse, ImageInput, ProviderFactory,
};
