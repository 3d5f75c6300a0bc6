//! CLI enum types for the caption command: template and report format.

use captioner_core::{OutputFormat, TemplateKind};
use clap::ValueEnum;

/// Built-in instruction templates.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Template {
    /// Describe the garment broadly; pose, person and background are context
    Garment,
    /// Describe pose, clothing and background; the trigger word is the person
    Person,
}

impl From<Template> for TemplateKind {
    fn from(template: Template) -> Self {
        match template {
            Template::Garment => TemplateKind::Garment,
            Template::Person => TemplateKind::Person,
        }
    }
}

/// Supported report formats.
#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum ReportFormat {
    /// Single JSON array
    #[default]
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<ReportFormat> for OutputFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Json => OutputFormat::Json,
            ReportFormat::Jsonl => OutputFormat::JsonLines,
        }
    }
}
