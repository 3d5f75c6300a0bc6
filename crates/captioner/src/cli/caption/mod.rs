//! The `captioner caption` command.

mod progress;
mod setup;
pub mod types;

pub use types::{ReportFormat, Template};

use captioner_core::config::expand_path;
use captioner_core::output::write_report;
use captioner_core::pipeline::FileDiscovery;
use captioner_core::{Captioner, Config, TriggerWord};
use clap::Args;
use std::path::{Path, PathBuf};

use progress::{create_progress_bar, print_summary};
use setup::{load_config, resolve_trigger_word};

/// Arguments for the `caption` command.
#[derive(Args, Debug, Default)]
pub struct CaptionArgs {
    /// Directory of images to caption
    #[arg(required = true)]
    pub dir: PathBuf,

    /// Identity token used in every caption (defaults to the directory name)
    #[arg(short, long)]
    pub trigger_word: Option<String>,

    /// Built-in instruction template (overrides the config file)
    #[arg(long, value_enum)]
    pub template: Option<Template>,

    /// File with a custom instruction template containing {trigger_word}
    #[arg(long, conflicts_with = "template")]
    pub prompt_file: Option<PathBuf>,

    /// Model name (overrides llm.openai.model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Maximum output tokens per caption
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Retries for transient service failures (default: none)
    #[arg(long)]
    pub retries: Option<u32>,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write a per-image report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "json")]
    pub report_format: ReportFormat,

    /// List the images and the rendered prompt without calling the service
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the caption command.
pub async fn execute(args: CaptionArgs) -> anyhow::Result<()> {
    let dir = expand_path(&args.dir);
    if !dir.is_dir() {
        anyhow::bail!(
            "Image directory does not exist: {:?}\n\n  Hint: Check the path and try again.",
            dir
        );
    }

    let trigger_word = resolve_trigger_word(args.trigger_word.as_deref(), &dir)?;
    let config = load_config(&args)?;
    tracing::info!("Trigger word: {trigger_word}");

    if args.dry_run {
        return dry_run(&config, &dir, &trigger_word);
    }

    let captioner = Captioner::new(&config, None)?;
    let batch = captioner.batch();

    let images = batch.discover(&dir)?;
    if images.is_empty() {
        tracing::warn!("No supported image files found in {:?}", dir);
        return Ok(());
    }
    tracing::info!("Found {} image(s) to caption", images.len());

    let progress = create_progress_bar(images.len() as u64);
    let summary = batch
        .run_images(&images, &trigger_word, |outcome| {
            progress.inc(1);
            progress.set_message(outcome.file_name().to_string());
        })
        .await;
    progress.finish_and_clear();

    if let Some(ref report_path) = args.report {
        write_report(report_path, args.report_format.into(), &summary)?;
        tracing::info!("Report written to {:?}", report_path);
    }

    print_summary(&summary);

    // Per-image failures are logged, not turned into a failing exit status.
    Ok(())
}

/// Show what a run would do.
fn dry_run(config: &Config, dir: &Path, trigger_word: &TriggerWord) -> anyhow::Result<()> {
    let images = FileDiscovery::new(config.processing.clone()).discover(dir)?;
    let prompt = config.prompt_template()?.render(trigger_word.as_str());

    for image in &images {
        println!("{} -> {}", image.path.display(), image.caption_path().display());
    }
    println!();
    println!("Model: {}", config.llm.openai.model);
    println!("Max tokens: {}", config.caption.max_tokens);
    println!("Prompt:\n{prompt}");

    tracing::info!("Dry run: {} image(s) would be captioned", images.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_args_default_report_format_is_json() {
        let args = CaptionArgs::default();
        assert!(matches!(args.report_format, ReportFormat::Json));
    }

    #[test]
    fn caption_args_default_option_fields_are_none() {
        let args = CaptionArgs::default();
        assert!(args.trigger_word.is_none());
        assert!(args.template.is_none());
        assert!(args.model.is_none());
        assert!(args.retries.is_none());
        assert!(args.report.is_none());
        assert!(!args.dry_run);
    }

    #[tokio::test]
    async fn missing_directory_is_a_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = CaptionArgs {
            dir: dir.path().join("SW_A"),
            ..CaptionArgs::default()
        };
        let err = execute(args).await.unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn dry_run_lists_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cat.jpg"), b"x").unwrap();
        let trigger = TriggerWord::new("SW_A").unwrap();

        dry_run(&Config::default(), dir.path(), &trigger).unwrap();
        assert!(!dir.path().join("cat.txt").exists());
    }
}
