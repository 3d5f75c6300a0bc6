//! Progress bar and end-of-run summary for caption batches.

use captioner_core::BatchSummary;
use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar for batch processing.
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after a batch.
pub fn print_summary(summary: &BatchSummary) {
    let seconds = summary.elapsed_ms as f64 / 1000.0;
    let rate = if seconds > 0.0 {
        summary.total() as f64 / seconds
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Captioned:    {:>8}", summary.succeeded);
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", summary.total());
    eprintln!("    Duration:     {:>7.1}s", seconds);
    eprintln!("    Rate:         {:>7.2} img/sec", rate);
    eprintln!("  ====================================");

    let failures: Vec<&str> = summary
        .outcomes
        .iter()
        .filter(|o| !o.is_success())
        .map(|o| o.file_name())
        .collect();
    if !failures.is_empty() {
        eprintln!("    No caption for: {}", failures.join(", "));
    }
}
