//! Core data types for the caption pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An image file found in the batch directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// Full path to the image
    pub path: PathBuf,
    /// File size in bytes, as listed
    pub size: u64,
}

impl ImageRecord {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }

    /// Just the filename portion.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Sibling caption path: same directory, same stem, `.txt` extension.
    pub fn caption_path(&self) -> PathBuf {
        caption_path_for(&self.path)
    }
}

/// Sidecar caption path for an image path.
pub fn caption_path_for(image: &Path) -> PathBuf {
    image.with_extension("txt")
}

/// What happened to one image during a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaptionOutcome {
    /// A caption was generated and written next to the image.
    Captioned {
        file_name: String,
        image_path: PathBuf,
        caption_path: PathBuf,
        caption: String,
        model: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        tokens_used: Option<u32>,
        latency_ms: u64,
    },
    /// No caption file was written for this image.
    Failed {
        file_name: String,
        image_path: PathBuf,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
    },
}

impl CaptionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CaptionOutcome::Captioned { .. })
    }

    pub fn file_name(&self) -> &str {
        match self {
            CaptionOutcome::Captioned { file_name, .. } | CaptionOutcome::Failed { file_name, .. } => {
                file_name
            }
        }
    }

    /// The caption text, when one was written.
    pub fn caption(&self) -> Option<&str> {
        match self {
            CaptionOutcome::Captioned { caption, .. } => Some(caption),
            CaptionOutcome::Failed { .. } => None,
        }
    }
}

/// Result of one full pass over a directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Images with a caption file written
    pub succeeded: usize,
    /// Images without a caption file
    pub failed: usize,
    /// Wall-clock duration of the batch
    pub elapsed_ms: u64,
    /// Per-image outcomes in processing order
    pub outcomes: Vec<CaptionOutcome>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Record an outcome and update the counters.
    pub fn push(&mut self, outcome: CaptionOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(name: &str) -> CaptionOutcome {
        CaptionOutcome::Failed {
            file_name: name.to_string(),
            image_path: PathBuf::from(name),
            error: "boom".to_string(),
            status_code: Some(500),
        }
    }

    #[test]
    fn test_caption_path_replaces_extension() {
        let record = ImageRecord::new("SW_A/cat.JPG", 10);
        assert_eq!(record.caption_path(), PathBuf::from("SW_A/cat.txt"));
        assert_eq!(record.file_name(), "cat.JPG");
    }

    #[test]
    fn test_caption_path_keeps_inner_dots() {
        assert_eq!(
            caption_path_for(Path::new("set/img.v2.png")),
            PathBuf::from("set/img.v2.txt")
        );
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = BatchSummary::default();
        summary.push(failed("a.jpg"));
        summary.push(CaptionOutcome::Captioned {
            file_name: "b.jpg".to_string(),
            image_path: PathBuf::from("b.jpg"),
            caption_path: PathBuf::from("b.txt"),
            caption: "A red sweater.".to_string(),
            model: "mock".to_string(),
            tokens_used: None,
            latency_ms: 3,
        });
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.outcomes[1].caption(), Some("A red sweater."));
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(failed("cat.jpg")).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["file_name"], "cat.jpg");
        assert_eq!(json["status_code"], 500);
    }
}
