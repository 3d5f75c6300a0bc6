//! File discovery for finding images in a batch directory.

use std::path::Path;
use walkdir::WalkDir;

use crate::config::ProcessingConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::ImageRecord;

/// Discovers image files directly inside a directory.
pub struct FileDiscovery {
    config: ProcessingConfig,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// List the supported image files in `dir`.
    ///
    /// Only the top level is listed; sub-directories are not descended into.
    /// Files with other extensions are skipped without comment.
    pub fn discover(&self, dir: &Path) -> PipelineResult<Vec<ImageRecord>> {
        if !dir.is_dir() {
            return Err(PipelineError::DirectoryNotFound(dir.to_path_buf()));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(PipelineError::Discovery {
                        path: dir.to_path_buf(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry in {:?}: {e}", dir);
                    continue;
                }
            };

            let entry_path = entry.path();
            if entry.file_type().is_file() && self.is_supported(entry_path) {
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                files.push(ImageRecord::new(entry_path, size));
            }
        }

        // Sort by path for deterministic ordering
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    /// Check if a file has a supported extension.
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discovery() -> FileDiscovery {
        FileDiscovery::new(ProcessingConfig::default())
    }

    #[test]
    fn test_is_supported() {
        let discovery = discovery();

        assert!(discovery.is_supported(Path::new("test.jpg")));
        assert!(discovery.is_supported(Path::new("test.JPG")));
        assert!(discovery.is_supported(Path::new("test.jpeg")));
        assert!(discovery.is_supported(Path::new("test.PnG")));
        assert!(!discovery.is_supported(Path::new("test.webp")));
        assert!(!discovery.is_supported(Path::new("test.txt")));
        assert!(!discovery.is_supported(Path::new("jpg")));
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.JPG", "notes.txt", "c.jpeg", "a.txt", "archive.zip"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let files = discovery().discover(dir.path()).unwrap();
        let names: Vec<String> = files.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "c.jpeg"]);
        assert!(files.iter().all(|f| f.size == 1));
    }

    #[test]
    fn test_discover_does_not_recurse() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("lora");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("deep.jpg"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("folder.png")).unwrap();
        std::fs::write(dir.path().join("top.jpg"), b"x").unwrap();

        let files = discovery().discover(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name(), "top.jpg");
    }

    #[test]
    fn test_discover_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("SW_A");
        let err = discovery().discover(&missing).unwrap_err();
        assert!(matches!(err, PipelineError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_discover_rejects_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cat.jpg");
        std::fs::write(&file, b"x").unwrap();
        assert!(discovery().discover(&file).is_err());
    }
}
