//! Caption pipeline components.
//!
//! - **discovery**: Find image files in the batch directory
//! - **batch**: Caption each image and write its sidecar `.txt`

pub mod batch;
pub mod discovery;

// Re-exports for convenient access
pub use batch::{BatchOptions, CaptionBatch};
pub use discovery::FileDiscovery;
