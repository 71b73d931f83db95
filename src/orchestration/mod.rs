//! Orchestration layer for addon releases
//!
//! Ties the packaging stages and publish targets into a single run and
//! produces the metadata record consumed by CI.

pub mod metadata;
pub mod release_pipeline;

// Re-export main types for convenience
pub use metadata::{ReleaseMetadata, strip_tags};
pub use release_pipeline::{ReleaseOptions, ReleasePipeline, ReleaseReport};
