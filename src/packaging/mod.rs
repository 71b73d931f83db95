//! Packaging stages: select the shipped entries, stage them, archive them.

pub mod archiver;
pub mod file_selector;
pub mod staging;

pub use archiver::Archiver;
pub use file_selector::{FileSelector, FileSet};
pub use staging::{CopyStats, Stager, copy_tree};
