pub mod core;
pub mod logging;
pub mod orchestration;
pub mod packaging;
pub mod plugins;
pub mod security;
pub mod validation;

pub use crate::core::*;
pub use orchestration::{ReleaseMetadata, ReleaseOptions, ReleasePipeline, ReleaseReport};
pub use packaging::{Archiver, FileSelector, FileSet, Stager};
pub use plugins::{MirrorPlugin, PluginLoader, RepositoryPlugin};
pub use security::{CommandError, SafeCommandExecutor, SecureTokenManager};
