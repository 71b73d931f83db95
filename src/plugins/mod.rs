pub mod mirror_plugin;
pub mod plugin_loader;
pub mod repository_plugin;

pub use mirror_plugin::MirrorPlugin;
pub use plugin_loader::{PluginLoader, PublishSelection};
pub use repository_plugin::{RemoteSource, RepositoryPlugin, RepositorySettings};
