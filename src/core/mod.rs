pub mod config;
pub mod config_loader;
pub mod error;
pub mod manifest;
pub mod traits;

pub use config::*;
pub use config_loader::*;
pub use error::*;
pub use manifest::Manifest;
pub use traits::*;
