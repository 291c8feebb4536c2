//! Configuration loading

pub mod file_config;
pub mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileCryptoConfig, FileInviteConfig, FileLoggingConfig,
    FileSynthesizerConfig,
};
pub use loader::ConfigLoader;
