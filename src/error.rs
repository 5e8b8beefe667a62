use std::path::PathBuf;
use thiserror::Error;

/// Failure to inspect what a download provider accepts.
///
/// Never fatal: the dispatcher treats any probe failure as "historical dates unsupported".
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Provider '{0}' does not support introspection")]
    Unsupported(String),

    #[error("Failed to run '{command}' to inspect its arguments")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status} while listing its arguments")]
    Status { command: String, status: String },
}

/// Failure raised by the download itself. Passed through to the caller unmodified.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Failed to start '{command}'")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}: {stderr}")]
    Status {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Failed to create storage directory '{0}'")]
    StorageDir(PathBuf, #[source] std::io::Error),

    #[error("Download failed: {0}")]
    Failed(String),
}

/// Failure to load an explicitly requested configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    Parse(PathBuf, #[source] toml::de::Error),
}
