// Error taxonomy for bac-hunter
// Startup errors are fatal; per-request failures never show up here (they are outcome data)

use std::path::PathBuf;
use thiserror::Error;

/// Credential file problems. Fatal: raised before any probing begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read session config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse session config: {0}")]
    Parse(String),

    #[error("Invalid configuration for user {0}")]
    InvalidIdentity(String),

    #[error("User {0} must have either cookie or token")]
    MissingCredential(String),

    #[error("User {0} must have either cookie or token, not both")]
    AmbiguousCredential(String),

    #[error("Session config defines no users")]
    NoIdentities,
}

/// Endpoint list problems. Fatal.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("Failed to read sitemap {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize findings: {0}")]
    Serialize(#[from] serde_json::Error),
}
