use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single catalog request.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog API error: HTTP {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Malformed catalog response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl CatalogError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Http(e) if e.is_timeout() => "The catalog did not respond in time".to_string(),
            CatalogError::Http(e) if e.is_connect() => "Could not reach the catalog service".to_string(),
            CatalogError::Http(e) => format!("Network error: {}", e),
            CatalogError::Status { status: 401, .. } => {
                "The catalog rejected the API key (HTTP 401)".to_string()
            }
            CatalogError::Status { status: 404, .. } => "Title not found".to_string(),
            CatalogError::Status { status, message } => {
                format!("Catalog error ({}): {}", status, message)
            }
            CatalogError::Decode(e) => format!("Unexpected catalog response: {}", e),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No catalog API key configured")]
    MissingApiKey,
}

impl ConfigError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::MissingApiKey => {
                "No API key configured. Pass --api-key or set \"api_key\" in config.json".to_string()
            }
            other => other.to_string(),
        }
    }
}
