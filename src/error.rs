//! Error types for generation and for the runtime loader

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while generating the loader sources
#[derive(Error, Debug)]
pub enum GenError {
    #[error("Failed to read header {}: {source}", path.display())]
    HeaderRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read existing output {}: {source}", path.display())]
    OutputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid declaration pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Alias collision: {first} and {second} both map to {alias}")]
    AliasCollision {
        alias: String,
        first: String,
        second: String,
    },

    #[error("Generated output is stale: {}", join_paths(.0))]
    Stale(Vec<PathBuf>),
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GenError>;

/// Errors reported by [`crate::loader::ProcTable::init`]
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to open backing library {library}: {reason}")]
    Open { library: String, reason: String },
}
