//! SchemeLand - an AI-assisted project planning library and CLI.
//!
//! This library provides the core functionality for the `sland` CLI tool:
//! a normalized entity store for ideas, analyses, projects, months, weeks,
//! and tasks; business operations backed by a pluggable planning oracle;
//! slot-granular persistence with local-file and remote-HTTP backends; and
//! an advisory multi-session conflict detector.

pub mod action_log;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod ops;
pub mod oracle;
pub mod persist;
#[cfg(feature = "server")]
pub mod server;
pub mod session;
pub mod store;


/// Library-level error type for SchemeLand operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Referential error: {0}")]
    Referential(String),

    #[error("At least one idea must remain")]
    LastIdea,

    #[error("Planning oracle failed: {0}")]
    Oracle(String),

    #[error("Discarded stale response: {0}")]
    Stale(String),

    #[error("Save blocked: session ownership was lost to another session")]
    SaveBlocked,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for SchemeLand operations.
pub type Result<T> = std::result::Result<T, Error>;
