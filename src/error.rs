//! Error types
//!
//! Only configuration errors are fatal. Transport errors are recovered inside
//! the feed and never reach the simulation.

use thiserror::Error;

/// Invalid game configuration, surfaced at construction
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown difficulty profile `{0}`")]
    UnknownDifficulty(String),
    #[error("difficulty table is empty")]
    EmptyTable,
    #[error("invalid difficulty table: {0}")]
    InvalidTable(#[source] serde_json::Error),
    #[error("invalid settings: {0}")]
    InvalidSettings(#[source] serde_json::Error),
}

/// Failure talking to the narrative endpoint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("narrative endpoint returned HTTP {0}")]
    Status(u16),
    #[error("narrative request failed: {0}")]
    Network(String),
    #[error("malformed narrative response: {0}")]
    Malformed(String),
}
