//! Error types for the file-backed layers (settings, tuning overrides)
//!
//! The simulation itself never fails: every degenerate case inside a tick
//! resolves to a no-op.

/// Error type for loading and saving game data
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed but semantically invalid settings
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Balance overrides the simulation cannot run with
    #[error("Invalid tuning: {0}")]
    InvalidTuning(String),
}

/// Result type for game data operations
pub type Result<T> = std::result::Result<T, GameError>;
