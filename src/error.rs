//! Error types for the trade equalizer

use thiserror::Error;

/// Main error type for the trade equalizer
///
/// The search itself never fails: "no acceptable deal" is a value, not an error.
/// These variants cover failing collaborators and rejected inputs.
#[derive(Error, Debug)]
pub enum EqualizerError {
    // Collaborator errors
    #[error("Valuation oracle error: {0}")]
    Oracle(String),

    // Precondition errors
    #[error("Invalid proposal: {0}")]
    InvalidProposal(String),

    // Configuration errors
    #[error("Invalid configuration value: {0}")]
    InvalidConfig(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

/// Result type alias for equalizer operations
pub type Result<T> = std::result::Result<T, EqualizerError>;
