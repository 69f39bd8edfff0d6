/// Error types for the board core
use thiserror::Error;

/// Errors raised while processing a frame or loading configuration.
///
/// None of these are fatal to the frame loop: a bad frame is skipped and the
/// interaction state is left untouched.
#[derive(Error, Debug)]
pub enum BoardError {
    /// The landmark detector handed over fewer points than the hand topology needs.
    #[error("expected {expected} hand landmarks, got {actual}")]
    InsufficientLandmarks { expected: usize, actual: usize },

    /// A shape name did not match any known kind.
    #[error("unknown shape type '{0}'")]
    UnknownShape(String),

    /// Configuration values that cannot drive the board.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BoardError>;
