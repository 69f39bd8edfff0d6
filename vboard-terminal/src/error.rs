use thiserror::Error;
use vboard_core::BoardError;

use crate::replay::ReplayError;

/// Failures that end the terminal front end
#[derive(Error, Debug)]
pub enum AppError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error(transparent)]
    Board(#[from] BoardError),
}
