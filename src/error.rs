/// Errors raised by the rules engine and the game state machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("position out of range: row {row}, col {col}")]
    OutOfBounds { row: u8, col: u8 },

    /// The move was not enumerated for this board and player.
    #[error("invalid move: {0}")]
    InvalidMove(&'static str),

    #[error("illegal move at row {row}, col {col}")]
    IllegalMove { row: u8, col: u8 },

    #[error("game is already over")]
    GameOver,

    #[error("malformed board: {0}")]
    MalformedBoard(String),
}

/// Errors that can occur when loading host configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to deserialize config: {0}")]
    Deserialize(String),

    #[error("config validation error: {0}")]
    Validation(String),
}
