//! Error types for the tictactoe-live crate

use thiserror::Error;

/// Coarse classification of failures, used by the event router to decide
/// which outbound event reports a failure and whether session state survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing field, out-of-range coordinate, unknown agent.
    Validation,
    /// Occupied cell, wrong turn, move after the game ended.
    GameRule,
    /// The agent policy produced an illegal move.
    AgentPolicy,
    /// A training job is already running for the connection.
    JobConflict,
    /// The training task itself failed.
    JobExecution,
    /// I/O, serialization or other internal faults.
    Internal,
}

/// Main error type for the crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("cell ({row}, {col}) is out of bounds (must be 0-2)")]
    InvalidCell { row: i64, col: i64 },

    #[error("cell ({row}, {col}) is already occupied")]
    CellOccupied { row: usize, col: usize },

    #[error("it is not the player's turn")]
    NotPlayerTurn,

    #[error("game is over, start a new game")]
    GameOver,

    #[error("no empty cells left on the board")]
    NoValidMoves,

    #[error("agent '{agent}' chose an illegal move ({row}, {col})")]
    AgentPolicyViolation { agent: String, row: i64, col: i64 },

    #[error("agent '{agent}' failed to choose a move: {message}")]
    AgentPolicyFailed { agent: String, message: String },

    #[error("invalid '{event}' payload: {message}")]
    InvalidPayload { event: String, message: String },

    #[error("unknown event '{event}'")]
    UnknownEvent { event: String },

    #[error("unknown agent type '{input}'. Expected one of: {expected}")]
    UnknownAgent { input: String, expected: String },

    #[error("invalid training request: {message}")]
    InvalidTrainingRequest { message: String },

    #[error("a training job is already running for this connection")]
    JobAlreadyRunning,

    #[error("training job was cancelled")]
    Cancelled,

    #[error("cannot load agent: no saved '{agent}' agent at {path}")]
    MissingSavedAgent { agent: String, path: String },

    #[error("unsupported agent save format version {found} (expected {expected})")]
    UnsupportedSaveVersion { found: u32, expected: u32 },

    #[error("saved agent is a '{found}' agent, expected '{expected}'")]
    SavedAgentMismatch { found: String, expected: String },

    #[error("training task failed: {message}")]
    TrainingFailed { message: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("failed to render rewards chart: {message}")]
    ChartRender { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },

    #[error("background task failed: {message}")]
    TaskFailed { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

impl Error {
    /// Classify this error for routing.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidCell { .. }
            | Error::InvalidPayload { .. }
            | Error::UnknownEvent { .. }
            | Error::UnknownAgent { .. }
            | Error::InvalidTrainingRequest { .. } => ErrorKind::Validation,
            Error::CellOccupied { .. }
            | Error::NotPlayerTurn
            | Error::GameOver
            | Error::NoValidMoves => ErrorKind::GameRule,
            Error::AgentPolicyViolation { .. } | Error::AgentPolicyFailed { .. } => {
                ErrorKind::AgentPolicy
            }
            Error::JobAlreadyRunning => ErrorKind::JobConflict,
            Error::Cancelled
            | Error::MissingSavedAgent { .. }
            | Error::UnsupportedSaveVersion { .. }
            | Error::SavedAgentMismatch { .. }
            | Error::TrainingFailed { .. } => ErrorKind::JobExecution,
            _ => ErrorKind::Internal,
        }
    }

    /// Message safe to send to a remote participant.
    ///
    /// Internal faults are collapsed to a generic description so paths and
    /// library messages never reach the wire.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "internal server error".to_string(),
            ErrorKind::AgentPolicy => {
                "the agent produced an illegal move; the game has been reset".to_string()
            }
            _ => self.to_string(),
        }
    }
}
