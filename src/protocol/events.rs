//! Wire events
//!
//! Every text frame carries one JSON envelope:
//!
//! ```text
//! {"event": "player_move", "data": {"row": 1, "col": 2, "agent": "q"}}
//! ```
//!
//! Inbound envelopes are decoded into [`InboundEvent`] here, so the state
//! machines only ever see typed commands. Board bounds are left to the game.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::{
    Result,
    agents::AgentSelector,
    error::Error,
    session::MoveReport,
    tictactoe::{GameOutcome, Mark},
    training::{TrainingMethod, TrainingRequest},
};

/// Outbound half of a connection
pub type EventSink = mpsc::UnboundedSender<OutboundEvent>;

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct PlayerMovePayload {
    row: i64,
    col: i64,
    #[serde(default)]
    agent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewGamePayload {
    agent: String,
}

#[derive(Debug, Deserialize)]
struct StartTrainingPayload {
    agent_type: String,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    episodes: Option<i64>,
    #[serde(default)]
    load_existing: bool,
}

/// A decoded, validated command from the participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Coordinates are range-checked by the game, which owns the board size.
    PlayerMove {
        row: i64,
        col: i64,
        /// Agent for a lazily created game; ignored once a game exists
        agent: Option<AgentSelector>,
    },
    NewGame {
        agent: AgentSelector,
    },
    StartTraining(TrainingRequest),
}

impl InboundEvent {
    pub const PLAYER_MOVE: &'static str = "player_move";
    pub const NEW_GAME: &'static str = "new_game";
    pub const START_TRAINING: &'static str = "start_training";

    /// Decode one text frame.
    ///
    /// # Errors
    ///
    /// Every failure is a validation error: malformed JSON, an unknown event
    /// name, a payload of the wrong shape, an unknown agent or an invalid
    /// training request.
    pub fn decode(text: &str) -> Result<Self> {
        let envelope: Envelope = serde_json::from_str(text).map_err(|e| Error::InvalidPayload {
            event: "envelope".to_string(),
            message: e.to_string(),
        })?;

        match envelope.event.as_str() {
            Self::PLAYER_MOVE => {
                let payload: PlayerMovePayload = payload(&envelope)?;
                Ok(InboundEvent::PlayerMove {
                    row: payload.row,
                    col: payload.col,
                    agent: payload
                        .agent
                        .as_deref()
                        .map(str::parse::<AgentSelector>)
                        .transpose()?,
                })
            }
            Self::NEW_GAME => {
                let payload: NewGamePayload = payload(&envelope)?;
                Ok(InboundEvent::NewGame {
                    agent: payload.agent.parse()?,
                })
            }
            Self::START_TRAINING => {
                let payload: StartTrainingPayload = payload(&envelope)?;
                let episodes = match payload.episodes {
                    Some(n) if n <= 0 => {
                        return Err(Error::InvalidTrainingRequest {
                            message: format!("episodes must be positive, got {n}"),
                        });
                    }
                    Some(n) => Some(n.unsigned_abs()),
                    None => None,
                };
                Ok(InboundEvent::StartTraining(TrainingRequest {
                    agent_type: payload.agent_type.parse()?,
                    method: TrainingMethod::from_wire(payload.method.as_deref())?,
                    episodes,
                    load_existing: payload.load_existing,
                }))
            }
            other => Err(Error::UnknownEvent {
                event: other.to_string(),
            }),
        }
    }

    /// Wire name, for logs
    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::PlayerMove { .. } => Self::PLAYER_MOVE,
            InboundEvent::NewGame { .. } => Self::NEW_GAME,
            InboundEvent::StartTraining(_) => Self::START_TRAINING,
        }
    }
}

fn payload<T: serde::de::DeserializeOwned>(envelope: &Envelope) -> Result<T> {
    T::deserialize(&envelope.data).map_err(|e| Error::InvalidPayload {
        event: envelope.event.clone(),
        message: e.to_string(),
    })
}

/// Events sent to the participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Follows every accepted `player_move`.
    ///
    /// `row`/`col` are absent when the player's own move ended the game.
    AgentMove {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        row: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        col: Option<usize>,
        game_over: bool,
        winner: Option<Mark>,
        message: String,
    },
    GameReset {},
    Error {
        message: String,
    },
    TrainingProgress {
        progress: f64,
        message: String,
    },
    TrainingComplete {},
    TrainingError {
        message: String,
    },
}

impl OutboundEvent {
    /// The `agent_move` answering an accepted player move.
    pub fn agent_move(report: &MoveReport) -> Self {
        let message = match report.outcome {
            Some(GameOutcome::Win(Mark::X)) => "You win!",
            Some(GameOutcome::Win(Mark::O)) => "Agent wins!",
            Some(GameOutcome::Draw) => "It's a draw!",
            None => "Your turn!",
        };
        OutboundEvent::AgentMove {
            row: report.agent_move.map(|m| m.row),
            col: report.agent_move.map(|m| m.col),
            game_over: report.outcome.is_some(),
            winner: report.outcome.and_then(GameOutcome::winner),
            message: message.to_string(),
        }
    }

    /// `error` event carrying a message safe for the wire.
    pub fn error(err: &Error) -> Self {
        OutboundEvent::Error {
            message: err.public_message(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
