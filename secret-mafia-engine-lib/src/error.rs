use thiserror::Error;

/// Fatal engine errors.
///
/// Malformed or out-of-range player actions are never errors; they are
/// reported as invalid moves through [`crate::StepReport`] and the player
/// retains their turn.
#[derive(Error, Debug)]
pub enum MafiaEngineError {
    #[error("not enough players: {0}")]
    NotEnoughPlayers(String),
    #[error("too many players: {0}")]
    TooManyPlayers(String),
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
    #[error("no game is in progress")]
    NoGameInProgress,
    #[error("there is a game already in progress")]
    GameInProgress,
    #[error("the game has already completed")]
    GameComplete,
    #[error("expected one agent per player ({players}), got {agents}")]
    AgentCountMismatch { players: usize, agents: usize },
}
