//! Data structures shared by the Secret Mafia engine and its consumers
//! (drivers, renderers, observation-log subscribers).

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Raw wire value of [`Origin::Game`].
pub const GAME_ID: i64 = -1;
/// Raw wire value of [`Recipient::Broadcast`].
pub const BROADCAST_ID: i64 = -1;
/// Raw wire value of [`Recipient::Debug`]. Must never reach a player's
/// visible history.
pub const DEBUG_SINK_ID: i64 = -2;

/// Identifier for a player in a game, densely numbered in `[0, N)`.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize,
)]
pub struct PlayerId(pub usize);

impl Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Unique identifier for a single game run, used for log correlation.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct GameId(pub Uuid);

impl GameId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Which side a role plays for.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Team {
    Village,
    Mafia,
}

/// A role assigned to exactly one player for the whole run.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Role {
    Villager,
    Mafia,
    /// May shield one player from the Mafia kill each night.
    Doctor,
    /// May learn whether one player is Mafia each night.
    Detective,
}

impl Role {
    pub fn team(&self) -> Team {
        match self {
            Role::Mafia => Team::Mafia,
            Role::Villager | Role::Doctor | Role::Detective => Team::Village,
        }
    }
}

/// The states of the per-round state machine.
///
/// Rounds cycle `NightMafiaDiscussion → … → DayVote → (next round)`; the
/// `NightDoctor` and `NightDetective` states are skipped when their role
/// holder is dead.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Phase {
    NightMafiaDiscussion,
    NightMafiaVote,
    NightDoctor,
    NightDetective,
    DayReflection,
    DayDiscussion,
    DayVote,
}

impl Phase {
    /// The tag an action submitted in this phase must be wrapped in.
    pub fn action_tag(&self) -> &'static str {
        match self {
            Phase::NightMafiaDiscussion => "mafia_suggest",
            Phase::NightMafiaVote => "mafia_vote",
            Phase::NightDoctor => "protect",
            Phase::NightDetective => "investigate",
            Phase::DayReflection => "reflect",
            Phase::DayDiscussion => "discussion",
            Phase::DayVote => "vote",
        }
    }
}

/// Emitter of an observation.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Origin {
    /// The engine itself (prompts, announcements, results).
    Game,
    Player(PlayerId),
}

impl Origin {
    pub fn raw_id(&self) -> i64 {
        match self {
            Origin::Game => GAME_ID,
            Origin::Player(player) => player.0 as i64,
        }
    }
}

/// Addressee of an observation.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Recipient {
    Player(PlayerId),
    /// Every alive player and every subscriber tracking the global stream.
    Broadcast,
    /// Diagnostics sink; excluded from every player's visible history.
    Debug,
}

impl Recipient {
    pub fn raw_id(&self) -> i64 {
        match self {
            Recipient::Player(player) => player.0 as i64,
            Recipient::Broadcast => BROADCAST_ID,
            Recipient::Debug => DEBUG_SINK_ID,
        }
    }
}

/// A single entry of the game's append-only observation log.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Observation {
    pub from: Origin,
    pub to: Recipient,
    pub message: Arc<str>,
}

impl Observation {
    /// Whether this observation belongs to `player`'s visible history.
    pub fn visible_to(&self, player: PlayerId) -> bool {
        matches!(self.to, Recipient::Broadcast) || self.to == Recipient::Player(player)
    }
}

/// Terminal result of a game.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct GameOutcome {
    pub winning_team: Team,
    /// Every player on the winning team, dead or alive.
    pub winners: Vec<PlayerId>,
    pub reason: Box<str>,
}

/// Final per-player rewards: winners are strictly above losers, all winners
/// equal, all losers equal.
pub type Rewards = BTreeMap<PlayerId, i32>;

/// Action oracle for one player, consumed by the driver loop.
///
/// The engine places no structural constraint on the returned string beyond
/// what the action parser for the current phase expects.
pub trait Agent {
    fn act(&mut self, observations: &[Observation]) -> String;
}
