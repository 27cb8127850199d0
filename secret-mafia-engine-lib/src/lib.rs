//! Deterministic, observation-driven engine for the
//! [Secret Mafia](https://en.wikipedia.org/wiki/Mafia_(party_game)) hidden-role game.
//!
//! The engine drives an N-player game to completion by interleaving private
//! and public phases, collecting tagged actions from heterogeneous agents,
//! and routing role-scoped observations. Agent backends, prompt formatting,
//! and rendering live outside the engine boundary: the engine consumes a
//! `(player, observation history) -> action string` oracle and publishes its
//! observation stream through [`Subscriber`]s.
//!
//! A game is strictly sequential: exactly one turn is in flight at any
//! moment, and `(seed, action sequence)` fully determines the observation
//! stream and the final rewards.

use secret_mafia_lib::GameOutcome;
use secret_mafia_lib::Observation;
use secret_mafia_lib::Origin;
use secret_mafia_lib::Phase;
use secret_mafia_lib::PlayerId;
use secret_mafia_lib::Recipient;
use secret_mafia_lib::Rewards;
use secret_mafia_lib::Role;
use tracing::field;

use crate::state::GameState;

mod bus;
mod driver;
mod error;
mod handlers;
mod parser;
mod phase;
mod prompts;
mod scheduler;
mod state;

pub use bus::ObservationBus;
pub use bus::Subscriber;
pub use driver::run_game;
pub use error::MafiaEngineError;
pub use state::PlayerSet;

/// Fewer players than this cannot fill the role pool meaningfully.
pub const MIN_PLAYERS: usize = 5;
pub const MAX_PLAYERS: usize = 15;

/// Options recognized at engine construction.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Ratio of Mafia members to total players; the Mafia count is
    /// `max(1, round(num_players * mafia_ratio))`.
    pub mafia_ratio: f64,
    /// Turns each player gets in the public day discussion.
    pub discussion_rounds: usize,
    /// Invalid submissions a player may make per game before their turns
    /// start being forfeited.
    pub error_allowance: u32,
    /// Whether the Doctor may protect themselves.
    pub doctor_self_protect: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            mafia_ratio: 0.25,
            discussion_rounds: 2,
            error_allowance: 100,
            doctor_self_protect: false,
        }
    }
}

/// A rejected submission. The offending player retains their turn unless
/// `forfeited` is set.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct InvalidMove {
    pub player: PlayerId,
    pub reason: Box<str>,
    /// Set once the player has exhausted the error allowance and their turn
    /// was skipped.
    pub forfeited: bool,
}

/// Structured result of a single [`MafiaEngine::step`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StepReport {
    pub done: bool,
    pub invalid_move: Option<InvalidMove>,
    pub outcome: Option<GameOutcome>,
}

/// The Secret Mafia game engine. Single-use per game: [`MafiaEngine::reset`]
/// builds the state, [`MafiaEngine::step`] advances exactly one turn, and
/// [`MafiaEngine::close`] yields the final rewards.
pub struct MafiaEngine {
    config: EngineConfig,
    bus: ObservationBus,
    game: Option<GameState>,
}

impl MafiaEngine {
    pub fn new(config: EngineConfig) -> Self {
        MafiaEngine {
            config,
            bus: ObservationBus::new(),
            game: None,
        }
    }

    /// Attach an observation subscriber. Wrappers that track the global
    /// stream (renderers, log writers) attach here before [`Self::reset`].
    pub fn subscribe(&mut self, subscriber: Box<dyn Subscriber>) {
        self.bus.subscribe(subscriber);
    }

    pub fn bus(&self) -> &ObservationBus {
        &self.bus
    }

    /// Initializes a fresh game: validates the configuration, assigns roles
    /// with the seeded RNG, sends every player their role prompt, and enters
    /// the first night's Mafia discussion.
    ///
    /// Errors if an unfinished game is active or the role pool cannot be
    /// filled.
    #[tracing::instrument(skip(self))]
    pub fn reset(&mut self, num_players: usize, seed: Option<u64>) -> Result<(), MafiaEngineError> {
        if self.game.as_ref().is_some_and(|game| !game.is_terminal()) {
            return Err(MafiaEngineError::GameInProgress);
        }

        if num_players < MIN_PLAYERS {
            return Err(MafiaEngineError::NotEnoughPlayers(format!(
                "need at least {MIN_PLAYERS} players, got {num_players}"
            )));
        }

        if num_players > MAX_PLAYERS {
            return Err(MafiaEngineError::TooManyPlayers(format!(
                "need at most {MAX_PLAYERS} players, got {num_players}"
            )));
        }

        if !(self.config.mafia_ratio > 0.0 && self.config.mafia_ratio <= 1.0) {
            return Err(MafiaEngineError::InvalidConfig(format!(
                "mafia ratio must be in (0, 1], got {}",
                self.config.mafia_ratio
            )));
        }

        if self.config.discussion_rounds == 0 {
            return Err(MafiaEngineError::InvalidConfig(
                "need at least 1 discussion round".to_string(),
            ));
        }

        let num_mafia = usize::max(1, (num_players as f64 * self.config.mafia_ratio).round() as usize);

        if num_mafia + 2 > num_players {
            return Err(MafiaEngineError::InvalidConfig(format!(
                "{num_mafia} mafia leave no room for the doctor and detective among \
                 {num_players} players"
            )));
        }

        self.bus.clear();

        let game = GameState::new(num_players, num_mafia, seed);

        tracing::info!(
            game_id = %game.game_id,
            num_players,
            num_mafia,
            "starting game"
        );

        self.game = Some(game);

        let game = self.game.as_ref().expect("game was just created");
        let mafia_members = game.players_where(|role, _| role == Role::Mafia);

        for player in (0..num_players).map(PlayerId) {
            let prompt = prompts::initial_role_prompt(
                player,
                game.role(player),
                num_players,
                self.config.discussion_rounds,
                &mafia_members,
            );

            self.bus.emit(Origin::Game, Recipient::Player(player), prompt);
        }

        self.enter_phase(Phase::NightMafiaDiscussion);

        Ok(())
    }

    /// The current `(player, phase)` turn, or `None` once the game is over.
    pub fn current_turn(&self) -> Result<Option<(PlayerId, Phase)>, MafiaEngineError> {
        let game = self.active_game()?;

        if game.is_terminal() {
            return Ok(None);
        }

        let player = *game
            .turn_queue
            .front()
            .expect("non-terminal game has a pending turn");

        Ok(Some((player, game.phase)))
    }

    /// The current actor and their complete visible history.
    pub fn get_observation(&self) -> Result<(PlayerId, Vec<Observation>), MafiaEngineError> {
        let (player, _) = self.current_turn()?.ok_or(MafiaEngineError::GameComplete)?;

        Ok((player, self.bus.visible_history(player)))
    }

    /// `player`'s visible history: everything addressed to them or broadcast,
    /// in emission order. Debug-sink traffic never appears here.
    pub fn observe(&self, player: PlayerId) -> Result<Vec<Observation>, MafiaEngineError> {
        self.active_game()?;

        Ok(self.bus.visible_history(player))
    }

    /// Submits the current player's action and performs one turn.
    ///
    /// A malformed or out-of-range action is not an error: the report carries
    /// the rejection, the player keeps their turn (until the error allowance
    /// runs out), and no game state changes. Calling `step` after the game
    /// completed is a programmer error.
    #[tracing::instrument(
        skip(self, action),
        fields(
            phase = field::debug(self.game.as_ref().map(|game| game.phase)),
            player = field::debug(self.game.as_ref().and_then(|game| game.turn_queue.front().map(|p| p.0))),
        )
    )]
    pub fn step(&mut self, action: &str) -> Result<StepReport, MafiaEngineError> {
        let game = self.active_game()?;

        if game.is_terminal() {
            return Err(MafiaEngineError::GameComplete);
        }

        let player = *game
            .turn_queue
            .front()
            .expect("non-terminal game has a pending turn");
        let phase = game.phase;

        let invalid_move = match self.dispatch(phase, player, action) {
            Ok(()) => {
                self.advance_turn();
                None
            }
            Err(reason) => Some(self.record_invalid(player, reason, action)),
        };

        let game = self.active_game()?;

        Ok(StepReport {
            done: game.is_terminal(),
            invalid_move,
            outcome: game.outcome().cloned(),
        })
    }

    /// Finalizes the game and returns the per-player rewards: winners `+1`,
    /// losers `-1`. Closing an unfinished game marks it terminal with no
    /// outcome, and everyone receives `0`.
    pub fn close(&mut self) -> Result<Rewards, MafiaEngineError> {
        let game = self.game.as_mut().ok_or(MafiaEngineError::NoGameInProgress)?;

        game.abort();

        let mut rewards = (0..game.num_players)
            .map(|id| (PlayerId(id), 0))
            .collect::<Rewards>();

        if let Some(outcome) = game.outcome() {
            for (player, reward) in rewards.iter_mut() {
                *reward = if outcome.winners.contains(player) { 1 } else { -1 };
            }
        }

        Ok(rewards)
    }

    pub fn phase(&self) -> Result<Phase, MafiaEngineError> {
        Ok(self.active_game()?.phase)
    }

    pub fn day_number(&self) -> Result<usize, MafiaEngineError> {
        Ok(self.active_game()?.day_number)
    }

    pub fn num_players(&self) -> Result<usize, MafiaEngineError> {
        Ok(self.active_game()?.num_players)
    }

    pub fn alive_players(&self) -> Result<PlayerSet, MafiaEngineError> {
        Ok(self.active_game()?.alive.clone())
    }

    pub fn is_terminal(&self) -> Result<bool, MafiaEngineError> {
        Ok(self.active_game()?.is_terminal())
    }

    pub fn outcome(&self) -> Result<Option<GameOutcome>, MafiaEngineError> {
        Ok(self.active_game()?.outcome().cloned())
    }

    /// Players the Detective has inspected so far. For rendering only; never
    /// consulted by the engine.
    pub fn detective_inspected(&self) -> Result<&[PlayerId], MafiaEngineError> {
        Ok(&self.active_game()?.detective_inspected)
    }

    pub(crate) fn active_game(&self) -> Result<&GameState, MafiaEngineError> {
        self.game.as_ref().ok_or(MafiaEngineError::NoGameInProgress)
    }

    #[cfg(test)]
    pub(crate) fn player_roles(&self) -> &[Role] {
        &self.game.as_ref().expect("active game").roles
    }
}

#[cfg(test)]
mod tests {
    mod bus;
    mod engine;
    mod game;
    mod parser;
}
