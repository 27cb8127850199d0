//! Role handlers: one per phase, each validating the current player's
//! tagged action, mutating game state, and routing the resulting
//! observations.
//!
//! A handler that returns `Err` must leave game state untouched and emit no
//! game-visible observation; the scheduler turns the error into an invalid
//! move.

use std::sync::Arc;

use secret_mafia_lib::Origin;
use secret_mafia_lib::Phase;
use secret_mafia_lib::PlayerId;
use secret_mafia_lib::Recipient;
use secret_mafia_lib::Role;

use crate::MafiaEngine;
use crate::parser;
use crate::state::GameState;

fn parse_content(action: &str, tag: &str) -> Result<String, String> {
    parser::extract_tag(action, tag)
        .ok_or_else(|| format!("Response must be wrapped in <{tag}> tags"))
}

fn parse_target(content: &str, what: &str) -> Result<PlayerId, String> {
    parser::extract_target(content)
        .ok_or_else(|| format!("The {what} was not submitted in the correct format."))
}

fn require_alive(game: &GameState, target: PlayerId) -> Result<(), String> {
    if !game.in_range(target) {
        return Err(format!("{target} is not in this game"));
    }

    if !game.is_alive(target) {
        return Err(format!("{target} is not alive"));
    }

    Ok(())
}

impl MafiaEngine {
    pub(crate) fn dispatch(
        &mut self,
        phase: Phase,
        player: PlayerId,
        action: &str,
    ) -> Result<(), String> {
        match phase {
            Phase::NightMafiaDiscussion => self.handle_mafia_suggestion(player, action),
            Phase::NightMafiaVote => self.handle_mafia_vote(player, action),
            Phase::NightDoctor => self.handle_protect(player, action),
            Phase::NightDetective => self.handle_investigate(player, action),
            Phase::DayReflection => self.handle_reflection(player, action),
            Phase::DayDiscussion => self.handle_discussion(player, action),
            Phase::DayVote => self.handle_day_vote(player, action),
        }
    }

    /// Mafia point silently at a target; the suggestion is relayed to every
    /// alive Mafia member and counted toward the night's default target.
    fn handle_mafia_suggestion(&mut self, player: PlayerId, action: &str) -> Result<(), String> {
        let content = parse_content(action, "mafia_suggest")?;
        let target = parse_target(&content, "suggestion")?;

        let game = self.game.as_mut().expect("active game");

        require_alive(game, target)?;

        if game.role(target) == Role::Mafia {
            return Err(format!("{target} is a Mafia member and cannot be targeted"));
        }

        *game.kill_suggestions.entry(target).or_insert(0) += 1;

        let mafia = game.alive_mafia();
        let content: Arc<str> = Arc::from(content);

        for member in &mafia {
            self.bus.emit(
                Origin::Player(player),
                Recipient::Player(member),
                Arc::clone(&content),
            );
        }

        Ok(())
    }

    /// Each Mafia member casts one kill vote, visible to the whole Mafia.
    fn handle_mafia_vote(&mut self, player: PlayerId, action: &str) -> Result<(), String> {
        let content = parse_content(action, "mafia_vote")?;
        let target = parse_target(&content, "vote")?;

        let game = self.game.as_mut().expect("active game");

        require_alive(game, target)?;

        if game.role(target) == Role::Mafia {
            return Err(format!("{target} is a Mafia member and cannot be targeted"));
        }

        game.record_vote(player, target);

        let mafia = game.alive_mafia();
        let content: Arc<str> = Arc::from(content);

        for member in &mafia {
            self.bus.emit(
                Origin::Player(player),
                Recipient::Player(member),
                Arc::clone(&content),
            );
        }

        Ok(())
    }

    /// The Doctor picks a protectee; if it matches the Mafia's pending
    /// target, the kill is cancelled. Nobody but the Doctor sees the choice.
    fn handle_protect(&mut self, player: PlayerId, action: &str) -> Result<(), String> {
        let content = parse_content(action, "protect")?;
        let target = parse_target(&content, "action")?;

        let game = self.game.as_mut().expect("active game");

        require_alive(game, target)?;

        if target == player && !self.config.doctor_self_protect {
            return Err("The doctor cannot protect themselves".to_string());
        }

        if game.pending_elimination == Some(target) {
            game.pending_elimination = None;

            tracing::info!(%target, "doctor cancelled the mafia elimination");
        }

        self.bus
            .emit(Origin::Player(player), Recipient::Player(player), content);

        Ok(())
    }

    /// The Detective records an investigation target; the result is emitted
    /// by the phase controller when the night-detective phase resolves.
    fn handle_investigate(&mut self, player: PlayerId, action: &str) -> Result<(), String> {
        let content = parse_content(action, "investigate")?;
        let target = parse_target(&content, "action")?;

        let game = self.game.as_mut().expect("active game");

        require_alive(game, target)?;

        if target == player {
            return Err("The detective cannot investigate themselves".to_string());
        }

        game.pending_investigation = Some(target);
        game.detective_inspected.push(target);

        Ok(())
    }

    /// Private diary: the reflection is visible only to its author.
    fn handle_reflection(&mut self, player: PlayerId, action: &str) -> Result<(), String> {
        let content = parse_content(action, "reflect")?;

        self.bus
            .emit(Origin::Player(player), Recipient::Player(player), content);

        Ok(())
    }

    /// Public discussion: everything said is broadcast.
    fn handle_discussion(&mut self, player: PlayerId, action: &str) -> Result<(), String> {
        let content = parse_content(action, "discussion")?;

        self.bus
            .emit(Origin::Player(player), Recipient::Broadcast, content);

        Ok(())
    }

    /// Day vote: recorded silently; the phase controller broadcasts the
    /// aggregate summary at tally time.
    fn handle_day_vote(&mut self, player: PlayerId, action: &str) -> Result<(), String> {
        let content = parse_content(action, "vote")?;
        let target = parse_target(&content, "vote")?;

        let game = self.game.as_mut().expect("active game");

        require_alive(game, target)?;

        game.record_vote(player, target);

        Ok(())
    }
}
