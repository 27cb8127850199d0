//! Turn rotation: a valid submission pops the queue head, an invalid one
//! retains it, and a drained queue drives the phase controller until the
//! next turn exists or the game ends.

use secret_mafia_lib::Origin;
use secret_mafia_lib::PlayerId;
use secret_mafia_lib::Recipient;

use crate::InvalidMove;
use crate::MafiaEngine;

impl MafiaEngine {
    /// Pops the current turn after a valid submission and guarantees a next
    /// turn exists (transitioning phases as needed) unless the game ended.
    pub(crate) fn advance_turn(&mut self) {
        let game = self.game.as_mut().expect("active game");

        game.turn_queue.pop_front();

        self.ensure_turn();
    }

    /// Records an invalid submission. The player retains their turn until
    /// their per-game error count exceeds the allowance; past that point the
    /// turn is forfeited so a stuck agent cannot wedge the game.
    pub(crate) fn record_invalid(
        &mut self,
        player: PlayerId,
        reason: String,
        action: &str,
    ) -> InvalidMove {
        let game = self.game.as_mut().expect("active game");
        let tag = game.phase.action_tag();

        game.invalid_counts[player.0] += 1;
        let count = game.invalid_counts[player.0];
        let forfeited = count > self.config.error_allowance;

        tracing::warn!(%player, %reason, count, forfeited, "invalid move");

        self.bus.emit(
            Origin::Player(player),
            Recipient::Debug,
            format!("[DEBUG] invalid {tag} action from {player}: {action}"),
        );

        if forfeited {
            let game = self.game.as_mut().expect("active game");

            game.turn_queue.pop_front();

            self.ensure_turn();
        }

        InvalidMove {
            player,
            reason: reason.into(),
            forfeited,
        }
    }

    /// Drives the phase controller while the turn queue is empty: resolve the
    /// drained phase's exit actions, pick the successor, apply the round
    /// boundary (eliminations and win evaluation), and enter the next phase.
    /// Several transitions may run back to back when night phases are
    /// skipped.
    pub(crate) fn ensure_turn(&mut self) {
        loop {
            let game = self.game.as_ref().expect("active game");

            if game.is_terminal() || !game.turn_queue.is_empty() {
                return;
            }

            let phase = game.phase;

            self.resolve_phase_exit(phase);

            let next = self.successor(phase);

            self.apply_boundary(next);

            if self.game.as_ref().expect("active game").is_terminal() {
                return;
            }

            self.enter_phase(next);
        }
    }
}
