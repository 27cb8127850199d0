//! Phase controller: owns the phase DAG, its entry prompts and turn-queue
//! seeding, and the end-of-phase resolution (vote tallies, night kill,
//! detective result).

use std::collections::VecDeque;
use std::sync::Arc;

use secret_mafia_lib::Origin;
use secret_mafia_lib::Phase;
use secret_mafia_lib::Recipient;
use secret_mafia_lib::Role;
use tap::Tap;

use crate::MafiaEngine;
use crate::prompts;
use crate::state::strict_plurality;
use crate::state::tally_votes;

impl MafiaEngine {
    /// The phase that follows `phase`, skipping the Doctor and Detective
    /// nights when their role holder is dead.
    pub(crate) fn successor(&self, phase: Phase) -> Phase {
        let game = self.game.as_ref().expect("active game");
        let doctor_alive = game.is_alive(game.role_holder(Role::Doctor));
        let detective_alive = game.is_alive(game.role_holder(Role::Detective));

        match phase {
            Phase::NightMafiaDiscussion => Phase::NightMafiaVote,
            Phase::NightMafiaVote if doctor_alive => Phase::NightDoctor,
            Phase::NightMafiaVote if detective_alive => Phase::NightDetective,
            Phase::NightMafiaVote => Phase::DayReflection,
            Phase::NightDoctor if detective_alive => Phase::NightDetective,
            Phase::NightDoctor => Phase::DayReflection,
            Phase::NightDetective => Phase::DayReflection,
            Phase::DayReflection => Phase::DayDiscussion,
            Phase::DayDiscussion => Phase::DayVote,
            Phase::DayVote => Phase::NightMafiaDiscussion,
        }
    }

    /// Exit actions for `phase`, run once its turn queue has drained.
    pub(crate) fn resolve_phase_exit(&mut self, phase: Phase) {
        match phase {
            Phase::NightMafiaVote => {
                let game = self.game.as_mut().expect("active game");

                // A tied vote falls back to the discussion's most-suggested
                // target, and only if that plurality is strict as well.
                let pending = strict_plurality(&tally_votes(&game.votes))
                    .or_else(|| strict_plurality(&game.kill_suggestions));

                tracing::info!(?pending, "mafia vote resolved");

                game.pending_elimination = pending;
                game.votes.clear();
                game.kill_suggestions.clear();
            }
            Phase::NightDetective => {
                let game = self.game.as_mut().expect("active game");

                if let Some(target) = game.pending_investigation.take() {
                    let detective = game.role_holder(Role::Detective);
                    let is_mafia = game.role(target) == Role::Mafia;
                    let others =
                        game.players_where(|role, alive| alive && role != Role::Detective);

                    self.bus.emit(
                        Origin::Game,
                        Recipient::Player(detective),
                        prompts::detective_result(target, is_mafia),
                    );

                    for player in &others {
                        self.bus.emit(
                            Origin::Game,
                            Recipient::Player(player),
                            prompts::DETECTIVE_NOTICE,
                        );
                    }
                }
            }
            Phase::DayVote => {
                let game = self.game.as_mut().expect("active game");

                game.pending_elimination = strict_plurality(&tally_votes(&game.votes));

                let summary = prompts::vote_summary(&game.votes);
                self.bus.emit(Origin::Game, Recipient::Broadcast, summary);
            }
            Phase::NightMafiaDiscussion
            | Phase::NightDoctor
            | Phase::DayReflection
            | Phase::DayDiscussion => {}
        }
    }

    /// Round-boundary effects, run between leaving one phase and entering
    /// `next`: the night kill is finalized going into the day, the day vote
    /// going into the night, and both finalization points evaluate the win
    /// conditions.
    pub(crate) fn apply_boundary(&mut self, next: Phase) {
        match next {
            Phase::DayReflection => {
                let game = self.game.as_mut().expect("active game");
                let eliminated = game.pending_elimination.take();

                if let Some(player) = eliminated {
                    game.eliminate(player);
                    tracing::info!(%player, "eliminated during the night");
                }

                self.bus.emit(
                    Origin::Game,
                    Recipient::Broadcast,
                    prompts::night_elimination(eliminated),
                );

                game.votes.clear();
                game.evaluate_win();
            }
            Phase::NightMafiaDiscussion => {
                let game = self.game.as_mut().expect("active game");
                let eliminated = game.pending_elimination.take();

                if let Some(player) = eliminated {
                    game.eliminate(player);
                    tracing::info!(%player, "eliminated after voting");
                }

                self.bus.emit(
                    Origin::Game,
                    Recipient::Broadcast,
                    prompts::day_elimination(eliminated),
                );

                game.votes.clear();
                game.evaluate_win();
                game.day_number += 1;
            }
            _ => {}
        }
    }

    /// Makes `phase` current: emits its entry prompts and seeds the turn
    /// queue from the engine RNG.
    pub(crate) fn enter_phase(&mut self, phase: Phase) {
        let game = self.game.as_mut().expect("active game");

        game.phase = phase;

        tracing::info!(?phase, day = game.day_number, "entering phase");

        match phase {
            Phase::NightMafiaDiscussion => {
                // TODO: allow free-form mafia chat here instead of
                // target-pointing only
                let mafia = game.alive_mafia();
                let targets = game.alive.clone().tap_mut(|set| set.difference_with(&mafia));
                let prompt: Arc<str> = Arc::from(prompts::mafia_discussion_prompt(&targets));

                for member in &mafia {
                    self.bus
                        .emit(Origin::Game, Recipient::Player(member), Arc::clone(&prompt));
                }

                game.kill_suggestions.clear();

                // Two suggestion turns per Mafia per night.
                let order = game.shuffled(&mafia);
                game.turn_queue = order.iter().chain(order.iter()).copied().collect();
            }
            Phase::NightMafiaVote => {
                let mafia = game.alive_mafia();
                let targets = game.alive.clone().tap_mut(|set| set.difference_with(&mafia));
                let prompt: Arc<str> = Arc::from(prompts::mafia_vote_prompt(&targets));

                for member in &mafia {
                    self.bus
                        .emit(Origin::Game, Recipient::Player(member), Arc::clone(&prompt));
                }

                game.votes.clear();
                game.turn_queue = game.shuffled(&mafia).into();
            }
            Phase::NightDoctor => {
                let doctor = game.role_holder(Role::Doctor);
                let targets = game.alive.clone().tap_mut(|set| {
                    if !self.config.doctor_self_protect {
                        set.remove(doctor);
                    }
                });

                self.bus.emit(
                    Origin::Game,
                    Recipient::Player(doctor),
                    prompts::doctor_prompt(&targets),
                );

                game.turn_queue = VecDeque::from([doctor]);
            }
            Phase::NightDetective => {
                let detective = game.role_holder(Role::Detective);
                let targets = game.alive.clone().tap_mut(|set| {
                    set.remove(detective);
                });

                self.bus.emit(
                    Origin::Game,
                    Recipient::Player(detective),
                    prompts::detective_prompt(&targets),
                );

                game.turn_queue = VecDeque::from([detective]);
            }
            Phase::DayReflection => {
                let alive = game.alive.clone();
                let prompt: Arc<str> = Arc::from(prompts::reflection_prompt());

                for player in &alive {
                    self.bus
                        .emit(Origin::Game, Recipient::Player(player), Arc::clone(&prompt));
                }

                game.turn_queue = game.shuffled(&alive).into();
            }
            Phase::DayDiscussion => {
                self.bus.emit(
                    Origin::Game,
                    Recipient::Broadcast,
                    prompts::discussion_prompt(self.config.discussion_rounds),
                );

                let alive = game.alive.clone();
                let order = game.shuffled(&alive);
                let mut queue = VecDeque::with_capacity(order.len() * self.config.discussion_rounds);

                for _ in 0..self.config.discussion_rounds {
                    queue.extend(order.iter().copied());
                }

                game.turn_queue = queue;
            }
            Phase::DayVote => {
                let alive = game.alive.clone();

                self.bus.emit(
                    Origin::Game,
                    Recipient::Broadcast,
                    prompts::day_vote_prompt(&alive),
                );

                game.votes.clear();
                game.turn_queue = game.shuffled(&alive).into();
            }
        }
    }
}
