//! Append-only observation log with subscriber fan-out.
//!
//! The bus makes no content decisions and never filters by role; scoping
//! information to the right recipients is entirely the emitter's job.

use std::sync::Arc;

use secret_mafia_lib::Observation;
use secret_mafia_lib::Origin;
use secret_mafia_lib::PlayerId;
use secret_mafia_lib::Recipient;

/// Receives every emitted observation, in emission order.
///
/// Subscribers see the debug-sink traffic too; anything rendering a player's
/// view must filter with [`Observation::visible_to`].
pub trait Subscriber: Send {
    fn on_observation(&mut self, observation: &Observation);
}

#[derive(Default)]
pub struct ObservationBus {
    log: Vec<Observation>,
    subscribers: Vec<Box<dyn Subscriber>>,
}

impl ObservationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a subscriber. Subscribers survive game resets.
    pub fn subscribe(&mut self, subscriber: Box<dyn Subscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Append an observation and fan it out to every subscriber.
    pub(crate) fn emit(&mut self, from: Origin, to: Recipient, message: impl Into<Arc<str>>) {
        let observation = Observation {
            from,
            to,
            message: message.into(),
        };

        for subscriber in &mut self.subscribers {
            subscriber.on_observation(&observation);
        }

        self.log.push(observation);
    }

    /// Clears the log for a new game, keeping subscribers attached.
    pub(crate) fn clear(&mut self) {
        self.log.clear();
    }

    /// The complete emission log, including debug-sink entries.
    pub fn log(&self) -> &[Observation] {
        &self.log
    }

    /// `player`'s visible history: observations addressed to them or
    /// broadcast, in emission order.
    pub fn visible_history(&self, player: PlayerId) -> Vec<Observation> {
        self.log
            .iter()
            .filter(|observation| observation.visible_to(player))
            .cloned()
            .collect()
    }
}
