use std::sync::Arc;
use std::sync::Mutex;

use secret_mafia_lib::Observation;
use secret_mafia_lib::Origin;
use secret_mafia_lib::PlayerId;
use secret_mafia_lib::Recipient;

use crate::bus::ObservationBus;
use crate::bus::Subscriber;

/// Records everything it sees, in order.
struct Recorder(Arc<Mutex<Vec<Observation>>>);

impl Subscriber for Recorder {
    fn on_observation(&mut self, observation: &Observation) {
        self.0.lock().unwrap().push(observation.clone());
    }
}

#[test]
fn test_emission_order_and_fanout() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut bus = ObservationBus::new();

    bus.subscribe(Box::new(Recorder(Arc::clone(&seen))));

    bus.emit(Origin::Game, Recipient::Broadcast, "round start");
    bus.emit(Origin::Player(PlayerId(0)), Recipient::Player(PlayerId(1)), "psst");
    bus.emit(Origin::Player(PlayerId(0)), Recipient::Debug, "[DEBUG] oops");

    // Subscribers see every emission, including debug-sink traffic, in
    // emission order.
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert_eq!(*seen, bus.log());
    assert_eq!(&*seen[0].message, "round start");
    assert_eq!(seen[2].to, Recipient::Debug);
}

#[test]
fn test_visible_history_scoping() {
    let mut bus = ObservationBus::new();

    bus.emit(Origin::Game, Recipient::Broadcast, "to everyone");
    bus.emit(Origin::Game, Recipient::Player(PlayerId(1)), "to player 1");
    bus.emit(Origin::Game, Recipient::Player(PlayerId(2)), "to player 2");
    bus.emit(Origin::Player(PlayerId(1)), Recipient::Debug, "[DEBUG] noise");

    let history = bus.visible_history(PlayerId(1));

    // Broadcasts and directed messages only; nothing addressed to another
    // player and never the debug sink.
    assert_eq!(
        history
            .iter()
            .map(|observation| &*observation.message)
            .collect::<Vec<_>>(),
        vec!["to everyone", "to player 1"],
    );
}

#[test]
fn test_clear_keeps_subscribers() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut bus = ObservationBus::new();

    bus.subscribe(Box::new(Recorder(Arc::clone(&seen))));

    bus.emit(Origin::Game, Recipient::Broadcast, "game one");
    bus.clear();

    assert!(bus.log().is_empty());

    bus.emit(Origin::Game, Recipient::Broadcast, "game two");

    // The log restarted but the subscriber kept listening across games.
    assert_eq!(bus.log().len(), 1);
    assert_eq!(seen.lock().unwrap().len(), 2);
}
