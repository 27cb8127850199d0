use std::sync::Arc;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use regex::Regex;
use secret_mafia_lib::Agent;
use secret_mafia_lib::Observation;
use secret_mafia_lib::Recipient;
use secret_mafia_lib::Rewards;
use secret_mafia_lib::Team;

use crate::EngineConfig;
use crate::MafiaEngine;
use crate::MafiaEngineError;
use crate::Subscriber;
use crate::run_game;

static OPTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"'\[(\d+)\]'").unwrap());

/// Follows whatever the engine last asked for: reads the newest prompt's
/// `Use the format <tag>` instruction and answers with the first listed
/// option (or canned text for the free-form phases).
struct PromptFollower;

impl PromptFollower {
    fn latest_instruction(observations: &[Observation]) -> (String, String) {
        for observation in observations.iter().rev() {
            if let Some(idx) = observation.message.find("Use the format <") {
                let rest = &observation.message[idx + "Use the format <".len()..];
                let end = rest.find('>').expect("instruction names a tag");

                return (rest[..end].to_string(), observation.message.to_string());
            }
        }

        panic!("no format instruction in the visible history");
    }
}

impl Agent for PromptFollower {
    fn act(&mut self, observations: &[Observation]) -> String {
        let (tag, prompt) = Self::latest_instruction(observations);

        match tag.as_str() {
            "reflect" => "<reflect>weighing everyone's behavior</reflect>".to_string(),
            "discussion" => "<discussion>I have my suspicions</discussion>".to_string(),
            _ => {
                let target = OPTION_RE
                    .captures(&prompt)
                    .expect("prompt lists at least one option")[1]
                    .to_string();

                format!("<{tag}>[Player {target}]</{tag}>")
            }
        }
    }
}

/// Always answers in plain English; every turn is an invalid move until the
/// allowance forfeits it.
struct Stubborn;

impl Agent for Stubborn {
    fn act(&mut self, _observations: &[Observation]) -> String {
        "I refuse to use tags".to_string()
    }
}

struct CountingSubscriber(Arc<Mutex<usize>>);

impl Subscriber for CountingSubscriber {
    fn on_observation(&mut self, _observation: &Observation) {
        *self.0.lock().unwrap() += 1;
    }
}

fn prompt_followers(count: usize) -> Vec<Box<dyn Agent>> {
    (0..count)
        .map(|_| Box::new(PromptFollower) as Box<dyn Agent>)
        .collect()
}

#[test_log::test]
fn test_driver_runs_game_to_completion() {
    let emitted = Arc::new(Mutex::new(0));

    let mut engine = MafiaEngine::new(EngineConfig::default());
    engine.subscribe(Box::new(CountingSubscriber(Arc::clone(&emitted))));
    engine.reset(7, Some(99)).unwrap();

    let mut agents = prompt_followers(7);
    let rewards = run_game(&mut engine, &mut agents).unwrap();

    let outcome = engine.outcome().unwrap().expect("game was played out");

    assert_eq!(rewards.len(), 7);

    // Winners strictly above losers, uniform within each side.
    for (player, reward) in &rewards {
        let expected = if outcome.winners.contains(player) { 1 } else { -1 };
        assert_eq!(*reward, expected);
    }

    match outcome.winning_team {
        Team::Village => assert_eq!(outcome.winners.len(), 5),
        Team::Mafia => assert_eq!(outcome.winners.len(), 2),
    }

    // The subscriber saw the whole stream.
    assert_eq!(*emitted.lock().unwrap(), engine.bus().log().len());

    // No debug traffic: every submission was well-formed.
    assert!(
        engine
            .bus()
            .log()
            .iter()
            .all(|observation| observation.to != Recipient::Debug)
    );
}

#[test]
fn test_driver_rejects_wrong_roster_size() {
    let mut engine = MafiaEngine::new(EngineConfig::default());
    engine.reset(7, Some(1)).unwrap();

    let mut agents = prompt_followers(5);

    assert!(matches!(
        run_game(&mut engine, &mut agents),
        Err(MafiaEngineError::AgentCountMismatch {
            players: 7,
            agents: 5
        })
    ));
}

#[test_log::test]
fn test_driver_survives_stubborn_agents() {
    // A tiny allowance keeps the run short: after one retry per player every
    // further invalid submission forfeits the turn, phases resolve with no
    // recorded actions, and nobody is ever eliminated.
    let config = EngineConfig {
        error_allowance: 1,
        ..EngineConfig::default()
    };

    let mut engine = MafiaEngine::new(config);
    engine.reset(5, Some(7)).unwrap();

    let mut agents = (0..5)
        .map(|_| Box::new(Stubborn) as Box<dyn Agent>)
        .collect::<Vec<_>>();

    // Run a bounded number of turns; the game cannot finish on its own
    // since no one ever dies.
    for _ in 0..200 {
        if engine.current_turn().unwrap().is_none() {
            break;
        }

        let (player, observations) = engine.get_observation().unwrap();
        let action = agents[player.0].act(&observations);
        engine.step(&action).unwrap();
    }

    assert_eq!(engine.alive_players().unwrap().len(), 5);
    assert!(!engine.is_terminal().unwrap());
    assert!(engine.day_number().unwrap() > 1);

    let rewards = engine.close().unwrap();
    assert!(rewards.values().all(|&reward| reward == 0));
}

#[test]
fn test_driver_replay_is_deterministic() {
    let run = |seed: u64| -> (Vec<Observation>, Rewards) {
        let mut engine = MafiaEngine::new(EngineConfig::default());
        engine.reset(7, Some(seed)).unwrap();

        let mut agents = prompt_followers(7);
        let rewards = run_game(&mut engine, &mut agents).unwrap();

        (engine.bus().log().to_vec(), rewards)
    };

    let (log_a, rewards_a) = run(1234);
    let (log_b, rewards_b) = run(1234);

    assert_eq!(log_a, log_b);
    assert_eq!(rewards_a, rewards_b);
}
