//! Driver loop: feeds each pending turn's visible history to the matching
//! agent oracle and submits the returned action until the game completes.

use secret_mafia_lib::Agent;
use secret_mafia_lib::Rewards;

use crate::MafiaEngine;
use crate::MafiaEngineError;

/// Runs a reset engine to completion against one agent per player and
/// returns the final rewards.
///
/// Timeouts and forfeit decisions for unresponsive agents belong to the
/// caller; within one game, turns are strictly sequential. An agent that
/// keeps submitting invalid actions is retried until the engine's error
/// allowance forfeits its turns, so the loop always terminates.
pub fn run_game(
    engine: &mut MafiaEngine,
    agents: &mut [Box<dyn Agent>],
) -> Result<Rewards, MafiaEngineError> {
    let players = engine.num_players()?;

    if agents.len() != players {
        return Err(MafiaEngineError::AgentCountMismatch {
            players,
            agents: agents.len(),
        });
    }

    while engine.current_turn()?.is_some() {
        let (player, observations) = engine.get_observation()?;
        let action = agents[player.0].act(&observations);
        let report = engine.step(&action)?;

        if let Some(invalid) = &report.invalid_move {
            tracing::debug!(
                player = invalid.player.0,
                reason = %invalid.reason,
                forfeited = invalid.forfeited,
                "agent submitted an invalid action"
            );
        }

        if report.done {
            break;
        }
    }

    engine.close()
}
