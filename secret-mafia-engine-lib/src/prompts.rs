//! Prompt and announcement texts emitted over the observation bus.
//!
//! Everything an agent ever reads is assembled here; the phase controller
//! and role handlers decide who receives it.

use secret_mafia_lib::PlayerId;
use secret_mafia_lib::Role;
use secret_mafia_lib::Team;

use crate::state::PlayerSet;

/// The broadcast sent to every non-Detective player after an investigation.
pub(crate) const DETECTIVE_NOTICE: &str = "The detective has seen an undisclosed player's role";

pub(crate) fn role_description(role: Role) -> &'static str {
    match role {
        Role::Villager => {
            "A regular villager. Your goal is to identify and eliminate all Mafia members \
             through voting during the day."
        }
        Role::Mafia => {
            "A Mafia member. Your goal is to eliminate enough villagers to gain majority. \
             During the night phase, you can communicate secretly with other Mafia members \
             and vote to eliminate a villager."
        }
        Role::Doctor => {
            "A villager with medical skills. During the night phase, you can choose one \
             player to protect from Mafia elimination."
        }
        Role::Detective => {
            "A villager with investigative skills. During the night phase, you can \
             investigate one player to learn if they are a Mafia member."
        }
    }
}

fn team_name(team: Team) -> &'static str {
    match team {
        Team::Village => "Village",
        Team::Mafia => "Mafia",
    }
}

/// Appends the tagged-response instructions to a prompt, the same way for
/// every phase.
pub(crate) fn format_tagged_prompt(base_prompt: &str, tag: &str, instruction: &str) -> String {
    let mut prompt = format!(
        "{base_prompt}\n\nPlease provide your response in XML format using the <{tag}> tag. \
         For example: <{tag}>Your response here</{tag}>\n"
    );

    if !instruction.is_empty() {
        prompt.push_str(&format!("\n{instruction}\n"));
    }

    prompt
}

/// Renders valid targets the way agents are expected to quote them:
/// `'[3]', '[5]'`.
fn target_list(targets: &PlayerSet) -> String {
    targets
        .iter()
        .map(|player| format!("'[{}]'", player.0))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The once-per-game role prompt each player receives at reset.
pub(crate) fn initial_role_prompt(
    player: PlayerId,
    role: Role,
    num_players: usize,
    discussion_rounds: usize,
    mafia_members: &PlayerSet,
) -> String {
    let player_list = (0..num_players)
        .map(|id| format!("Player {id}"))
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = format!(
        "Welcome to Secret Mafia! You are {player}.\n\
         Your role: {role:?}\n\
         Team: {team}\n\
         Description: {description}\n\n\
         Players: {player_list}\n\n\
         Game Overview:\n\
         All Roles and Their Abilities:\n\
         \x20   • Villager: Regular villager with no special abilities. Goal is to identify and eliminate Mafia members.\n\
         \x20   • Mafia: During the night, can secretly coordinate (without talking) with other Mafia members to eliminate a player.\n\
         \x20   • Doctor: Can protect one player from elimination each night.\n\
         \x20   • Detective: Can investigate one player each night: will be told whether they are Mafia.\n\n\
         \x20   • Players do not know other players' roles, aside from any investigation results made by the detective.\n\n\
         The game starts with the Night phase, where special roles take their actions\n\
         \x20   • The Mafia can coordinate (without talking) with other Mafia members and vote to eliminate a player\n\
         \x20   • If there is a tie, no one is eliminated\n\
         \x20   • If the Doctor chooses to save the player elected by the Mafia, the player is not eliminated\n\n\
         \x20   • If the Detective investigates a player and they are Mafia, the Detective will know\n\n\
         During the Day phase, there are two parts:\n\
         \x20 1. Private Reflection: Each player gets time to think privately about the game state\n\
         \x20    - Your thoughts during this phase are NOT shared with other players\n\
         \x20    - Use this time to analyze the game and plan your strategy\n\
         \x20 2. Public Discussion: {discussion_rounds} rounds of open discussion\n\
         \x20    - Everything you say in this phase is visible to ALL players\n\
         \x20    - Be careful about what you reveal and how you present yourself\n\
         After discussions, all players must vote to eliminate one player\n\
         The game ends when either all Mafia members are eliminated (Village wins) or\n\
         Mafia members equal or outnumber Villagers (Mafia wins)\n\n",
        team = team_name(role.team()),
        description = role_description(role),
    );

    match role {
        Role::Mafia => {
            let teammates = mafia_members
                .iter()
                .map(|member| member.to_string())
                .collect::<Vec<_>>()
                .join(", ");

            prompt.push_str(&format!(
                "You are part of the Mafia team. Your teammates are: {teammates}.\n\n\
                 Your abilities:\n\
                 \x20 During DAY phase:\n\
                 \x20   • Everything you say is automatically shared with all players\n\
                 \x20   • You'll vote to eliminate a player at the end of discussions\n\n\
                 \x20 During NIGHT phase:\n\
                 \x20   • First, you'll discuss with other Mafia members about who to eliminate\n\
                 \x20   • Then, you'll vote to eliminate a player (must be a non-Mafia player)\n\
                 \x20   • Use the format '[Player X]' to vote\n\n\
                 Your goal is to eliminate enough villagers until Mafia members equal or outnumber the Villagers.\n\n"
            ));
        }
        Role::Doctor => {
            prompt.push_str(
                "Your abilities:\n\
                 \x20 During DAY phase:\n\
                 \x20   • Everything you say is automatically shared with all players\n\
                 \x20   • You'll vote to eliminate a player at the end of discussions\n\n\
                 \x20 During NIGHT phase:\n\
                 \x20   • You can protect one player from being eliminated by the Mafia\n\
                 \x20   • Use the format '[Player X]' to protect a player\n\
                 \x20   • You cannot protect yourself\n\n\
                 Your goal is to help identify and eliminate all Mafia members.\n\n",
            );
        }
        Role::Detective => {
            prompt.push_str(
                "Your abilities:\n\
                 \x20 During DAY phase:\n\
                 \x20   • Everything you say is automatically shared with all players\n\
                 \x20   • You'll vote to eliminate a player at the end of discussions\n\n\
                 \x20 During NIGHT phase:\n\
                 \x20   • You can investigate one player to learn if they are Mafia\n\
                 \x20   • Use the format '[Player X]' to investigate a player\n\
                 \x20   • You'll receive immediate results of your investigation\n\n\
                 Your goal is to help identify and eliminate all Mafia members.\n\n",
            );
        }
        Role::Villager => {
            prompt.push_str(
                "Your abilities:\n\
                 \x20 During DAY phase:\n\
                 \x20   • Everything you say is automatically shared with all players\n\
                 \x20   • You'll vote to eliminate a player at the end of discussions\n\n\
                 \x20 During NIGHT phase:\n\
                 \x20   • You have no special actions during the night phase\n\
                 \x20   • You must wait for the day phase to participate\n\n\
                 Your goal is to help identify and eliminate all Mafia members.\n\n",
            );
        }
    }

    prompt
}

pub(crate) fn mafia_discussion_prompt(valid_targets: &PlayerSet) -> String {
    let base_prompt = format!(
        "The Night phase has begun. As Mafia members, you must silently coordinate your target.\n\
         You cannot speak or write messages - you can only point to your intended target.\n\
         Valid targets: {targets}\n\n\
         Remember:\n\
         • You cannot write explanations or discuss\n\
         • You can only point to a player\n\
         • After this round, you will vote on the final target\n\
         • If you don't agree with a suggestion, you can point to a different player\n\
         • The player with the most suggestions will be the default target for voting\n\
         • If you speak out loud by saying anything other than pointing to a target, other \
           players will hear you and know you're mafia",
        targets = target_list(valid_targets),
    );

    format_tagged_prompt(
        &base_prompt,
        "mafia_suggest",
        "Use the format <mafia_suggest>[Player X]</mafia_suggest> to indicate your suggestion.",
    )
}

pub(crate) fn mafia_vote_prompt(valid_targets: &PlayerSet) -> String {
    let base_prompt = format!(
        "The voting phase has begun. Please vote who you would like to kill. Valid votes: {}",
        target_list(valid_targets),
    );

    format_tagged_prompt(
        &base_prompt,
        "mafia_vote",
        "Use the format <mafia_vote>[Player X]</mafia_vote> to cast your vote. \
         Do not include any other text.",
    )
}

pub(crate) fn doctor_prompt(valid_targets: &PlayerSet) -> String {
    let base_prompt = format!(
        "We are in the Night phase. Since you are the doctor, you can decide which player \
         to save. Valid options: {}",
        target_list(valid_targets),
    );

    format_tagged_prompt(
        &base_prompt,
        "protect",
        "Use the format <protect>[Player X]</protect> to protect a player.",
    )
}

pub(crate) fn detective_prompt(valid_targets: &PlayerSet) -> String {
    let base_prompt = format!(
        "We are in the Night phase. Since you are the detective, you can decide which player \
         to investigate. Valid options: {}",
        target_list(valid_targets),
    );

    format_tagged_prompt(
        &base_prompt,
        "investigate",
        "Use the format <investigate>[Player X]</investigate> to investigate a player.",
    )
}

pub(crate) fn reflection_prompt() -> String {
    let base_prompt = "Take a moment to reflect privately:\n\n\
         1. Current State & Position:\n\
         \x20  - What is your current role and position in the game?\n\
         \x20  - What are your immediate goals and concerns?\n\
         \x20  - What can you do to help your team win?\n\n\
         2. Player Analysis. For each other player:\n\
         \x20  - Analyze their behavior and decisions so far\n\
         \x20  - Consider their voting patterns and discussion contributions\n\
         \x20  - Note any suspicious patterns or inconsistencies\n\
         \x20  - If you are a villager, do you suspect them?\n\n\
         3. Perception Check. For each other player:\n\
         \x20  - How do you think they perceive you?\n\
         \x20  - If you are mafia, do you think they suspect you?\n\
         \x20  - How can you maintain or change their perception?\n\n\
         Take your time to think through these points carefully.";

    format_tagged_prompt(
        base_prompt,
        "reflect",
        "Use the format <reflect>Your reflection here</reflect> to record your thoughts.",
    )
}

pub(crate) fn discussion_prompt(discussion_rounds: usize) -> String {
    let base_prompt = format!(
        "PUBLIC DISCUSSION PHASE - ALL MESSAGES WILL BE SEEN BY EVERYONE\n\n\
         IMPORTANT: Everything you say in this phase will be visible to ALL players.\n\
         Be careful about what you reveal and how you present yourself.\n\
         Remember that other players will analyze your words and behavior.\n\n\
         For the next {discussion_rounds} rounds, you can converse freely with the other \
         players to decide who you ultimately want to vote out.\n\n\
         Each player will have {discussion_rounds} turns to discuss.\n\
         The order of discussion will be randomized."
    );

    format_tagged_prompt(
        &base_prompt,
        "discussion",
        "Use the format <discussion>Your message here</discussion> to participate in the discussion.",
    )
}

pub(crate) fn day_vote_prompt(valid_targets: &PlayerSet) -> String {
    let base_prompt = format!(
        "The voting phase has begun. On your turn, submit your vote for which player you \
         want to vote out. Valid options: {}",
        target_list(valid_targets),
    );

    format_tagged_prompt(
        &base_prompt,
        "vote",
        "Use the format <vote>[Player X]</vote> to cast your vote.",
    )
}

pub(crate) fn detective_result(target: PlayerId, is_mafia: bool) -> String {
    if is_mafia {
        format!("{target} is part of the Mafia")
    } else {
        format!("{target} is NOT part of the Mafia")
    }
}

pub(crate) fn night_elimination(eliminated: Option<PlayerId>) -> String {
    match eliminated {
        Some(player) => format!("{player} has been eliminated during the night."),
        None => "No player has been eliminated during the night.".to_string(),
    }
}

pub(crate) fn day_elimination(eliminated: Option<PlayerId>) -> String {
    match eliminated {
        Some(player) => format!("{player} has been eliminated after voting."),
        None => "No player has been eliminated after voting.".to_string(),
    }
}

/// The aggregate vote summary broadcast at day-vote tally time, one line per
/// voter in the order the votes were submitted.
pub(crate) fn vote_summary(votes: &[(PlayerId, PlayerId)]) -> String {
    let mut summary = String::from("Voting Results:\n");

    for (voter, target) in votes {
        summary.push_str(&format!("- {voter} voted for {target}\n"));
    }

    summary
}
