//! Core state for a single game of Secret Mafia.
//!
//! Mutations happen only through the role handlers and the phase controller;
//! this module enforces just the structural rules: `alive` can only shrink
//! and the terminal flag is sticky.

use std::collections::BTreeMap;
use std::collections::VecDeque;

use bit_set::BitSet;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use secret_mafia_lib::GameId;
use secret_mafia_lib::GameOutcome;
use secret_mafia_lib::Phase;
use secret_mafia_lib::PlayerId;
use secret_mafia_lib::Role;
use secret_mafia_lib::Team;

/// A set of player ids, backed by a bit set.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PlayerSet(BitSet);

impl PlayerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, player: PlayerId) -> bool {
        self.0.insert(player.0)
    }

    pub fn remove(&mut self, player: PlayerId) -> bool {
        self.0.remove(player.0)
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.0.contains(player.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Removes every player of `other` from `self`.
    pub fn difference_with(&mut self, other: &PlayerSet) {
        self.0.difference_with(&other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.0.iter().map(PlayerId)
    }
}

impl FromIterator<PlayerId> for PlayerSet {
    fn from_iter<T: IntoIterator<Item = PlayerId>>(iter: T) -> Self {
        let mut set = PlayerSet::new();
        for player in iter {
            set.insert(player);
        }
        set
    }
}

impl<'a> IntoIterator for &'a PlayerSet {
    type Item = PlayerId;
    type IntoIter = std::iter::Map<bit_set::Iter<'a, u32>, fn(usize) -> PlayerId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().map(PlayerId as fn(usize) -> PlayerId)
    }
}

/// State for an active game. One instance per game; never reused.
pub(crate) struct GameState {
    pub(crate) game_id: GameId,
    pub(crate) num_players: usize,
    /// Role per player, assigned once at reset.
    pub(crate) roles: Vec<Role>,
    /// Monotonically shrinking set of living players.
    pub(crate) alive: PlayerSet,
    pub(crate) phase: Phase,
    /// Counts full night/day cycles, starting at 1.
    pub(crate) day_number: usize,
    /// Votes cast in the current voting sub-phase, in submission order. The
    /// vote summary broadcast replays this order, so it must not be
    /// re-sorted.
    pub(crate) votes: Vec<(PlayerId, PlayerId)>,
    /// Target -> suggestion count, scoped to one night's Mafia discussion.
    pub(crate) kill_suggestions: BTreeMap<PlayerId, u32>,
    /// The Mafia's provisional victim; may be cleared by the Doctor.
    pub(crate) pending_elimination: Option<PlayerId>,
    /// Target recorded by the Detective this night; consumed on phase exit.
    pub(crate) pending_investigation: Option<PlayerId>,
    /// Everyone the Detective has inspected, for rendering only.
    pub(crate) detective_inspected: Vec<PlayerId>,
    pub(crate) rng: StdRng,
    /// Players still to act within the current phase, front first.
    pub(crate) turn_queue: VecDeque<PlayerId>,
    /// Invalid submissions per player, for the error allowance.
    pub(crate) invalid_counts: Vec<u32>,
    terminal: bool,
    outcome: Option<GameOutcome>,
}

impl GameState {
    pub(crate) fn new(num_players: usize, num_mafia: usize, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut roles = Vec::with_capacity(num_players);
        roles.resize(num_mafia, Role::Mafia);
        roles.push(Role::Doctor);
        roles.push(Role::Detective);
        roles.resize(num_players, Role::Villager);
        roles.shuffle(&mut rng);

        GameState {
            game_id: GameId::new(),
            num_players,
            roles,
            alive: (0..num_players).map(PlayerId).collect(),
            phase: Phase::NightMafiaDiscussion,
            day_number: 1,
            votes: Vec::new(),
            kill_suggestions: BTreeMap::new(),
            pending_elimination: None,
            pending_investigation: None,
            detective_inspected: Vec::new(),
            rng,
            turn_queue: VecDeque::new(),
            invalid_counts: vec![0; num_players],
            terminal: false,
            outcome: None,
        }
    }

    pub(crate) fn role(&self, player: PlayerId) -> Role {
        self.roles[player.0]
    }

    pub(crate) fn is_alive(&self, player: PlayerId) -> bool {
        self.alive.contains(player)
    }

    /// Whether `player` refers to an actual seat in this game.
    pub(crate) fn in_range(&self, player: PlayerId) -> bool {
        player.0 < self.num_players
    }

    /// Every player matching `pred` over `(role, alive)`.
    pub(crate) fn players_where<F>(&self, mut pred: F) -> PlayerSet
    where
        F: FnMut(Role, bool) -> bool,
    {
        (0..self.num_players)
            .map(PlayerId)
            .filter(|&player| pred(self.role(player), self.is_alive(player)))
            .collect()
    }

    pub(crate) fn alive_mafia(&self) -> PlayerSet {
        self.players_where(|role, alive| alive && role == Role::Mafia)
    }

    /// The single holder of `role`, alive or dead. Only meaningful for
    /// Doctor and Detective, which are assigned exactly once.
    pub(crate) fn role_holder(&self, role: Role) -> PlayerId {
        self.roles
            .iter()
            .position(|&assigned| assigned == role)
            .map(PlayerId)
            .expect("role pool always contains one Doctor and one Detective")
    }

    /// Removes `player` from the alive set.
    pub(crate) fn eliminate(&mut self, player: PlayerId) {
        self.alive.remove(player);
    }

    /// Records `voter`'s vote. A repeat vote updates the target in place,
    /// keeping the voter's original position in the submission order.
    pub(crate) fn record_vote(&mut self, voter: PlayerId, target: PlayerId) {
        match self.votes.iter_mut().find(|(existing, _)| *existing == voter) {
            Some(entry) => entry.1 = target,
            None => self.votes.push((voter, target)),
        }
    }

    /// `set`'s players in a fresh random order.
    pub(crate) fn shuffled(&mut self, set: &PlayerSet) -> Vec<PlayerId> {
        let mut order = set.iter().collect::<Vec<_>>();
        order.shuffle(&mut self.rng);
        order
    }

    pub(crate) fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub(crate) fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    /// Terminal transition. Sticky: the first outcome wins, later calls are
    /// ignored. Clears the turn queue so no further turns are dispatched.
    pub(crate) fn set_winners(&mut self, winning_team: Team, reason: &str) {
        if self.terminal {
            return;
        }

        let winners = (0..self.num_players)
            .map(PlayerId)
            .filter(|&player| self.role(player).team() == winning_team)
            .collect::<Vec<_>>();

        tracing::info!(?winning_team, reason, "game over");

        self.outcome = Some(GameOutcome {
            winning_team,
            winners,
            reason: Box::from(reason),
        });
        self.terminal = true;
        self.turn_queue.clear();
    }

    /// Finalizes a game abandoned before either side won. Sticky like
    /// [`Self::set_winners`], but records no outcome.
    pub(crate) fn abort(&mut self) {
        if self.terminal {
            return;
        }

        tracing::info!("game closed before completion");

        self.terminal = true;
        self.turn_queue.clear();
    }

    /// Win evaluation, run only at the end-of-night and end-of-day
    /// finalization points.
    ///
    /// Village wins once no Mafia breathes; Mafia wins once it holds half
    /// the town (parity ties favor the Mafia). The two conditions are
    /// mutually exclusive.
    pub(crate) fn evaluate_win(&mut self) {
        let num_mafia_alive = self.alive_mafia().len();

        if num_mafia_alive == 0 {
            self.set_winners(Team::Village, "Villagers eliminate all Mafia.");
            return;
        }

        if num_mafia_alive * 2 >= self.alive.len() {
            self.set_winners(Team::Mafia, "Mafia outnumber the villagers.");
        }
    }
}

/// Counts votes per target.
pub(crate) fn tally_votes(votes: &[(PlayerId, PlayerId)]) -> BTreeMap<PlayerId, u32> {
    let mut counts = BTreeMap::new();

    for &(_, target) in votes {
        *counts.entry(target).or_insert(0) += 1;
    }

    counts
}

/// The unique maximum of a tally, if there is one. Any tie (or an empty
/// tally) yields `None`.
pub(crate) fn strict_plurality(counts: &BTreeMap<PlayerId, u32>) -> Option<PlayerId> {
    let max = counts.values().copied().max()?;
    let mut top = counts
        .iter()
        .filter(|&(_, &count)| count == max)
        .map(|(&player, _)| player);

    let leader = top.next()?;

    if top.next().is_some() { None } else { Some(leader) }
}
