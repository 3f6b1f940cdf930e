//! Automated players and the player-mode presets.
//!
//! Every agent answers [`Agent::decide`] for the position it is given. Agents
//! that keep state across turns (the MCTS agents) must also be told about every
//! move actually played, by either side, through [`Agent::observe`].

use std::fmt;

use clap::ValueEnum;
use fastrand::Rng;
use tracing::{debug, warn};

use crate::constants::{
    MCTS_BETTER_SIMS, MCTS_HEURISTIC_SIMS, MCTS_QUICK_SIMS, MCTS_WIN_WEIGHT, WIN_WEIGHT,
};
use crate::heuristics::{
    Adjacency, ApproachEnemy, CenterControl, Groups, HeuristicSet, PieceCount, Win,
};
use crate::mcts::MonteCarloTree;
use crate::minimax::{choose_move, choose_move_pruned, choose_random_move};
use crate::moves::Move;
use crate::state::State;

/// Something that picks moves.
pub trait Agent {
    fn name(&self) -> &str;

    /// Choose a legal move for the side to move in `state`.
    fn decide(&mut self, state: &State) -> Move;

    /// Called after `mv` has been applied to the game, whoever played it.
    fn observe(&mut self, _mv: &Move) {}
}

/// Plays uniformly random legal moves.
pub struct RandomAgent {
    rng: Rng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Rng::with_seed(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "random"
    }

    fn decide(&mut self, state: &State) -> Move {
        choose_random_move(state, &mut self.rng)
    }
}

/// Fixed-depth minimax over a weighted heuristic.
pub struct MinimaxAgent {
    name: String,
    heuristic: HeuristicSet,
    depth: u32,
    prune: bool,
}

impl MinimaxAgent {
    pub fn new(name: impl Into<String>, heuristic: HeuristicSet, depth: u32) -> Self {
        Self {
            name: name.into(),
            heuristic,
            depth,
            prune: false,
        }
    }

    /// Search with alpha-beta pruning. The chosen move does not change.
    pub fn with_pruning(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    /// Search depth in move applications.
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

impl Agent for MinimaxAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&mut self, state: &State) -> Move {
        if self.prune {
            choose_move_pruned(state, &self.heuristic, self.depth)
        } else {
            choose_move(state, &self.heuristic, self.depth)
        }
    }
}

/// MCTS with a persistent tree and a fixed simulation budget per decision.
pub struct MctsAgent {
    name: String,
    tree: MonteCarloTree,
    budget: usize,
}

impl MctsAgent {
    pub fn new(name: impl Into<String>, tree: MonteCarloTree, budget: usize) -> Self {
        Self {
            name: name.into(),
            tree,
            budget,
        }
    }

    /// Simulations run per decision.
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// The persistent search tree.
    pub fn tree(&self) -> &MonteCarloTree {
        &self.tree
    }

    /// Run `budget` extra simulations from the current root.
    pub fn train_until(&mut self, budget: usize) {
        self.tree.train_until(budget);
    }
}

impl Agent for MctsAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&mut self, state: &State) -> Move {
        if self.tree.root_state() != state {
            debug!(agent = %self.name, "tree out of sync with game, resetting");
            self.tree.reset(state.clone());
        }
        self.tree.train_until(self.budget);
        // No expanded child only happens with a zero budget.
        self.tree
            .best_move()
            .unwrap_or_else(|| state.available_moves().swap_remove(0))
    }

    fn observe(&mut self, mv: &Move) {
        if let Err(err) = self.tree.update_move(mv) {
            // Resynchronized on the next decide.
            warn!(agent = %self.name, %err, "could not advance search tree");
        }
    }
}

/// Who controls a side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum PlayerMode {
    Human,
    Random,
    MinimaxVeryEasy,
    MinimaxEasy,
    MinimaxDefensiveEasy,
    MinimaxDefensiveHard,
    MinimaxAggressiveEasy,
    MinimaxAggressiveHard,
    MctsQuick,
    MctsBetter,
    MctsHeuristics,
}

impl PlayerMode {
    pub const ALL: [PlayerMode; 11] = [
        PlayerMode::Human,
        PlayerMode::Random,
        PlayerMode::MinimaxVeryEasy,
        PlayerMode::MinimaxEasy,
        PlayerMode::MinimaxDefensiveEasy,
        PlayerMode::MinimaxDefensiveHard,
        PlayerMode::MinimaxAggressiveEasy,
        PlayerMode::MinimaxAggressiveHard,
        PlayerMode::MctsQuick,
        PlayerMode::MctsBetter,
        PlayerMode::MctsHeuristics,
    ];

    /// The name accepted on the command line.
    pub fn id(self) -> &'static str {
        match self {
            PlayerMode::Human => "human",
            PlayerMode::Random => "random",
            PlayerMode::MinimaxVeryEasy => "minimax-very-easy",
            PlayerMode::MinimaxEasy => "minimax-easy",
            PlayerMode::MinimaxDefensiveEasy => "minimax-defensive-easy",
            PlayerMode::MinimaxDefensiveHard => "minimax-defensive-hard",
            PlayerMode::MinimaxAggressiveEasy => "minimax-aggressive-easy",
            PlayerMode::MinimaxAggressiveHard => "minimax-aggressive-hard",
            PlayerMode::MctsQuick => "mcts-quick",
            PlayerMode::MctsBetter => "mcts-better",
            PlayerMode::MctsHeuristics => "mcts-heuristics",
        }
    }

    pub fn is_human(self) -> bool {
        self == PlayerMode::Human
    }

    pub fn is_mcts(self) -> bool {
        matches!(
            self,
            PlayerMode::MctsQuick | PlayerMode::MctsBetter | PlayerMode::MctsHeuristics
        )
    }

    /// Build the agent for this mode, rooted at `state`. `Human` has none.
    pub fn agent(self, state: &State, seed: u64) -> Option<Box<dyn Agent>> {
        let name = self.id();
        let agent: Box<dyn Agent> = match self {
            PlayerMode::Human => return None,
            PlayerMode::Random => Box::new(RandomAgent::new(seed)),
            PlayerMode::MctsQuick => Box::new(MctsAgent::new(
                name,
                MonteCarloTree::random(state.clone(), seed),
                MCTS_QUICK_SIMS,
            )),
            PlayerMode::MctsBetter => Box::new(MctsAgent::new(
                name,
                MonteCarloTree::random(state.clone(), seed),
                MCTS_BETTER_SIMS,
            )),
            PlayerMode::MctsHeuristics => {
                let heuristic = HeuristicSet::new()
                    .with(Win, MCTS_WIN_WEIGHT)
                    .with(PieceCount, 50.0)
                    .with(Groups, 10.0)
                    .with(CenterControl, 5.0);
                Box::new(MctsAgent::new(
                    name,
                    MonteCarloTree::heuristic(state.clone(), heuristic, seed),
                    MCTS_HEURISTIC_SIMS,
                ))
            }
            minimax => {
                let (heuristic, depth) = minimax_profile(minimax);
                Box::new(MinimaxAgent::new(name, heuristic, depth))
            }
        };
        Some(agent)
    }
}

/// Heuristic weights and depth of a minimax preset.
fn minimax_profile(mode: PlayerMode) -> (HeuristicSet, u32) {
    let base = HeuristicSet::new().with(Win, WIN_WEIGHT);
    match mode {
        PlayerMode::MinimaxVeryEasy => (base.with(ApproachEnemy, 1.0), 2),
        PlayerMode::MinimaxDefensiveEasy => (
            base.with(PieceCount, 10.0)
                .with(Groups, 2.0)
                .with(Adjacency, 1.0)
                .with(CenterControl, 1.0),
            2,
        ),
        PlayerMode::MinimaxDefensiveHard => (
            base.with(PieceCount, 10.0)
                .with(Groups, 1.0)
                .with(CenterControl, 1.0),
            4,
        ),
        PlayerMode::MinimaxAggressiveEasy => {
            (base.with(PieceCount, 10.0).with(ApproachEnemy, 2.0), 2)
        }
        PlayerMode::MinimaxAggressiveHard => {
            (base.with(PieceCount, 2.0).with(ApproachEnemy, 1.0), 4)
        }
        _ => (base.with(PieceCount, 1.0), 2),
    }
}

impl fmt::Display for PlayerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
