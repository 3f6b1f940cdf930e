//! Static evaluation of positions.
//!
//! Each evaluator scores a state from one player's point of view; higher is
//! better for that player. [`HeuristicSet`] combines evaluators linearly. The
//! agent presets give [`Win`] a weight several orders of magnitude above the
//! positional terms so a decided game always dominates the sum.

use crate::board::{Player, Square};
use crate::state::State;

/// A pure scoring function over positions.
pub trait Heuristic {
    fn evaluate(&self, state: &State, player: Player) -> f64;
}

impl<F> Heuristic for F
where
    F: Fn(&State, Player) -> f64,
{
    fn evaluate(&self, state: &State, player: Player) -> f64 {
        self(state, player)
    }
}

/// +1 for a won game, -1 for a lost one, 0 while undecided.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win;

impl Heuristic for Win {
    fn evaluate(&self, state: &State, player: Player) -> f64 {
        match state.winner() {
            Some(w) if w == player => 1.0,
            Some(_) => -1.0,
            None => 0.0,
        }
    }
}

/// Material balance.
#[derive(Debug, Clone, Copy, Default)]
pub struct PieceCount;

impl Heuristic for PieceCount {
    fn evaluate(&self, state: &State, player: Player) -> f64 {
        state.piece_count(player) as f64 - state.piece_count(player.opponent()) as f64
    }
}

/// Pairs of friendly pieces on neighbouring points, minus the opponent's.
#[derive(Debug, Clone, Copy, Default)]
pub struct Adjacency;

fn adjacent_pairs(state: &State, player: Player) -> usize {
    let board = state.board();
    let links: usize = board
        .pieces(player)
        .map(|sq| {
            board
                .neighbors(sq)
                .filter(|&n| board.get(n).owner() == Some(player))
                .count()
        })
        .sum();
    links / 2
}

impl Heuristic for Adjacency {
    fn evaluate(&self, state: &State, player: Player) -> f64 {
        adjacent_pairs(state, player) as f64 - adjacent_pairs(state, player.opponent()) as f64
    }
}

/// Fewer, larger formations are harder to pick apart: scores the opponent's
/// group count minus our own.
#[derive(Debug, Clone, Copy, Default)]
pub struct Groups;

/// Number of connected groups of `player`'s pieces.
pub fn count_groups(state: &State, player: Player) -> usize {
    let board = state.board();
    let mut seen = vec![false; board.width() * board.height()];
    let idx = |sq: Square| sq.row * board.width() + sq.col;
    let mut groups = 0;

    for start in board.pieces(player) {
        if seen[idx(start)] {
            continue;
        }
        groups += 1;
        seen[idx(start)] = true;
        let mut stack = vec![start];
        while let Some(sq) = stack.pop() {
            for n in board.neighbors(sq) {
                if !seen[idx(n)] && board.get(n).owner() == Some(player) {
                    seen[idx(n)] = true;
                    stack.push(n);
                }
            }
        }
    }
    groups
}

impl Heuristic for Groups {
    fn evaluate(&self, state: &State, player: Player) -> f64 {
        count_groups(state, player.opponent()) as f64 - count_groups(state, player) as f64
    }
}

/// Rewards pieces close to the centre of the board.
#[derive(Debug, Clone, Copy, Default)]
pub struct CenterControl;

fn centrality(state: &State, player: Player) -> f64 {
    let board = state.board();
    let cr = (board.height() as f64 - 1.0) / 2.0;
    let cc = (board.width() as f64 - 1.0) / 2.0;
    let max_dist = cr.max(cc);
    board
        .pieces(player)
        .map(|sq| {
            let dist = (sq.row as f64 - cr).abs().max((sq.col as f64 - cc).abs());
            max_dist - dist
        })
        .sum()
}

impl Heuristic for CenterControl {
    fn evaluate(&self, state: &State, player: Player) -> f64 {
        centrality(state, player) - centrality(state, player.opponent())
    }
}

/// Pulls pieces towards the enemy: minus the mean distance from each of our
/// pieces to its nearest opponent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproachEnemy;

impl Heuristic for ApproachEnemy {
    fn evaluate(&self, state: &State, player: Player) -> f64 {
        let board = state.board();
        let enemies: Vec<Square> = board.pieces(player.opponent()).collect();
        if enemies.is_empty() {
            return 0.0;
        }
        let (total, count) = board
            .pieces(player)
            .map(|sq| enemies.iter().map(|&e| sq.distance(e)).min().unwrap_or(0))
            .fold((0usize, 0usize), |(t, c), d| (t + d, c + 1));
        if count == 0 {
            return 0.0;
        }
        -(total as f64 / count as f64)
    }
}

/// Weighted sum of evaluators.
#[derive(Default)]
pub struct HeuristicSet {
    terms: Vec<(Box<dyn Heuristic>, f64)>,
}

impl HeuristicSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a term, builder style.
    pub fn with(mut self, heuristic: impl Heuristic + 'static, weight: f64) -> Self {
        self.push(heuristic, weight);
        self
    }

    pub fn push(&mut self, heuristic: impl Heuristic + 'static, weight: f64) {
        self.terms.push((Box::new(heuristic), weight));
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl Heuristic for HeuristicSet {
    fn evaluate(&self, state: &State, player: Player) -> f64 {
        self.terms
            .iter()
            .map(|(h, w)| w * h.evaluate(state, player))
            .sum()
    }
}
