//! Monte Carlo Tree Search over an arena of nodes.
//!
//! Each training iteration runs four phases:
//! - selection: descend through fully expanded nodes by an upper-confidence score
//! - expansion: add one child for a random untried move
//! - simulation: a random playout, or a squashed heuristic evaluation
//! - backpropagation: update visits and scores up to the root
//!
//! Nodes live in a `Vec` and refer to each other by index. The root is always
//! index 0. [`MonteCarloTree::update_move`] keeps the subtree under the played
//! move and rebuilds the arena from it, which drops the rest of the tree.

use std::collections::VecDeque;

use fastrand::Rng;
use tracing::debug;

use crate::board::Player;
use crate::constants::{EXPLORATION, HEURISTIC_SCALE};
use crate::heuristics::Heuristic;
use crate::moves::Move;
use crate::playout::{heuristic_reward, outcome_reward, playout_limit, random_playout};
use crate::state::{MoveError, State};

/// Index of a node in the arena.
pub type NodeId = usize;

const ROOT: NodeId = 0;

/// Visit statistics of a node, seen from the player who moved into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStats {
    pub visits: u32,
    /// Sum of rewards in `[0, 1]` per visit.
    pub score: f64,
}

impl NodeStats {
    /// Mean reward, or 0 for an unvisited node.
    pub fn mean(&self) -> f64 {
        if self.visits > 0 {
            self.score / self.visits as f64
        } else {
            0.0
        }
    }
}

/// How a newly expanded node is evaluated.
pub enum Rollout {
    /// Uniformly random playout; `None` uses the board-dependent default limit.
    Random { limit: Option<usize> },
    /// Static evaluation squashed into `[0, 1]` with the given scale.
    Heuristic {
        heuristic: Box<dyn Heuristic>,
        scale: f64,
    },
}

struct Node {
    state: State,
    /// Player whose move produced `state`.
    mover: Player,
    parent: Option<NodeId>,
    children: Vec<(Move, NodeId)>,
    untried: Vec<Move>,
    visits: u32,
    score: f64,
    winner: Option<Player>,
}

impl Node {
    fn new(state: State, mover: Player, parent: Option<NodeId>) -> Self {
        let winner = state.winner();
        let untried = if winner.is_some() {
            Vec::new()
        } else {
            state.available_moves()
        };
        Self {
            state,
            mover,
            parent,
            children: Vec::new(),
            untried,
            visits: 0,
            score: 0.0,
            winner,
        }
    }

    /// A root node. Its mover is nominal; root statistics are never used for
    /// selection.
    fn root(state: State) -> Self {
        let mover = state.to_move().opponent();
        Self::new(state, mover, None)
    }

    fn stats(&self) -> NodeStats {
        NodeStats {
            visits: self.visits,
            score: self.score,
        }
    }
}

/// A search tree owned by one agent.
pub struct MonteCarloTree {
    nodes: Vec<Node>,
    rollout: Rollout,
    exploration: f64,
    rng: Rng,
}

impl MonteCarloTree {
    /// A tree rooted at `state` with its own RNG seeded by `seed`.
    pub fn new(state: State, rollout: Rollout, seed: u64) -> Self {
        Self {
            nodes: vec![Node::root(state)],
            rollout,
            exploration: EXPLORATION,
            rng: Rng::with_seed(seed),
        }
    }

    /// A tree evaluating leaves with random playouts.
    pub fn random(state: State, seed: u64) -> Self {
        Self::new(state, Rollout::Random { limit: None }, seed)
    }

    /// A tree evaluating leaves with `heuristic` instead of playouts.
    pub fn heuristic(state: State, heuristic: impl Heuristic + 'static, seed: u64) -> Self {
        let rollout = Rollout::Heuristic {
            heuristic: Box::new(heuristic),
            scale: HEURISTIC_SCALE,
        };
        Self::new(state, rollout, seed)
    }

    /// Override the exploration constant.
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    /// State at the root.
    pub fn root_state(&self) -> &State {
        &self.nodes[ROOT].state
    }

    /// Visit statistics of the root.
    pub fn root_stats(&self) -> NodeStats {
        self.nodes[ROOT].stats()
    }

    /// Expanded root moves with their statistics, in expansion order.
    pub fn children(&self) -> Vec<(Move, NodeStats)> {
        self.nodes[ROOT]
            .children
            .iter()
            .map(|(mv, id)| (mv.clone(), self.nodes[*id].stats()))
            .collect()
    }

    /// Statistics of the root child reached by `mv`, if expanded.
    pub fn child_stats(&self, mv: &Move) -> Option<NodeStats> {
        self.child(mv).map(|id| self.nodes[id].stats())
    }

    /// Number of nodes under (and including) the root child reached by `mv`.
    pub fn subtree_size(&self, mv: &Move) -> Option<usize> {
        let start = self.child(mv)?;
        let mut count = 0;
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            count += 1;
            stack.extend(self.nodes[id].children.iter().map(|&(_, c)| c));
        }
        Some(count)
    }

    /// Total nodes held by the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn child(&self, mv: &Move) -> Option<NodeId> {
        self.nodes[ROOT]
            .children
            .iter()
            .find(|(m, _)| m == mv)
            .map(|&(_, id)| id)
    }

    /// Discard everything and start over from `state`.
    pub fn reset(&mut self, state: State) {
        self.nodes = vec![Node::root(state)];
    }

    /// Run exactly `budget` select/expand/simulate/backpropagate iterations.
    pub fn train_until(&mut self, budget: usize) {
        for _ in 0..budget {
            self.iterate();
        }
        debug!(
            budget,
            nodes = self.nodes.len(),
            root_visits = self.nodes[ROOT].visits,
            "mcts training done"
        );
    }

    fn iterate(&mut self) {
        let mut id = ROOT;
        loop {
            let node = &self.nodes[id];
            if node.winner.is_some() {
                break;
            }
            if !node.untried.is_empty() {
                id = self.expand(id);
                break;
            }
            match self.select_child(id) {
                Some(child) => id = child,
                None => break,
            }
        }
        let reward = self.simulate(id);
        self.backpropagate(id, reward);
    }

    /// Child maximizing `mean + c * sqrt(parent_visits / child_visits)`.
    /// Every child has been visited at least once.
    fn select_child(&self, id: NodeId) -> Option<NodeId> {
        let node = &self.nodes[id];
        let parent = node.visits.max(1) as f64;
        let mut best = None;
        let mut best_score = f64::NEG_INFINITY;
        for &(_, child) in &node.children {
            let c = &self.nodes[child];
            let visits = c.visits.max(1) as f64;
            let ucb = c.score / visits + self.exploration * (parent / visits).sqrt();
            if ucb > best_score {
                best_score = ucb;
                best = Some(child);
            }
        }
        best
    }

    fn expand(&mut self, id: NodeId) -> NodeId {
        let i = self.rng.usize(..self.nodes[id].untried.len());
        let mv = self.nodes[id].untried.swap_remove(i);
        let parent = &self.nodes[id].state;
        let child = Node::new(parent.apply(&mv), parent.to_move(), Some(id));
        let child_id = self.nodes.len();
        self.nodes.push(child);
        self.nodes[id].children.push((mv, child_id));
        child_id
    }

    /// White's reward for the node.
    fn simulate(&mut self, id: NodeId) -> f64 {
        let node = &self.nodes[id];
        if node.winner.is_some() {
            return outcome_reward(node.winner);
        }
        match &self.rollout {
            Rollout::Random { limit } => {
                let limit = limit.unwrap_or_else(|| playout_limit(&node.state));
                outcome_reward(random_playout(&node.state, &mut self.rng, limit))
            }
            Rollout::Heuristic { heuristic, scale } => {
                heuristic_reward(&node.state, heuristic.as_ref(), *scale)
            }
        }
    }

    fn backpropagate(&mut self, id: NodeId, reward: f64) {
        let mut cur = Some(id);
        while let Some(i) = cur {
            let node = &mut self.nodes[i];
            node.visits += 1;
            node.score += match node.mover {
                Player::White => reward,
                Player::Black => 1.0 - reward,
            };
            cur = node.parent;
        }
    }

    /// The most visited root move (first expanded on ties), if any.
    pub fn best_move(&self) -> Option<Move> {
        let mut best: Option<(&Move, u32)> = None;
        for (mv, id) in &self.nodes[ROOT].children {
            let visits = self.nodes[*id].visits;
            if best.is_none_or(|(_, v)| visits > v) {
                best = Some((mv, visits));
            }
        }
        best.map(|(mv, _)| mv.clone())
    }

    /// Advance the root past `mv`.
    ///
    /// An explored move keeps its subtree and statistics; an unexplored one
    /// starts a fresh tree. Fails if `mv` is illegal at the root.
    pub fn update_move(&mut self, mv: &Move) -> Result<(), MoveError> {
        match self.child(mv) {
            Some(child) => {
                self.reroot(child);
                debug!(%mv, nodes = self.nodes.len(), "mcts reused subtree");
            }
            None => {
                let next = self.nodes[ROOT].state.execute_move(mv)?;
                let mover = self.nodes[ROOT].state.to_move();
                self.nodes = vec![Node::new(next, mover, None)];
                debug!(%mv, "mcts started fresh tree");
            }
        }
        Ok(())
    }

    /// Rebuild the arena from the subtree at `new_root`, breadth first.
    fn reroot(&mut self, new_root: NodeId) {
        let mut old: Vec<Option<Node>> = std::mem::take(&mut self.nodes)
            .into_iter()
            .map(Some)
            .collect();
        let mut nodes = Vec::new();
        let mut queue = VecDeque::from([(new_root, None)]);
        let mut next_id = 1;

        while let Some((old_id, parent)) = queue.pop_front() {
            let Some(mut node) = old[old_id].take() else {
                continue;
            };
            let id = nodes.len();
            node.parent = parent;
            for (_, child) in &mut node.children {
                queue.push_back((*child, Some(id)));
                *child = next_id;
                next_id += 1;
            }
            nodes.push(node);
        }
        self.nodes = nodes;
    }
}
