//! Constants for board bounds, search parameters and agent presets.
//!
//! Board dimensions are runtime values checked against [`MIN_SIZE`] and
//! [`MAX_SIZE`] by [`crate::config::GameConfig`]; everything else here is a
//! tuning knob for the decision engines.

// =============================================================================
// Board Geometry
// =============================================================================

/// Smallest accepted board width or height.
pub const MIN_SIZE: usize = 5;

/// Largest accepted board width or height.
pub const MAX_SIZE: usize = 10;

/// Default board width.
pub const DEFAULT_WIDTH: usize = 7;

/// Default board height.
pub const DEFAULT_HEIGHT: usize = 7;

/// Number of move applications after which a match is declared drawn.
pub const DEFAULT_MAX_PLIES: usize = 500;

/// Rollout length factor: playouts stop after `ROLLOUT_FACTOR * width * height`
/// plies and score as a draw.
pub const ROLLOUT_FACTOR: usize = 3;

// =============================================================================
// MCTS (Monte Carlo Tree Search) Parameters
// =============================================================================

/// Exploration constant of the upper-confidence selection score.
pub const EXPLORATION: f64 = std::f64::consts::SQRT_2;

/// Divisor applied to heuristic values before squashing them into [0, 1].
pub const HEURISTIC_SCALE: f64 = 50.0;

/// Simulations per move for the quick MCTS preset.
pub const MCTS_QUICK_SIMS: usize = 100;

/// Simulations per move for the stronger MCTS preset.
pub const MCTS_BETTER_SIMS: usize = 1000;

/// Simulations per move for the heuristic-guided MCTS preset.
pub const MCTS_HEURISTIC_SIMS: usize = 2000;

// =============================================================================
// Heuristic Weights
// =============================================================================

/// Weight of the win term in minimax presets. Dwarfs every other term.
pub const WIN_WEIGHT: f64 = 1e6;

/// Weight of the win term in the heuristic MCTS preset.
pub const MCTS_WIN_WEIGHT: f64 = 1e5;
