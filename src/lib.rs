//! Fanorona: a rule engine and automated players.
//!
//! This crate models the board game Fanorona, with its mandatory chained
//! approach and withdrawal captures, and provides move selection by
//! depth-limited minimax over weighted heuristics and by Monte Carlo Tree
//! Search.
//!
//! ## Modules
//!
//! - [`constants`] - Board bounds and engine parameters
//! - [`config`] - Validated game configuration
//! - [`board`] - Grid, squares, directions and the initial layout
//! - [`moves`] - Moves, captures and move notation
//! - [`state`] - Rule engine (legal moves, chains, winner)
//! - [`heuristics`] - Position evaluators and their weighted combination
//! - [`minimax`] - Depth-limited minimax and random move selection
//! - [`playout`] - Random game simulation for position evaluation
//! - [`mcts`] - Monte Carlo Tree Search with subtree reuse
//! - [`agent`] - Automated players and player-mode presets
//! - [`game`] - Match runner
//! - [`protocol`] - Line-oriented text protocol
//!
//! ## Example
//!
//! ```
//! use fanorona::mcts::MonteCarloTree;
//! use fanorona::state::State;
//!
//! // Create a new game
//! let state = State::new(9, 5);
//!
//! // Run MCTS to find a move and play it
//! let mut tree = MonteCarloTree::random(state.clone(), 7);
//! tree.train_until(100);
//! let best = tree.best_move().unwrap();
//! let next = state.execute_move(&best).unwrap();
//! tree.update_move(&best).unwrap();
//! assert_eq!(tree.root_state(), &next);
//! ```

pub mod agent;
pub mod board;
pub mod config;
pub mod constants;
pub mod game;
pub mod heuristics;
pub mod mcts;
pub mod minimax;
pub mod moves;
pub mod playout;
pub mod protocol;
pub mod state;
