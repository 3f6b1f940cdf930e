//! Depth-limited minimax search and the uniform random move selector.
//!
//! Depth counts move applications. A capture chain lets one side move several
//! times in a row, so the maximizing or minimizing role at each node is read
//! from the node's side to move, not from ply parity. Leaves are scored for the
//! root's side to move.

use fastrand::Rng;
use tracing::trace;

use crate::board::Player;
use crate::heuristics::Heuristic;
use crate::moves::Move;
use crate::state::State;

/// Pick the best move for the side to move by plain minimax.
///
/// Ties go to the first move in [`State::available_moves`] order, so the
/// result is deterministic. A `depth` of 0 searches one ply.
pub fn choose_move(state: &State, heuristic: &dyn Heuristic, depth: u32) -> Move {
    search_root(state, heuristic, depth, false)
}

/// Same result as [`choose_move`], with alpha-beta pruning.
pub fn choose_move_pruned(state: &State, heuristic: &dyn Heuristic, depth: u32) -> Move {
    search_root(state, heuristic, depth, true)
}

fn search_root(state: &State, heuristic: &dyn Heuristic, depth: u32, prune: bool) -> Move {
    let moves = state.available_moves();
    assert!(!moves.is_empty(), "minimax called on a state with no legal moves");

    let root = state.to_move();
    let depth = depth.max(1);
    let mut best_idx = 0;
    let mut best_score = f64::NEG_INFINITY;

    for (i, mv) in moves.iter().enumerate() {
        let child = state.apply(mv);
        let score = if prune {
            alpha_beta(&child, heuristic, depth - 1, root, best_score, f64::INFINITY)
        } else {
            minimax(&child, heuristic, depth - 1, root)
        };
        trace!(%mv, score, "minimax root move");
        if score > best_score {
            best_score = score;
            best_idx = i;
        }
    }

    moves[best_idx].clone()
}

fn minimax(state: &State, heuristic: &dyn Heuristic, depth: u32, root: Player) -> f64 {
    if depth == 0 || state.is_terminal() {
        return heuristic.evaluate(state, root);
    }

    let scores = state
        .available_moves()
        .into_iter()
        .map(|mv| minimax(&state.apply(&mv), heuristic, depth - 1, root));

    if state.to_move() == root {
        scores.fold(f64::NEG_INFINITY, f64::max)
    } else {
        scores.fold(f64::INFINITY, f64::min)
    }
}

fn alpha_beta(
    state: &State,
    heuristic: &dyn Heuristic,
    depth: u32,
    root: Player,
    mut alpha: f64,
    mut beta: f64,
) -> f64 {
    if depth == 0 || state.is_terminal() {
        return heuristic.evaluate(state, root);
    }

    let maximizing = state.to_move() == root;
    let mut best = if maximizing {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    };

    for mv in state.available_moves() {
        let score = alpha_beta(&state.apply(&mv), heuristic, depth - 1, root, alpha, beta);
        if maximizing {
            best = best.max(score);
            alpha = alpha.max(best);
        } else {
            best = best.min(score);
            beta = beta.min(best);
        }
        if alpha >= beta {
            break;
        }
    }
    best
}

/// A move drawn uniformly from [`State::available_moves`].
pub fn choose_random_move(state: &State, rng: &mut Rng) -> Move {
    let mut moves = state.available_moves();
    assert!(!moves.is_empty(), "random move requested on a state with no legal moves");
    let i = rng.usize(..moves.len());
    moves.swap_remove(i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Square};
    use crate::heuristics::{ApproachEnemy, HeuristicSet, PieceCount, Win};

    fn state(rows: &[&str], to_move: Player) -> State {
        State::from_board(Board::from_rows(rows).unwrap(), to_move)
    }

    fn material() -> HeuristicSet {
        HeuristicSet::new().with(Win, 1e6).with(PieceCount, 1.0)
    }

    #[test]
    fn test_takes_the_bigger_capture() {
        // Approaching east takes three pieces, approaching west takes one.
        let s = state(&["B.W.BBB", "......."], Player::White);
        let mv = choose_move(&s, &material(), 1);
        assert_eq!(mv.capture_count(), 3);
    }

    #[test]
    fn test_avoids_recapture() {
        // Every move is quiet; stepping east to b1 walks into an approach.
        let s = state(&["W....", ".....", "...B."], Player::White);
        let mv = choose_move(&s, &material(), 2);
        let to = mv.as_motion().unwrap().to;
        assert_eq!(to, Square::new(1, 1));
        let reply = s.execute_move(&mv).unwrap();
        assert!(
            reply.available_moves().iter().all(|m| !m.is_capture()),
            "{mv} lets Black capture (landed on {to})"
        );
    }

    #[test]
    fn test_is_deterministic() {
        let s = State::new(5, 5);
        let h = HeuristicSet::new()
            .with(Win, 1e6)
            .with(PieceCount, 10.0)
            .with(ApproachEnemy, 1.0);
        let first = choose_move(&s, &h, 2);
        for _ in 0..3 {
            assert_eq!(choose_move(&s, &h, 2), first);
        }
    }

    #[test]
    fn test_pruning_agrees_with_plain_search() {
        let h = material();
        let mut s = State::new(5, 5);
        let mut rng = Rng::with_seed(3);
        for _ in 0..6 {
            if s.is_terminal() {
                break;
            }
            for depth in 1..=3 {
                assert_eq!(choose_move(&s, &h, depth), choose_move_pruned(&s, &h, depth));
            }
            let mv = choose_random_move(&s, &mut rng);
            s = s.execute_move(&mv).unwrap();
        }
    }

    #[test]
    fn test_depth_zero_still_moves() {
        let s = state(&["W.B"], Player::White);
        let mv = choose_move(&s, &material(), 0);
        assert_eq!(mv.as_motion().unwrap().to, Square::new(0, 1));
    }

    #[test]
    fn test_random_move_is_legal() {
        let mut rng = Rng::with_seed(11);
        let s = State::new(7, 7);
        let legal = s.available_moves();
        for _ in 0..50 {
            assert!(legal.contains(&choose_random_move(&s, &mut rng)));
        }
    }
}
