//! Position evaluation for the tree search.
//!
//! A playout plays random legal moves until the game ends. Fanorona endgames
//! can shuffle forever, so playouts stop after a length limit and count as a
//! draw. The heuristic variant skips the playout and squashes a static
//! evaluation into the same reward range.
//!
//! Rewards are always expressed from White's point of view in `[0, 1]`:
//! 1 is a White win, 0 a Black win, 0.5 a draw.

use fastrand::Rng;

use crate::board::Player;
use crate::constants::ROLLOUT_FACTOR;
use crate::heuristics::Heuristic;
use crate::minimax::choose_random_move;
use crate::state::State;

/// Default playout length limit for a board.
pub fn playout_limit(state: &State) -> usize {
    ROLLOUT_FACTOR * state.board().width() * state.board().height()
}

/// Play random moves from `state` until someone wins or `limit` moves have
/// been applied. Returns the winner, or `None` for a draw.
pub fn random_playout(state: &State, rng: &mut Rng, limit: usize) -> Option<Player> {
    let mut pos = state.clone();
    for _ in 0..limit {
        if let Some(winner) = pos.winner() {
            return Some(winner);
        }
        let mv = choose_random_move(&pos, rng);
        pos = pos.apply(&mv);
    }
    pos.winner()
}

/// White's reward for a finished (or abandoned) game.
#[inline]
pub fn outcome_reward(winner: Option<Player>) -> f64 {
    match winner {
        Some(Player::White) => 1.0,
        Some(Player::Black) => 0.0,
        None => 0.5,
    }
}

/// White's reward estimated from a static evaluation.
///
/// Decided positions score exactly; otherwise the evaluation is passed
/// through a logistic curve with `scale` evaluation units per e-fold.
pub fn heuristic_reward(state: &State, heuristic: &dyn Heuristic, scale: f64) -> f64 {
    if let Some(winner) = state.winner() {
        return outcome_reward(Some(winner));
    }
    let value = heuristic.evaluate(state, Player::White);
    1.0 / (1.0 + (-value / scale).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::heuristics::PieceCount;

    #[test]
    fn test_playout_finished_game() {
        let s = State::from_board(Board::from_rows(&["W.."]).unwrap(), Player::Black);
        let mut rng = Rng::with_seed(1);
        assert_eq!(random_playout(&s, &mut rng, 10), Some(Player::White));
    }

    #[test]
    fn test_playout_forced_win() {
        // White's only move captures Black's last piece.
        let s = State::from_board(Board::from_rows(&["W.B"]).unwrap(), Player::White);
        let mut rng = Rng::with_seed(1);
        assert_eq!(random_playout(&s, &mut rng, 10), Some(Player::White));
    }

    #[test]
    fn test_playout_limit_is_draw() {
        let s = State::new(7, 7);
        let mut rng = Rng::with_seed(1);
        assert_eq!(random_playout(&s, &mut rng, 0), None);
        assert_eq!(outcome_reward(None), 0.5);
    }

    #[test]
    fn test_playouts_terminate() {
        let s = State::new(5, 5);
        let mut rng = Rng::with_seed(42);
        let limit = playout_limit(&s);
        for _ in 0..20 {
            let r = outcome_reward(random_playout(&s, &mut rng, limit));
            assert!((0.0..=1.0).contains(&r));
        }
    }

    #[test]
    fn test_heuristic_reward_range() {
        let even = State::new(5, 5);
        assert!((heuristic_reward(&even, &PieceCount, 50.0) - 0.5).abs() < 1e-12);

        let ahead = State::from_board(Board::from_rows(&["WW...", "....B"]).unwrap(), Player::Black);
        let r = heuristic_reward(&ahead, &PieceCount, 1.0);
        assert!(r > 0.5 && r < 1.0);

        let won = State::from_board(Board::from_rows(&["W.."]).unwrap(), Player::Black);
        assert_eq!(heuristic_reward(&won, &PieceCount, 1.0), 1.0);
    }
}
