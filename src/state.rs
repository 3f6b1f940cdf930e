//! Fanorona rule engine: legal-move enumeration, move application and
//! terminal detection.
//!
//! A [`State`] is an immutable snapshot. Applying a move returns a new state,
//! so search trees can hold many states at once without aliasing.
//!
//! Captures are mandatory. A capturing piece keeps moving while it has a
//! further capture. Each step must change direction and may not return to a
//! square the piece already visited this turn. The in-progress chain lives in
//! [`State::chain`]; the side to move only changes once the chain is over.
//! A chain always continues while a capture is available; there is no move
//! that ends it early.

use thiserror::Error;

use crate::board::{Board, Cell, Direction, Player, Square};
use crate::config::GameConfig;
use crate::moves::{CaptureKind, Motion, Move};

/// Rejected move application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("illegal move: {mv}")]
    Illegal { mv: Move },
}

/// An in-progress capture chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Chain {
    /// Where the capturing piece currently stands.
    pub square: Square,
    /// Direction of the last step; the next step must differ.
    pub direction: Direction,
    /// Squares the piece has occupied during this chain, origin included.
    pub visited: Vec<Square>,
}

/// A game position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct State {
    board: Board,
    to_move: Player,
    chain: Option<Chain>,
}

impl State {
    /// The starting position on a `width x height` board, White to move.
    pub fn new(width: usize, height: usize) -> Self {
        Self::from_board(Board::initial(width, height), Player::White)
    }

    /// The starting position described by `config`.
    pub fn from_config(config: &GameConfig) -> Self {
        let board = Board::initial(config.width, config.height).with_diagonals(config.diagonals);
        Self::from_board(board, Player::White)
    }

    /// An arbitrary position with no chain in progress.
    pub fn from_board(board: Board, to_move: Player) -> Self {
        Self {
            board,
            to_move,
            chain: None,
        }
    }

    /// The grid, read-only.
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The side to move. Unchanged during a capture chain.
    #[inline]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    /// The capture chain in progress, if any.
    #[inline]
    pub fn chain(&self) -> Option<&Chain> {
        self.chain.as_ref()
    }

    /// Pieces `player` has on the board.
    #[inline]
    pub fn piece_count(&self, player: Player) -> usize {
        self.board.count(player.into())
    }

    /// Every legal move for the side to move.
    ///
    /// Capturing motions exclude quiet ones; `Pass` appears only when the side
    /// to move has no motion at all.
    pub fn available_moves(&self) -> Vec<Move> {
        let mut captures = Vec::new();
        let mut quiet = Vec::new();

        match &self.chain {
            Some(chain) => self.motions_from(chain.square, &mut captures, &mut quiet),
            None => {
                for sq in self.board.pieces(self.to_move) {
                    self.motions_from(sq, &mut captures, &mut quiet);
                }
            }
        }

        if !captures.is_empty() {
            captures
        } else if self.chain.is_none() && !quiet.is_empty() {
            quiet
        } else {
            vec![Move::Pass]
        }
    }

    /// Legal motions from `from` to `to`. More than one means the user must
    /// choose between an approach and a withdrawal.
    pub fn moves_between(&self, from: Square, to: Square) -> Vec<Move> {
        self.available_moves()
            .into_iter()
            .filter(|mv| matches!(mv, Move::Motion(m) if m.from == from && m.to == to))
            .collect()
    }

    /// Generate every motion of the piece on `from`, sorting captures from
    /// quiet steps. Chain restrictions apply when a chain is in progress.
    fn motions_from(&self, from: Square, captures: &mut Vec<Move>, quiet: &mut Vec<Move>) {
        let opponent = self.to_move.opponent();

        let chain = self.chain.as_ref();

        for dir in Direction::ALL {
            if chain.is_some_and(|c| c.direction == dir) {
                continue;
            }
            let Some(to) = self.board.step(from, dir) else {
                continue;
            };
            if self.board.get(to) != Cell::Empty {
                continue;
            }
            if chain.is_some_and(|c| c.visited.contains(&to)) {
                continue;
            }

            let approach = self.board.run(to, dir, opponent);
            let withdrawal = self.board.run(from, dir.opposite(), opponent);

            if approach.is_empty() && withdrawal.is_empty() {
                quiet.push(Motion::quiet(from, to).into());
                continue;
            }
            if !approach.is_empty() {
                captures.push(Motion::capturing(from, to, CaptureKind::Approach, approach).into());
            }
            if !withdrawal.is_empty() {
                captures
                    .push(Motion::capturing(from, to, CaptureKind::Withdrawal, withdrawal).into());
            }
        }
    }

    /// Apply `mv`, failing if it is not in [`State::available_moves`].
    pub fn execute_move(&self, mv: &Move) -> Result<State, MoveError> {
        if !self.available_moves().contains(mv) {
            return Err(MoveError::Illegal { mv: mv.clone() });
        }
        Ok(self.apply(mv))
    }

    /// Apply a move already known to be legal.
    pub(crate) fn apply(&self, mv: &Move) -> State {
        let me = self.to_move;
        let m = match mv {
            Move::Pass => {
                return State {
                    board: self.board.clone(),
                    to_move: me.opponent(),
                    chain: None,
                };
            }
            Move::Motion(m) => m,
        };

        let mut board = self.board.clone();
        board.set(m.from, Cell::Empty);
        board.set(m.to, me.into());
        for &sq in m.captured() {
            board.set(sq, Cell::Empty);
        }

        if !m.is_capture() {
            return State {
                board,
                to_move: me.opponent(),
                chain: None,
            };
        }

        let mut visited = match &self.chain {
            Some(chain) => chain.visited.clone(),
            None => vec![m.from],
        };
        visited.push(m.to);

        let Some(direction) = m.direction() else {
            // Legal motions always join neighbours.
            return State {
                board,
                to_move: me.opponent(),
                chain: None,
            };
        };
        let next = State {
            board,
            to_move: me,
            chain: Some(Chain {
                square: m.to,
                direction,
                visited,
            }),
        };
        if next.has_continuation() {
            next
        } else {
            State {
                to_move: me.opponent(),
                chain: None,
                ..next
            }
        }
    }

    /// Whether the chain piece has a further capture.
    fn has_continuation(&self) -> bool {
        let Some(chain) = &self.chain else {
            return false;
        };
        let mut captures = Vec::new();
        let mut quiet = Vec::new();
        self.motions_from(chain.square, &mut captures, &mut quiet);
        !captures.is_empty()
    }

    /// Whether the side to move can make any motion.
    fn has_motion(&self) -> bool {
        if self.chain.is_some() {
            return true;
        }
        self.board.pieces(self.to_move).any(|sq| {
            self.board
                .neighbors(sq)
                .any(|n| self.board.get(n) == Cell::Empty)
        })
    }

    /// The winner, if the game is over.
    ///
    /// A side with no pieces loses, and so does a side to move that cannot
    /// make any motion.
    pub fn winner(&self) -> Option<Player> {
        if self.piece_count(Player::White) == 0 {
            return Some(Player::Black);
        }
        if self.piece_count(Player::Black) == 0 {
            return Some(Player::White);
        }
        if !self.has_motion() {
            return Some(self.to_move.opponent());
        }
        None
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.winner().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(rows: &[&str], to_move: Player) -> State {
        State::from_board(Board::from_rows(rows).unwrap(), to_move)
    }

    fn motion(from: &str, to: &str, kind: Option<CaptureKind>, legal: &[Move]) -> Move {
        let from: Square = from.parse().unwrap();
        let to: Square = to.parse().unwrap();
        legal
            .iter()
            .find(|mv| matches!(mv, Move::Motion(m) if m.from == from && m.to == to && m.kind() == kind))
            .cloned()
            .unwrap_or_else(|| panic!("no motion {from}-{to} {kind:?} in {legal:?}"))
    }

    #[test]
    fn test_approach_capture() {
        let s = state(&["W.B"], Player::White);
        let moves = s.available_moves();
        assert_eq!(moves.len(), 1);
        let next = s.execute_move(&moves[0]).unwrap();
        assert_eq!(next.board(), &Board::from_rows(&[".W."]).unwrap());
        assert_eq!(next.winner(), Some(Player::White));
    }

    #[test]
    fn test_withdrawal_capture() {
        let s = state(&["BW."], Player::White);
        let moves = s.available_moves();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].as_motion().unwrap().kind(), Some(CaptureKind::Withdrawal));
        let next = s.execute_move(&moves[0]).unwrap();
        assert_eq!(next.board(), &Board::from_rows(&["..W"]).unwrap());
    }

    #[test]
    fn test_capture_is_mandatory() {
        let s = state(&["W.B", "..."], Player::White);
        let moves = s.available_moves();
        assert!(moves.iter().all(Move::is_capture));
        assert_eq!(moves.len(), 1);
    }

    #[test]
    fn test_quiet_moves_without_captures() {
        let s = state(&["W..", "...", ".B."], Player::White);
        let moves = s.available_moves();
        assert_eq!(moves.len(), 3);
        assert!(moves.iter().all(|mv| !mv.is_capture() && !mv.is_pass()));
    }

    #[test]
    fn test_approach_and_withdrawal_at_same_destination() {
        let s = state(&["BW.B", "...."], Player::White);
        let both = s.moves_between("b1".parse().unwrap(), "c1".parse().unwrap());
        assert_eq!(both.len(), 2);
        let firsts: Vec<_> = both
            .iter()
            .map(|mv| mv.as_motion().unwrap().first_captured().unwrap().to_string())
            .collect();
        assert_eq!(firsts, vec!["d1", "a1"]);
    }

    #[test]
    fn test_capture_removes_whole_line() {
        let s = state(&["W.BBB.B"], Player::White);
        let mv = motion("a1", "b1", Some(CaptureKind::Approach), &s.available_moves());
        assert_eq!(mv.capture_count(), 3);
        let next = s.execute_move(&mv).unwrap();
        assert_eq!(next.board(), &Board::from_rows(&[".W....B"]).unwrap());
    }

    #[test]
    fn test_chain_keeps_side_to_move() {
        let s = state(&["...B.", ".....", "..W.B", ".....", ".B..."], Player::White);
        let first = motion("c3", "d3", Some(CaptureKind::Approach), &s.available_moves());
        let next = s.execute_move(&first).unwrap();

        assert_eq!(next.to_move(), Player::White);
        let chain = next.chain().unwrap();
        assert_eq!(chain.square, "d3".parse().unwrap());
        assert_eq!(chain.direction, Direction::East);

        let moves = next.available_moves();
        assert!(moves.iter().all(Move::is_capture));
        assert!(moves.iter().all(|mv| mv.as_motion().unwrap().from == chain.square));
        assert!(moves.iter().all(|mv| mv.as_motion().unwrap().direction() != Some(Direction::East)));
        motion("d3", "d2", Some(CaptureKind::Approach), &moves);
        motion("d3", "c4", Some(CaptureKind::Approach), &moves);

        // Finishing the chain hands the turn over.
        let second = motion("d3", "d2", Some(CaptureKind::Approach), &moves);
        let after = next.execute_move(&second).unwrap();
        assert_eq!(after.to_move(), Player::Black);
        assert!(after.chain().is_none());
    }

    #[test]
    fn test_chain_cannot_repeat_direction() {
        // The only follow-up capture would continue east.
        let s = state(&["BW..B"], Player::White);
        let moves = s.available_moves();
        assert_eq!(moves.len(), 1);
        let next = s.execute_move(&moves[0]).unwrap();
        assert_eq!(next.to_move(), Player::Black);
        assert!(next.chain().is_none());
    }

    #[test]
    fn test_chain_cannot_revisit_square() {
        // Stepping back to b1 would approach-capture a1.
        let s = state(&["BW.B."], Player::White);
        let mv = motion("b1", "c1", Some(CaptureKind::Approach), &s.available_moves());
        let next = s.execute_move(&mv).unwrap();
        assert_eq!(next.to_move(), Player::Black);
        assert_eq!(next.board(), &Board::from_rows(&["B.W.."]).unwrap());
    }

    #[test]
    fn test_illegal_move_is_rejected() {
        let s = state(&["W.B", "..."], Player::White);
        let quiet: Move = Motion::quiet("a1".parse().unwrap(), "a2".parse().unwrap()).into();
        assert_eq!(
            s.execute_move(&quiet),
            Err(MoveError::Illegal { mv: quiet.clone() })
        );
        assert!(s.execute_move(&Move::Pass).is_err());
    }

    #[test]
    fn test_pass_only_when_immobilized() {
        let s = state(&["WB", "BB"], Player::White);
        assert_eq!(s.available_moves(), vec![Move::Pass]);
        assert_eq!(s.winner(), Some(Player::Black));
        let next = s.execute_move(&Move::Pass).unwrap();
        assert_eq!(next.to_move(), Player::Black);
        assert_eq!(next.board(), s.board());
    }

    #[test]
    fn test_winner_on_empty_side() {
        assert_eq!(state(&["W.."], Player::Black).winner(), Some(Player::White));
        assert_eq!(state(&["..B"], Player::White).winner(), Some(Player::Black));
        assert_eq!(state(&["W...B"], Player::White).winner(), None);
    }

    #[test]
    fn test_strong_points_restrict_diagonal_captures() {
        // a2 is a weak point; its only capture is the diagonal approach to b3.
        let board = Board::from_rows(&[".....", "W....", ".....", "..B..", "....."]).unwrap();
        let full = State::from_board(board.clone(), Player::White);
        let moves = full.available_moves();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to_string(), "a2-b3/A");

        let restricted = State::from_board(
            board.with_diagonals(crate::board::Diagonals::StrongPoints),
            Player::White,
        );
        let moves = restricted.available_moves();
        assert_eq!(moves.len(), 3);
        assert!(moves.iter().all(|mv| !mv.is_capture()));
    }

    #[test]
    fn test_random_play_preserves_cell_count() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..5 {
            let mut s = State::new(7, 5);
            let area = 7 * 5;
            let mut pieces = area - s.board().count(Cell::Empty);
            for _ in 0..200 {
                if s.is_terminal() {
                    break;
                }
                let moves = s.available_moves();
                let mv = &moves[rng.usize(..moves.len())];
                s = s.execute_move(mv).unwrap();
                let b = s.board();
                let now = b.count(Cell::White) + b.count(Cell::Black);
                assert_eq!(now + b.count(Cell::Empty), area);
                assert!(now <= pieces);
                pieces = now;
            }
        }
    }
}
