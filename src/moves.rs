//! Move model: passes and piece motions with optional capture metadata.
//!
//! Text form:
//! - `pass`
//! - `b2-c3` for a quiet motion
//! - `b2-c3/A` for an approach capture, `b2-c3/W` for a withdrawal capture

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::board::{Direction, ParseError, Square};

/// How a capturing motion removes pieces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CaptureKind {
    /// Pieces in line beyond the destination, in the direction of motion.
    Approach,
    /// Pieces in line behind the origin, against the direction of motion.
    Withdrawal,
}

/// The pieces removed by a capturing motion.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Capture {
    pub kind: CaptureKind,
    /// Captured squares, nearest to the moving piece first. Never empty.
    pub squares: Vec<Square>,
}

/// A single step of one piece to an adjacent empty square.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Motion {
    pub from: Square,
    pub to: Square,
    pub capture: Option<Capture>,
}

impl Motion {
    /// A non-capturing step.
    pub fn quiet(from: Square, to: Square) -> Self {
        Self { from, to, capture: None }
    }

    pub fn capturing(from: Square, to: Square, kind: CaptureKind, squares: Vec<Square>) -> Self {
        Self {
            from,
            to,
            capture: Some(Capture { kind, squares }),
        }
    }

    /// Direction of travel, or `None` if `from` and `to` are not neighbours.
    pub fn direction(&self) -> Option<Direction> {
        Direction::between(self.from, self.to)
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.capture.is_some()
    }

    pub fn kind(&self) -> Option<CaptureKind> {
        self.capture.as_ref().map(|c| c.kind)
    }

    /// Captured squares in removal order; empty for a quiet motion.
    pub fn captured(&self) -> &[Square] {
        match &self.capture {
            Some(c) => &c.squares,
            None => &[],
        }
    }

    /// The capture's nearest piece, used to tell an approach from a
    /// withdrawal ending on the same square.
    pub fn first_captured(&self) -> Option<Square> {
        self.captured().first().copied()
    }
}

/// A legal action for the side to move.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Pass,
    Motion(Motion),
}

impl Move {
    #[inline]
    pub fn is_pass(&self) -> bool {
        matches!(self, Move::Pass)
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        matches!(self, Move::Motion(m) if m.is_capture())
    }

    pub fn as_motion(&self) -> Option<&Motion> {
        match self {
            Move::Pass => None,
            Move::Motion(m) => Some(m),
        }
    }

    /// Number of pieces this move removes.
    pub fn capture_count(&self) -> usize {
        self.as_motion().map_or(0, |m| m.captured().len())
    }
}

impl From<Motion> for Move {
    fn from(m: Motion) -> Self {
        Move::Motion(m)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Pass => write!(f, "pass"),
            Move::Motion(m) => {
                write!(f, "{}-{}", m.from, m.to)?;
                match m.kind() {
                    Some(CaptureKind::Approach) => write!(f, "/A"),
                    Some(CaptureKind::Withdrawal) => write!(f, "/W"),
                    None => Ok(()),
                }
            }
        }
    }
}

/// A move as typed by a user: enough to pick a legal move, but without the
/// captured squares.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Notation {
    Pass,
    Motion {
        from: Square,
        to: Square,
        kind: Option<CaptureKind>,
    },
}

/// Failure to match a [`Notation`] against a set of legal moves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("illegal move: {0}")]
    Unknown(String),
    #[error("ambiguous move {0}: add /A or /W")]
    Ambiguous(String),
}

impl FromStr for Notation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("pass") {
            return Ok(Notation::Pass);
        }
        let err = || ParseError::Move(s.to_string());
        let (squares, kind) = match s.split_once('/') {
            Some((sq, k)) => {
                let kind = match k {
                    "A" | "a" => CaptureKind::Approach,
                    "W" | "w" => CaptureKind::Withdrawal,
                    _ => return Err(err()),
                };
                (sq, Some(kind))
            }
            None => (s, None),
        };
        let (from, to) = squares.split_once('-').ok_or_else(err)?;
        Ok(Notation::Motion {
            from: from.parse().map_err(|_| err())?,
            to: to.parse().map_err(|_| err())?,
            kind,
        })
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notation::Pass => write!(f, "pass"),
            Notation::Motion { from, to, kind } => {
                write!(f, "{from}-{to}")?;
                match kind {
                    Some(CaptureKind::Approach) => write!(f, "/A"),
                    Some(CaptureKind::Withdrawal) => write!(f, "/W"),
                    None => Ok(()),
                }
            }
        }
    }
}

impl Notation {
    /// Whether `mv` is a move this notation can denote.
    pub fn matches(&self, mv: &Move) -> bool {
        match (self, mv) {
            (Notation::Pass, Move::Pass) => true,
            (Notation::Motion { from, to, kind }, Move::Motion(m)) => {
                m.from == *from && m.to == *to && (kind.is_none() || *kind == m.kind())
            }
            _ => false,
        }
    }

    /// Pick the unique legal move this notation names.
    pub fn resolve<'a>(&self, legal: &'a [Move]) -> Result<&'a Move, NotationError> {
        let mut found = legal.iter().filter(|mv| self.matches(mv));
        match (found.next(), found.next()) {
            (Some(mv), None) => Ok(mv),
            (Some(_), Some(_)) => Err(NotationError::Ambiguous(self.to_string())),
            (None, _) => Err(NotationError::Unknown(self.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_display() {
        assert_eq!(Move::Pass.to_string(), "pass");
        let quiet: Move = Motion::quiet(sq("a1"), sq("b2")).into();
        assert_eq!(quiet.to_string(), "a1-b2");
        let cap: Move =
            Motion::capturing(sq("a1"), sq("b1"), CaptureKind::Withdrawal, vec![sq("c1")]).into();
        assert_eq!(cap.to_string(), "a1-b1/W");
        assert_eq!(cap.capture_count(), 1);
    }

    #[test]
    fn test_parse_notation() {
        assert_eq!("pass".parse::<Notation>(), Ok(Notation::Pass));
        assert_eq!(
            "b2-c3/a".parse::<Notation>(),
            Ok(Notation::Motion {
                from: sq("b2"),
                to: sq("c3"),
                kind: Some(CaptureKind::Approach),
            })
        );
        assert!("b2c3".parse::<Notation>().is_err());
        assert!("b2-c3/x".parse::<Notation>().is_err());
    }

    #[test]
    fn test_resolve_ambiguous_capture() {
        let approach: Move =
            Motion::capturing(sq("b1"), sq("c1"), CaptureKind::Approach, vec![sq("d1")]).into();
        let withdrawal: Move =
            Motion::capturing(sq("b1"), sq("c1"), CaptureKind::Withdrawal, vec![sq("a1")]).into();
        let legal = vec![approach.clone(), withdrawal.clone()];

        let bare: Notation = "b1-c1".parse().unwrap();
        assert!(matches!(bare.resolve(&legal), Err(NotationError::Ambiguous(_))));

        let tagged: Notation = "b1-c1/W".parse().unwrap();
        assert_eq!(tagged.resolve(&legal), Ok(&withdrawal));

        let missing: Notation = "b1-b2".parse().unwrap();
        assert!(matches!(missing.resolve(&legal), Err(NotationError::Unknown(_))));
    }

    #[test]
    fn test_first_captured_disambiguates() {
        let approach =
            Motion::capturing(sq("b1"), sq("c1"), CaptureKind::Approach, vec![sq("d1"), sq("e1")]);
        assert_eq!(approach.first_captured(), Some(sq("d1")));
        assert_eq!(approach.direction(), Some(Direction::East));
        assert_eq!(Motion::quiet(sq("b1"), sq("c1")).first_captured(), None);
    }

    #[test]
    fn test_direction_needs_neighbours() {
        assert_eq!(Motion::quiet(sq("b2"), sq("a1")).direction(), Some(Direction::NorthWest));
        assert_eq!(Motion::quiet(sq("a1"), sq("c1")).direction(), None);
        assert_eq!(Motion::quiet(sq("a1"), sq("a1")).direction(), None);
    }
}
