//! Board geometry: players, cells, squares, directions and the grid itself.
//!
//! The grid is stored row-major with row 0 at the top. Squares print as a
//! column letter followed by a 1-based row number, so `a1` is the top-left
//! corner.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One of the two sides. White moves first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    White,
    Black,
}

impl Player {
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::White => write!(f, "white"),
            Player::Black => write!(f, "black"),
        }
    }
}

/// Occupancy of a single intersection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Empty,
    White,
    Black,
}

impl Cell {
    /// The player owning the piece on this cell, if any.
    #[inline]
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::White => Some(Player::White),
            Cell::Black => Some(Player::Black),
        }
    }

    fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::White => 'W',
            Cell::Black => 'B',
        }
    }

    fn from_char(c: char) -> Option<Cell> {
        match c {
            '.' | '_' => Some(Cell::Empty),
            'W' | 'w' => Some(Cell::White),
            'B' | 'b' => Some(Cell::Black),
            _ => None,
        }
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::White => Cell::White,
            Player::Black => Cell::Black,
        }
    }
}

/// Errors produced when reading squares, moves or boards from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid square: {0:?}")]
    Square(String),
    #[error("invalid move: {0:?}")]
    Move(String),
    #[error("invalid board: {0}")]
    Board(String),
}

/// A board coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub row: usize,
    pub col: usize,
}

impl Square {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Strong points carry the diagonal lines of a traditional board.
    #[inline]
    pub fn is_strong(self) -> bool {
        (self.row + self.col) % 2 == 0
    }

    /// Chebyshev (king-move) distance.
    #[inline]
    pub fn distance(self, other: Square) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = (b'a' + self.col as u8) as char;
        write!(f, "{c}{}", self.row + 1)
    }
}

impl FromStr for Square {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseError::Square(s.to_string());
        let mut chars = s.chars();
        let col_char = chars.next().ok_or_else(err)?.to_ascii_lowercase();
        if !col_char.is_ascii_lowercase() {
            return Err(err());
        }
        let row: usize = chars.as_str().parse().map_err(|_| err())?;
        if row == 0 {
            return Err(err());
        }
        Ok(Square::new(row - 1, (col_char as u8 - b'a') as usize))
    }
}

/// The eight lines a piece can move along.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// (row delta, column delta). North decreases the row.
    #[inline]
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::South => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (-1, -1),
        }
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }

    #[inline]
    pub fn is_diagonal(self) -> bool {
        let (dr, dc) = self.delta();
        dr != 0 && dc != 0
    }

    /// The direction of a single step from `from` to `to`, if they are adjacent.
    pub fn between(from: Square, to: Square) -> Option<Direction> {
        let dr = to.row as isize - from.row as isize;
        let dc = to.col as isize - from.col as isize;
        Direction::ALL.into_iter().find(|d| d.delta() == (dr, dc))
    }
}

/// Which squares carry diagonal connections.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Diagonals {
    /// Every square connects in all eight directions.
    #[default]
    All,
    /// Only squares with an even coordinate sum connect diagonally.
    StrongPoints,
}

/// A rectangular grid of cells.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    width: usize,
    height: usize,
    diagonals: Diagonals,
    cells: Vec<Cell>,
}

impl Board {
    /// An empty `width x height` board.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            diagonals: Diagonals::All,
            cells: vec![Cell::Empty; width * height],
        }
    }

    /// The starting layout.
    ///
    /// Black fills the rows above the middle and White the rows below. On an
    /// odd-height board the middle row alternates colours around an empty
    /// centre. Every square holds the opposite colour of its 180-degree
    /// rotation, so both sides start with the same material. On an even-height
    /// board the two central rows start empty.
    pub fn initial(width: usize, height: usize) -> Self {
        let mut board = Self::new(width, height);
        let (top, bottom) = if height % 2 == 1 {
            (height / 2, height / 2 + 1)
        } else {
            (height / 2 - 1, height / 2 + 1)
        };
        for row in 0..height {
            for col in 0..width {
                let cell = if row < top {
                    Cell::Black
                } else if row >= bottom {
                    Cell::White
                } else if height % 2 == 1 {
                    middle_row_cell(width, col)
                } else {
                    Cell::Empty
                };
                board.set(Square::new(row, col), cell);
            }
        }
        board
    }

    /// Parse a board from one string per row using `W`, `B` and `.`.
    pub fn from_rows(rows: &[&str]) -> Result<Self, ParseError> {
        let height = rows.len();
        if height == 0 {
            return Err(ParseError::Board("no rows".to_string()));
        }
        let width = rows[0].chars().count();
        if width == 0 {
            return Err(ParseError::Board("empty row".to_string()));
        }
        let mut board = Self::new(width, height);
        for (row, line) in rows.iter().enumerate() {
            if line.chars().count() != width {
                return Err(ParseError::Board(format!(
                    "row {} has length {}, expected {width}",
                    row + 1,
                    line.chars().count()
                )));
            }
            for (col, c) in line.chars().enumerate() {
                let cell = Cell::from_char(c)
                    .ok_or_else(|| ParseError::Board(format!("unexpected character {c:?}")))?;
                board.set(Square::new(row, col), cell);
            }
        }
        Ok(board)
    }

    /// Set which points carry diagonal lines.
    pub fn with_diagonals(mut self, diagonals: Diagonals) -> Self {
        self.diagonals = diagonals;
        self
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Diagonal mode of this board.
    #[inline]
    pub fn diagonals(&self) -> Diagonals {
        self.diagonals
    }

    #[inline]
    fn idx(&self, sq: Square) -> usize {
        sq.row * self.width + sq.col
    }

    /// Whether `sq` lies on the board.
    #[inline]
    pub fn contains(&self, sq: Square) -> bool {
        sq.row < self.height && sq.col < self.width
    }

    /// The cell at `sq`. Squares outside the board read as empty.
    #[inline]
    pub fn get(&self, sq: Square) -> Cell {
        if !self.contains(sq) {
            return Cell::Empty;
        }
        self.cells[self.idx(sq)]
    }

    #[inline]
    pub fn set(&mut self, sq: Square, cell: Cell) {
        let i = self.idx(sq);
        self.cells[i] = cell;
    }

    /// Rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.width)
    }

    /// Every square in row-major order.
    pub fn squares(&self) -> impl Iterator<Item = Square> + use<> {
        let width = self.width;
        (0..self.width * self.height).map(move |i| Square::new(i / width, i % width))
    }

    /// Squares holding a piece of `player`, in row-major order.
    pub fn pieces(&self, player: Player) -> impl Iterator<Item = Square> + '_ {
        self.squares().filter(move |&sq| self.get(sq).owner() == Some(player))
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    /// The neighbouring square in direction `dir`, if the board has that line.
    #[inline]
    pub fn step(&self, sq: Square, dir: Direction) -> Option<Square> {
        if dir.is_diagonal() && self.diagonals == Diagonals::StrongPoints && !sq.is_strong() {
            return None;
        }
        let (dr, dc) = dir.delta();
        let row = sq.row.checked_add_signed(dr)?;
        let col = sq.col.checked_add_signed(dc)?;
        let next = Square::new(row, col);
        self.contains(next).then_some(next)
    }

    /// All squares connected to `sq` by a line segment.
    pub fn neighbors(&self, sq: Square) -> impl Iterator<Item = Square> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| self.step(sq, dir))
    }

    /// The run of `player`'s pieces starting one step from `sq` along `dir`.
    pub fn run(&self, sq: Square, dir: Direction, player: Player) -> Vec<Square> {
        let mut out = Vec::new();
        let mut cur = sq;
        while let Some(next) = self.step(cur, dir) {
            if self.get(next).owner() != Some(player) {
                break;
            }
            out.push(next);
            cur = next;
        }
        out
    }
}

/// Middle-row cell for an odd-height board.
fn middle_row_cell(width: usize, col: usize) -> Cell {
    // Central empty squares: one for odd widths, a mirrored pair for even.
    let (left_end, right_start) = if width % 2 == 1 {
        (width / 2, width / 2 + 1)
    } else {
        (width / 2 - 1, width / 2 + 1)
    };
    let left = |c: usize| if c % 2 == 0 { Cell::Black } else { Cell::White };
    if col < left_end {
        left(col)
    } else if col >= right_start {
        match left(width - 1 - col) {
            Cell::Black => Cell::White,
            _ => Cell::Black,
        }
    } else {
        Cell::Empty
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for col in 0..self.width {
            write!(f, " {}", (b'a' + col as u8) as char)?;
        }
        writeln!(f)?;
        for (row, cells) in self.rows().enumerate() {
            write!(f, "{:>2}", row + 1)?;
            for cell in cells {
                write!(f, " {}", cell.to_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
