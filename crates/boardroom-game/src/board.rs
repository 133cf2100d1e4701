//! The board: grid state, move legality, and win/draw evaluation.

use boardroom_protocol::{BoardSnapshot, Cell, Coord, Seat};

/// Side length of the square board.
pub const BOARD_SIZE: usize = 3;

/// Result of scanning the board for a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// A full line of this seat's marks exists.
    Winner(Seat),
    /// Every cell is taken and no line exists.
    Draw,
    /// Play continues.
    Undecided,
}

/// A square grid of [`BOARD_SIZE`] × [`BOARD_SIZE`] cells.
///
/// Cells are addressed `(x, y)` with `x` the column and `y` the row.
/// A cell goes from empty to occupied at most once; the only mutator is
/// [`Board::place`], which refuses occupied targets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `(x, y)` is a well-formed, in-range coordinate
    /// whose cell is empty.
    ///
    /// Malformed coordinates are simply invalid.
    pub fn is_valid(&self, x: impl Into<Coord>, y: impl Into<Coord>) -> bool {
        self.target(x.into(), y.into()).is_some()
    }

    /// Marks `(x, y)` for `seat` if the move is valid.
    ///
    /// Returns `false` and leaves the board untouched otherwise. An illegal
    /// move is expected input from an untrusted client, not an error.
    pub fn place(
        &mut self,
        x: impl Into<Coord>,
        y: impl Into<Coord>,
        seat: Seat,
    ) -> bool {
        match self.target(x.into(), y.into()) {
            Some((col, row)) => {
                self.cells[row][col] = Cell::Occupied(seat);
                true
            }
            None => false,
        }
    }

    /// Returns the cell at column `x`, row `y`, or `None` off the board.
    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        self.cells.get(y)?.get(x).copied()
    }

    /// Returns `true` when no empty cell is left.
    pub fn is_full(&self) -> bool {
        self.cells
            .iter()
            .flatten()
            .all(|cell| *cell != Cell::Empty)
    }

    /// Looks for a completed line.
    ///
    /// Lines are scanned rows top-to-bottom, then columns left-to-right,
    /// then the main diagonal, then the anti-diagonal. The first complete
    /// line decides the winner, so the result is well defined even for
    /// boards that could not arise from legal play.
    pub fn check_win(&self) -> Verdict {
        let n = BOARD_SIZE;
        let rows = (0..n).map(|y| self.line_owner((0..n).map(|x| (x, y))));
        let cols = (0..n).map(|x| self.line_owner((0..n).map(|y| (x, y))));
        let diagonal = self.line_owner((0..n).map(|i| (i, i)));
        let anti_diagonal = self.line_owner((0..n).map(|i| (i, n - 1 - i)));

        let winner = rows
            .chain(cols)
            .chain([diagonal, anti_diagonal])
            .flatten()
            .next();

        match winner {
            Some(seat) => Verdict::Winner(seat),
            None if self.is_full() => Verdict::Draw,
            None => Verdict::Undecided,
        }
    }

    /// Returns the board as nested rows for the wire.
    pub fn snapshot(&self) -> BoardSnapshot {
        self.cells.iter().map(|row| row.to_vec()).collect()
    }

    /// Resolves a client coordinate pair to an empty `(col, row)`.
    fn target(&self, x: Coord, y: Coord) -> Option<(usize, usize)> {
        let col = x.index(BOARD_SIZE)?;
        let row = y.index(BOARD_SIZE)?;
        (self.cells[row][col] == Cell::Empty).then_some((col, row))
    }

    /// The seat owning every cell of the line, if one does.
    fn line_owner(
        &self,
        mut line: impl Iterator<Item = (usize, usize)>,
    ) -> Option<Seat> {
        let (x, y) = line.next()?;
        let owner = self.cells[y][x].occupant()?;
        line.all(|(x, y)| self.cells[y][x] == Cell::Occupied(owner))
            .then_some(owner)
    }
}
