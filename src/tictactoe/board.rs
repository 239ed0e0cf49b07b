//! Board representation and basic operations

use std::fmt;

use serde::{Deserialize, Serialize};

use super::lines::LineAnalyzer;

/// Side length of the board
pub const BOARD_SIZE: usize = 3;

/// Number of cells on the board
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// A cell on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '-',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }

    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '-' | '.' | ' ' => Some(Cell::Empty),
            'X' | 'x' => Some(Cell::X),
            'O' | 'o' | '0' => Some(Cell::O),
            _ => None,
        }
    }

    /// The mark occupying this cell, if any
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Mark::X),
            Cell::O => Some(Mark::O),
        }
    }
}

/// A mark placed on the board.
///
/// The remote player always plays `X`, the agent always plays `O`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// Mark of the remote player
    pub const PLAYER: Mark = Mark::X;
    /// Mark of the agent
    pub const AGENT: Mark = Mark::O;

    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub fn to_cell(self) -> Cell {
        match self {
            Mark::X => Cell::X,
            Mark::O => Cell::O,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mark::X => "X",
            Mark::O => "O",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row-major cell index for a coordinate already known to be in bounds
pub fn index_of(row: usize, col: usize) -> usize {
    row * BOARD_SIZE + col
}

/// Coordinate of a row-major cell index
pub fn coords_of(index: usize) -> (usize, usize) {
    (index / BOARD_SIZE, index % BOARD_SIZE)
}

/// Check a signed coordinate pair against the board bounds.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidCell`] when either coordinate is outside `[0, 3)`.
pub fn checked_coords(row: i64, col: i64) -> Result<(usize, usize), crate::Error> {
    let in_range = |v: i64| (0..BOARD_SIZE as i64).contains(&v);
    if in_range(row) && in_range(col) {
        Ok((row as usize, col as usize))
    } else {
        Err(crate::Error::InvalidCell { row, col })
    }
}

/// A 3x3 grid of cells.
///
/// Pure value type: every query is a function of the cells alone. Cells only
/// change through [`Board::place`], which refuses occupied or out-of-range
/// targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Board {
            cells: [Cell::Empty; CELL_COUNT],
        }
    }

    /// Parse a board from its 9-character state key (`X`, `O`, `-`).
    ///
    /// Whitespace is ignored, so multi-line literals work in tests.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] if the key does not hold
    /// exactly nine valid cell characters.
    pub fn from_state_key(key: &str) -> Result<Self, crate::Error> {
        let chars: Vec<char> = key.chars().filter(|c| !c.is_whitespace()).collect();
        if chars.len() != CELL_COUNT {
            return Err(crate::Error::InvalidConfiguration {
                message: format!("board key '{key}' must have {CELL_COUNT} cells"),
            });
        }

        let mut cells = [Cell::Empty; CELL_COUNT];
        for (i, &c) in chars.iter().enumerate() {
            cells[i] = Cell::from_char(c).ok_or_else(|| crate::Error::InvalidConfiguration {
                message: format!("invalid character '{c}' at position {i} in '{key}'"),
            })?;
        }
        Ok(Board { cells })
    }

    /// Raw cells in row-major order
    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    /// Cell at a coordinate, or `None` when out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(self.cells[index_of(row, col)])
        } else {
            None
        }
    }

    /// Place a mark into an empty cell.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InvalidCell`] if the coordinate is out of bounds
    /// - [`crate::Error::CellOccupied`] if the cell already holds a mark
    pub fn place(&mut self, row: usize, col: usize, mark: Mark) -> Result<(), crate::Error> {
        match self.get(row, col) {
            None => Err(crate::Error::InvalidCell {
                row: row as i64,
                col: col as i64,
            }),
            Some(Cell::Empty) => {
                self.cells[index_of(row, col)] = mark.to_cell();
                Ok(())
            }
            Some(_) => Err(crate::Error::CellOccupied { row, col }),
        }
    }

    /// Copy of this board with `mark` placed at a cell index.
    ///
    /// Used by planners and heuristics that explore hypothetical positions.
    pub fn with_mark(&self, index: usize, mark: Mark) -> Result<Board, crate::Error> {
        let (row, col) = coords_of(index);
        let mut next = *self;
        next.place(row, col, mark)?;
        Ok(next)
    }

    /// The mark with three in a row, if any.
    ///
    /// Under alternating play at most one mark can hold a line.
    pub fn winner(&self) -> Option<Mark> {
        LineAnalyzer::completed_by(&self.cells)
    }

    pub fn has_won(&self, mark: Mark) -> bool {
        LineAnalyzer::has_won(&self.cells, mark)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&c| c != Cell::Empty)
    }

    /// Full board with no completed line
    pub fn is_draw(&self) -> bool {
        self.is_full() && self.winner().is_none()
    }

    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.is_full()
    }

    /// Empty cells as `(row, col)` in row-major order
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.empty_indices().into_iter().map(coords_of).collect()
    }

    /// Empty cells as row-major indices
    pub fn empty_indices(&self) -> Vec<usize> {
        (0..CELL_COUNT)
            .filter(|&i| self.cells[i] == Cell::Empty)
            .collect()
    }

    /// Number of cells holding `mark`
    pub fn count(&self, mark: Mark) -> usize {
        let target = mark.to_cell();
        self.cells.iter().filter(|&&c| c == target).count()
    }

    /// Row-major 9-character key, e.g. `"X-O------"`.
    ///
    /// Tabular learners key their value tables by this string.
    pub fn state_key(&self) -> String {
        self.cells.iter().map(|c| c.to_char()).collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    0   1   2")?;
        for row in 0..BOARD_SIZE {
            write!(f, "{row}  ")?;
            for col in 0..BOARD_SIZE {
                write!(f, " {} ", self.cells[index_of(row, col)].to_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_new_board() {
        let board = Board::new();
        assert_eq!(board.empty_cells().len(), 9);
        assert!(!board.is_full());
        assert_eq!(board.winner(), None);
        assert_eq!(board.state_key(), "---------");
    }

    #[test]
    fn test_place() {
        let mut board = Board::new();
        board.place(1, 2, Mark::X).unwrap();
        assert_eq!(board.get(1, 2), Some(Cell::X));
        assert_eq!(board.state_key(), "-----X---");
    }

    #[test]
    fn test_place_rejects_occupied_cell() {
        let mut board = Board::new();
        board.place(0, 0, Mark::X).unwrap();
        let before = board;

        let err = board.place(0, 0, Mark::O).unwrap_err();
        assert!(matches!(err, Error::CellOccupied { row: 0, col: 0 }));
        assert_eq!(board, before);
    }

    #[test]
    fn test_place_rejects_out_of_bounds() {
        let mut board = Board::new();
        let err = board.place(3, 0, Mark::X).unwrap_err();
        assert!(matches!(err, Error::InvalidCell { row: 3, col: 0 }));
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_checked_coords() {
        assert_eq!(checked_coords(2, 1).unwrap(), (2, 1));
        assert!(checked_coords(-1, 0).is_err());
        assert!(checked_coords(0, 3).is_err());
    }

    #[test]
    fn test_win_detection_vertical() {
        let board = Board::from_state_key("-O- -O- -O-").unwrap();
        assert_eq!(board.winner(), Some(Mark::O));
        assert!(board.is_terminal());
    }

    #[test]
    fn test_draw_detection() {
        // X O X
        // X O O
        // O X X
        let board = Board::from_state_key("XOXXOOOXX").unwrap();
        assert!(board.is_full());
        assert_eq!(board.winner(), None);
        assert!(board.is_draw());
    }

    #[test]
    fn test_full_board_with_winner_is_not_a_draw() {
        let board = Board::from_state_key("XXXOOXXOO").unwrap();
        assert!(board.is_full());
        assert_eq!(board.winner(), Some(Mark::X));
        assert!(!board.is_draw());
    }

    #[test]
    fn test_from_state_key_rejects_bad_input() {
        assert!(Board::from_state_key("XO").is_err());
        assert!(Board::from_state_key("XO?------").is_err());
    }

    #[test]
    fn test_counts_and_coords() {
        let board = Board::from_state_key("X-O-X----").unwrap();
        assert_eq!(board.count(Mark::X), 2);
        assert_eq!(board.count(Mark::O), 1);
        assert_eq!(coords_of(5), (1, 2));
        assert_eq!(index_of(2, 1), 7);
    }

    #[test]
    fn test_display() {
        let board = Board::from_state_key("XOX-O-X--").unwrap();
        let display = format!("{board}");
        assert!(display.contains(" X  O  X "));
        assert!(display.contains(" -  O  - "));
    }
}
