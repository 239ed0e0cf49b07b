//! Tic-Tac-Toe board and game vocabulary

pub mod board;
pub mod game;
pub mod lines;

pub use board::{BOARD_SIZE, Board, CELL_COUNT, Cell, Mark, checked_coords, coords_of, index_of};
pub use game::{GameOutcome, GameStatus, Move, Turn};
pub use lines::{LineAnalyzer, WINNING_LINES};
