//! Winning line analysis

use super::{Cell, Mark};

/// Winning line indices on the 3x3 board (row-major cell indices)
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

/// Utility for analyzing winning lines
pub struct LineAnalyzer;

impl LineAnalyzer {
    /// Check if a mark fills any complete line
    pub fn has_won(cells: &[Cell; 9], mark: Mark) -> bool {
        let target = mark.to_cell();
        WINNING_LINES
            .iter()
            .any(|line| line.iter().all(|&idx| cells[idx] == target))
    }

    /// First line (in `WINNING_LINES` order) completed by a single mark
    pub fn completed_by(cells: &[Cell; 9]) -> Option<Mark> {
        WINNING_LINES.iter().find_map(|line| {
            let first = cells[line[0]].mark()?;
            line.iter()
                .all(|&idx| cells[idx] == first.to_cell())
                .then_some(first)
        })
    }

    /// First cell index that would complete a line for `mark`
    pub fn winning_move(cells: &[Cell; 9], mark: Mark) -> Option<usize> {
        WINNING_LINES
            .iter()
            .find_map(|line| Self::winning_move_in_line(cells, mark, line))
    }

    /// Find the winning move position in a specific line, if one exists
    fn winning_move_in_line(cells: &[Cell; 9], mark: Mark, line: &[usize; 3]) -> Option<usize> {
        let target = mark.to_cell();
        let mut count = 0;
        let mut empty_pos = None;

        for &idx in line {
            match cells[idx] {
                Cell::Empty => {
                    if empty_pos.is_some() {
                        return None;
                    }
                    empty_pos = Some(idx);
                }
                c if c == target => count += 1,
                _ => return None,
            }
        }

        if count == 2 { empty_pos } else { None }
    }
}
