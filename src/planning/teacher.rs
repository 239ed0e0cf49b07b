//! Scripted training opponent that knows the classic strategy

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};

use crate::{
    Result,
    error::Error,
    ports::Learner,
    tictactoe::{Board, LineAnalyzer, Mark, WINNING_LINES, coords_of},
};

const CENTER: usize = 4;
const CORNERS: [usize; 4] = [0, 2, 6, 8];
const SIDES: [usize; 4] = [1, 3, 5, 7];

/// Default probability of playing the strategic move instead of a random one
pub const DEFAULT_TEACHER_LEVEL: f64 = 0.9;

/// Heuristic opponent used for `teacher` training
///
/// With probability `level` it plays, in order of preference: a winning
/// move, a block, a fork, a fork block, the center, a corner, a side.
/// Otherwise it picks a uniformly random empty cell.
#[derive(Debug, Clone)]
pub struct Teacher {
    level: f64,
    rng: StdRng,
}

impl Teacher {
    pub fn new(level: f64) -> Self {
        Self {
            level: level.clamp(0.0, 1.0),
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// Best move according to the fixed preference order
    pub fn strategic_move(board: &Board, mark: Mark) -> Option<usize> {
        let cells = board.cells();
        LineAnalyzer::winning_move(cells, mark)
            .or_else(|| LineAnalyzer::winning_move(cells, mark.opponent()))
            .or_else(|| fork_move(board, mark))
            .or_else(|| fork_move(board, mark.opponent()))
            .or_else(|| first_empty(board, &[CENTER]))
            .or_else(|| first_empty(board, &CORNERS))
            .or_else(|| first_empty(board, &SIDES))
    }
}

impl Default for Teacher {
    fn default() -> Self {
        Self::new(DEFAULT_TEACHER_LEVEL)
    }
}

/// Number of lines `mark` could complete with one more move
fn open_threats(board: &Board, mark: Mark) -> usize {
    let cells = board.cells();
    WINNING_LINES
        .iter()
        .filter(|line| {
            let owned = line.iter().filter(|&&i| cells[i].mark() == Some(mark)).count();
            let empty = line.iter().filter(|&&i| cells[i].mark().is_none()).count();
            owned == 2 && empty == 1
        })
        .count()
}

/// A cell that leaves `mark` with two simultaneous winning threats
fn fork_move(board: &Board, mark: Mark) -> Option<usize> {
    board.empty_indices().into_iter().find(|&index| {
        board
            .with_mark(index, mark)
            .is_ok_and(|next| open_threats(&next, mark) >= 2)
    })
}

fn first_empty(board: &Board, candidates: &[usize]) -> Option<usize> {
    let cells = board.cells();
    candidates
        .iter()
        .copied()
        .find(|&i| cells[i].mark().is_none())
}

impl Learner for Teacher {
    fn select_move(&mut self, board: &Board, mark: Mark) -> Result<(usize, usize)> {
        let strategic = if self.rng.random::<f64>() < self.level {
            Self::strategic_move(board, mark)
        } else {
            None
        };
        let index = match strategic {
            Some(index) => index,
            None => *board
                .empty_indices()
                .choose(&mut self.rng)
                .ok_or(Error::NoValidMoves)?,
        };
        Ok(coords_of(index))
    }

    fn name(&self) -> &str {
        "Teacher"
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.rng = StdRng::seed_from_u64(seed);
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(key: &str) -> Board {
        Board::from_state_key(key).unwrap()
    }

    #[test]
    fn test_prefers_win_over_block() {
        // X can win at 2, O threatens 5
        let b = board("XX-OO----");
        assert_eq!(Teacher::strategic_move(&b, Mark::X), Some(2));
    }

    #[test]
    fn test_blocks_opponent_win() {
        let b = board("OO--X----");
        assert_eq!(Teacher::strategic_move(&b, Mark::X), Some(2));
    }

    #[test]
    fn test_creates_fork() {
        // X on two corners with O in the center edge pattern: 8 makes two threats
        let b = board("X-O-O---X");
        let fork = fork_move(&b, Mark::X);
        assert!(fork.is_some());
        let next = b.with_mark(fork.unwrap(), Mark::X).unwrap();
        assert!(open_threats(&next, Mark::X) >= 2);
    }

    #[test]
    fn test_opening_takes_center() {
        assert_eq!(Teacher::strategic_move(&Board::new(), Mark::X), Some(4));
    }

    #[test]
    fn test_level_zero_plays_randomly_but_legally() {
        let mut teacher = Teacher::new(0.0).with_seed(42);
        let b = board("XOXOX-O--");
        for _ in 0..20 {
            let (row, col) = teacher.select_move(&b, Mark::X).unwrap();
            assert!(b.get(row, col).is_some_and(|c| c.mark().is_none()));
        }
    }

    #[test]
    fn test_full_level_is_deterministic() {
        let mut teacher = Teacher::new(1.0).with_seed(1);
        assert_eq!(teacher.select_move(&Board::new(), Mark::X).unwrap(), (1, 1));
    }
}
