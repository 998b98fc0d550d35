//! Winning line analysis for the 3x3 board

use super::board::{Cell, Mark};

/// Winning line indices on the 3x3 board
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

/// Check whether a mark holds a complete line
pub fn has_won(cells: &[Cell; 9], mark: Mark) -> bool {
    let target = mark.to_cell();
    WINNING_LINES
        .iter()
        .any(|line| line.iter().all(|&idx| cells[idx] == target))
}

/// Winner of the position, if any line is complete
pub fn winner(cells: &[Cell; 9]) -> Option<Mark> {
    if has_won(cells, Mark::X) {
        Some(Mark::X)
    } else if has_won(cells, Mark::O) {
        Some(Mark::O)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_each_winning_line() {
        for line in WINNING_LINES {
            let mut cells = [Cell::Empty; 9];
            for idx in line {
                cells[idx] = Cell::X;
            }
            assert!(has_won(&cells, Mark::X), "line {line:?} not detected");
            assert!(!has_won(&cells, Mark::O));
            assert_eq!(winner(&cells), Some(Mark::X));
        }
    }

    #[test]
    fn no_winner_on_mixed_line() {
        let mut cells = [Cell::Empty; 9];
        cells[0] = Cell::X;
        cells[1] = Cell::O;
        cells[2] = Cell::X;
        assert_eq!(winner(&cells), None);
    }

    #[test]
    fn detects_o_column() {
        let mut cells = [Cell::Empty; 9];
        cells[1] = Cell::O;
        cells[4] = Cell::O;
        cells[7] = Cell::O;
        assert_eq!(winner(&cells), Some(Mark::O));
    }
}
