use super::{finalize_differential, Evaluator};
use crate::config::EvalParams;
use crate::core::{Board, Cell};
use crate::logic::is_terminal;
use std::sync::Arc;

// On small boards a cell can fall in several classes; the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Square {
    Corner,
    X,
    C,
    Edge,
    Inner,
}

fn classify(x: usize, y: usize, width: usize, height: usize) -> Square {
    // Distance to the closest border along each axis.
    let dx = x.min(width - 1 - x);
    let dy = y.min(height - 1 - y);

    match (dx, dy) {
        (0, 0) => Square::Corner,
        (1, 1) => Square::X,
        (0, 1) | (1, 0) => Square::C,
        (0, _) | (_, 0) => Square::Edge,
        _ => Square::Inner,
    }
}

/// Per-cell weights for the static heuristic, derived once per board size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightTable {
    pub width: usize,
    pub height: usize,
    weights: Vec<i32>,
}

impl WeightTable {
    pub fn new(params: &EvalParams, width: usize, height: usize) -> Self {
        let mut weights = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                weights.push(match classify(x, y, width, height) {
                    Square::Corner => params.corner_weight,
                    Square::X => params.x_square_weight,
                    Square::C => params.c_square_weight,
                    Square::Edge => params.edge_weight,
                    Square::Inner => params.inner_weight,
                });
            }
        }
        Self {
            width,
            height,
            weights,
        }
    }

    pub fn weights(&self) -> &[i32] {
        &self.weights
    }

    pub fn matches(&self, board: &Board) -> bool {
        self.width == board.width && self.height == board.height
    }
}

/// Dot product of a contiguous run of cells with the weights starting at
/// `offset`. With `is_final` the weights are ignored and the plain disc
/// differential of the slice is returned.
pub fn partial_sum(cells: &[Cell], weights: &[i32], offset: usize, is_final: bool) -> i32 {
    if is_final {
        return cells.iter().map(|c| c.value()).sum();
    }
    cells
        .iter()
        .zip(&weights[offset..offset + cells.len()])
        .map(|(c, w)| c.value() * w)
        .sum()
}

/// Static evaluation from Max's perspective on a single participant.
pub fn evaluate_static(board: &Board, table: &WeightTable) -> i32 {
    debug_assert!(table.matches(board), "weight table built for another board size");
    if is_terminal(board) {
        return finalize_differential(partial_sum(board.cells(), table.weights(), 0, true));
    }
    partial_sum(board.cells(), table.weights(), 0, false)
}

/// `Evaluator` wrapper around the single-participant static heuristic.
pub struct StaticEvaluator {
    table: Arc<WeightTable>,
}

impl StaticEvaluator {
    pub fn new(table: Arc<WeightTable>) -> Self {
        Self { table }
    }
}

impl Evaluator for StaticEvaluator {
    fn evaluate(&mut self, board: &Board) -> i32 {
        evaluate_static(board, &self.table)
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{setup_from_strings, standard_setup};
    use crate::eval::FINAL_SCORE_OFFSET;

    #[test]
    fn test_square_classes_on_8x8() {
        let table = WeightTable::new(&EvalParams::default(), 8, 8);
        let w = |x: usize, y: usize| table.weights()[y * 8 + x];
        assert_eq!(w(0, 0), 10);
        assert_eq!(w(7, 7), 10);
        assert_eq!(w(1, 1), -8);
        assert_eq!(w(6, 1), -8);
        assert_eq!(w(1, 0), -4);
        assert_eq!(w(0, 6), -4);
        assert_eq!(w(3, 0), 2);
        assert_eq!(w(7, 4), 2);
        assert_eq!(w(3, 3), 1);
        assert_eq!(w(2, 1), 1);
    }

    #[test]
    fn test_symmetric_opening_scores_zero() {
        let board = standard_setup(8, 8);
        let table = WeightTable::new(&EvalParams::default(), 8, 8);
        assert_eq!(evaluate_static(&board, &table), 0);
    }

    #[test]
    fn test_corner_outweighs_inner() {
        let board = setup_from_strings(&[
            "X.......", //
            "........", //
            "...OX...", //
            "...XO...", //
            "........", //
            "........", //
            "........", //
            "........",
        ])
        .unwrap();
        let table = WeightTable::new(&EvalParams::default(), 8, 8);
        assert_eq!(evaluate_static(&board, &table), 10);
    }

    #[test]
    fn test_final_board_uses_differential() {
        let board = setup_from_strings(&["XXX", "XXO", "OOO"]).unwrap();
        let table = WeightTable::new(&EvalParams::default(), 3, 3);
        assert_eq!(evaluate_static(&board, &table), 1 + FINAL_SCORE_OFFSET);
    }
}
