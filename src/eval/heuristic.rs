use super::{final_score, Evaluator};
use crate::config::EvalParams;
use crate::core::{Board, Cell, Side};
use crate::logic::{disc_count, flip_all, legal_moves};
use std::sync::Arc;

/// Dynamic evaluation from Max's perspective.
///
/// # Signals
/// - **Parity**: `100 * (max - min) / (max + min)` over disc counts.
/// - **Mobility**: `(max - min) / (max + min)` over legal move counts.
/// - **Stability**: `100 * (max - min) / (max + min)` over stable discs.
///
/// When neither side can move the position is final and the
/// finality-biased disc differential is returned instead.
pub fn evaluate(board: &Board, params: &EvalParams) -> i32 {
    let max_moves = legal_moves(board, Side::Max).len() as f64;
    let min_moves = legal_moves(board, Side::Min).len() as f64;
    if max_moves + min_moves == 0.0 {
        return final_score(board);
    }

    let (max_discs, min_discs) = disc_count(board);
    let parity = ratio(100.0, max_discs as f64, min_discs as f64);
    let mobility = ratio(1.0, max_moves, min_moves);

    let max_stable = stable_disc_count(board) as f64;
    let min_stable = stable_disc_count(&flip_all(board)) as f64;
    let stability = ratio(100.0, max_stable, min_stable);

    let score = params.parity_weight * parity
        + params.stability_weight * stability
        + params.mobility_weight * mobility;

    log::trace!(
        "parity {:.2} mobility {:.2} stability {:.2} -> {:.2}",
        parity,
        mobility,
        stability,
        score
    );
    score as i32
}

fn ratio(scale: f64, a: f64, b: f64) -> f64 {
    if a + b == 0.0 {
        0.0
    } else {
        scale * (a - b) / (a + b)
    }
}

/// Number of Max discs that can never be flipped again.
///
/// Starting from every corner held by Max: the corner, the contiguous run
/// along its border row and the run along its border column are stable. Each
/// following row inward counts a run from the border column that can be no
/// longer than the previous row's run. A run of 1 stops the propagation.
pub fn stable_disc_count(board: &Board) -> usize {
    let (w, h) = (board.width, board.height);
    if w == 0 || h == 0 {
        return 0;
    }

    let mut stable = vec![false; w * h];
    let corners = [
        (0, 0, 1, 1),
        (w - 1, 0, -1, 1),
        (0, h - 1, 1, -1),
        (w - 1, h - 1, -1, -1),
    ];

    for (cx, cy, dx, dy) in corners {
        if board.get(cx, cy) != Cell::Max {
            continue;
        }
        let cell = |step_x: usize, step_y: usize| {
            let x = cx as i32 + dx * step_x as i32;
            let y = cy as i32 + dy * step_y as i32;
            (x as usize, y as usize)
        };

        let row_run = (0..w)
            .take_while(|&i| {
                let (x, y) = cell(i, 0);
                board.get(x, y) == Cell::Max
            })
            .count();
        let col_run = (0..h)
            .take_while(|&j| {
                let (x, y) = cell(0, j);
                board.get(x, y) == Cell::Max
            })
            .count();

        for i in 0..row_run {
            let (x, y) = cell(i, 0);
            stable[y * w + x] = true;
        }
        for j in 0..col_run {
            let (x, y) = cell(0, j);
            stable[y * w + x] = true;
        }

        let mut last_run = row_run;
        let mut row = 1;
        while row < col_run && last_run > 1 {
            // The border cell of this row is already part of the column run.
            let mut run = 1;
            while run < last_run {
                let (x, y) = cell(run, row);
                if board.get(x, y) != Cell::Max {
                    break;
                }
                stable[y * w + x] = true;
                run += 1;
            }
            last_run = run;
            row += 1;
        }
    }

    stable.into_iter().filter(|&s| s).count()
}

/// `Evaluator` wrapper around the dynamic heuristic.
pub struct DynamicEvaluator {
    params: Arc<EvalParams>,
}

impl DynamicEvaluator {
    pub fn new(params: Arc<EvalParams>) -> Self {
        Self { params }
    }
}

impl Evaluator for DynamicEvaluator {
    fn evaluate(&mut self, board: &Board) -> i32 {
        evaluate(board, &self.params)
    }

    fn name(&self) -> &str {
        "dynamic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::setup_from_strings;
    use crate::eval::FINAL_SCORE_OFFSET;

    fn board(rows: &[&str]) -> Board {
        setup_from_strings(rows).unwrap()
    }

    #[test]
    fn test_terminal_board_scores_disc_differential() {
        // Full board, nobody can move.
        let b = board(&["XXXX", "XXXX", "XOOO", "OOOO"]);
        assert_eq!(evaluate(&b, &EvalParams::default()), 2 + FINAL_SCORE_OFFSET);

        let b = board(&["OOOO", "OOOO", "OXXX", "XXXX"]);
        assert_eq!(evaluate(&b, &EvalParams::default()), -2 - FINAL_SCORE_OFFSET);
    }

    #[test]
    fn test_terminal_draw_is_zero() {
        let b = board(&["XXXX", "XXXX", "OOOO", "OOOO"]);
        assert_eq!(evaluate(&b, &EvalParams::default()), 0);
    }

    #[test]
    fn test_opening_is_balanced() {
        let b = crate::core::standard_setup(8, 8);
        // Equal discs, equal mobility, no stable discs.
        assert_eq!(evaluate(&b, &EvalParams::default()), 0);
    }

    #[test]
    fn test_stable_corner_block() {
        let b = board(&[
            "XXX.....", //
            "XX......", //
            "X.......", //
            "........", //
            "........", //
            "........", //
            "........", //
            "........",
        ]);
        assert_eq!(stable_disc_count(&b), 6);
    }

    #[test]
    fn test_row_run_is_capped_by_previous_row() {
        let b = board(&[
            "XX......", //
            "XXXX....", //
            "X.......", //
            "........", //
            "........", //
            "........", //
            "........", //
            "........",
        ]);
        // Row 0: 2, column: 3, row 1 capped at 2 -> (0,1),(1,1). Row 2 stops at the gap.
        assert_eq!(stable_disc_count(&b), 5);
    }

    #[test]
    fn test_non_corner_discs_are_not_stable() {
        let b = board(&["....", ".XX.", ".XX.", "...."]);
        assert_eq!(stable_disc_count(&b), 0);
    }

    #[test]
    fn test_stability_counts_each_disc_once() {
        let b = board(&["XXXX", "....", "....", "...."]);
        // Both top corners walk the same border row.
        assert_eq!(stable_disc_count(&b), 4);
    }

    #[test]
    fn test_weights_scale_signals() {
        let b = board(&[
            "X.......", //
            "........", //
            "..OOO...", //
            "...XO...", //
            "...XX...", //
            "........", //
            "........", //
            "........",
        ]);
        let only_parity = EvalParams {
            parity_weight: 1.0,
            mobility_weight: 0.0,
            stability_weight: 0.0,
            ..EvalParams::default()
        };
        // 4 Max discs vs 4 Min discs.
        assert_eq!(evaluate(&b, &only_parity), 0);

        let only_stability = EvalParams {
            parity_weight: 0.0,
            mobility_weight: 0.0,
            stability_weight: 1.0,
            ..EvalParams::default()
        };
        // Only Max holds a corner.
        assert_eq!(evaluate(&b, &only_stability), 100);
    }
}
