use super::context::SearchContext;
use crate::config::EvalParams;
use crate::core::{Board, Move, ScoredMove, Side};
use crate::eval::{DynamicEvaluator, Evaluator, StaticEvaluator, WeightTable};
use crate::logic::{apply_move, has_moves, legal_moves};
use std::sync::Arc;

/// Search window bound. Leaf scores are clamped inside it so negation never
/// overflows.
pub const INFINITY: i32 = i32::MAX;

/// Depth-bounded negamax with alpha-beta pruning.
///
/// Scores returned by `negamax` are from the perspective of the side to move;
/// the evaluator always scores for Max, so leaves multiply by `side.sign()`.
pub struct Searcher {
    params: Arc<EvalParams>,
    evaluator: Box<dyn Evaluator>,
}

impl Searcher {
    pub fn new(params: Arc<EvalParams>, evaluator: Box<dyn Evaluator>) -> Self {
        Self { params, evaluator }
    }

    /// Searcher with the single-participant evaluator `params` selects.
    pub fn for_board(params: Arc<EvalParams>, board: &Board) -> Self {
        let evaluator: Box<dyn Evaluator> = if params.use_static_evaluation {
            let table = WeightTable::new(&params, board.width, board.height);
            Box::new(StaticEvaluator::new(Arc::new(table)))
        } else {
            Box::new(DynamicEvaluator::new(Arc::clone(&params)))
        };
        Self::new(params, evaluator)
    }

    pub fn params(&self) -> &EvalParams {
        &self.params
    }

    pub fn evaluator_mut(&mut self) -> &mut dyn Evaluator {
        self.evaluator.as_mut()
    }

    /// Best move for Max, or `None` when Max has no legal move.
    pub fn search(&mut self, board: &Board, ctx: &mut SearchContext) -> Option<Move> {
        self.search_ranked(board, ctx).first().map(|s| s.mv)
    }

    /// Like `search`, but returns every root move of Max, best first.
    pub fn search_ranked(&mut self, board: &Board, ctx: &mut SearchContext) -> Vec<ScoredMove> {
        ctx.restart();
        let ranked = self.tree_search(board, self.params.max_depth, false, Side::Max, ctx);
        log::debug!(
            "{} search: {} moves ranked, {} boards evaluated, depth {}",
            self.evaluator.name(),
            ranked.len(),
            ctx.stats.boards_evaluated,
            ctx.stats.max_depth_reached
        );
        ranked
    }

    /// Legal moves of `side` sorted best first, searched `depth` plies deep.
    ///
    /// Ties keep move generation order. Probes leave the counters alone.
    pub fn tree_search(
        &mut self,
        board: &Board,
        depth: u32,
        is_probe: bool,
        side: Side,
        ctx: &mut SearchContext,
    ) -> Vec<ScoredMove> {
        if !is_probe {
            ctx.set_root(depth, 0);
        }

        let mut alpha = -INFINITY;
        let beta = INFINITY;
        let mut scored = Vec::new();

        for mv in legal_moves(board, side) {
            let child = apply_move(board, &mv, side);
            let score = -self.negamax(
                &child,
                depth.saturating_sub(1),
                -beta,
                -alpha,
                side.opponent(),
                is_probe,
                ctx,
            );
            if self.params.use_pruning {
                alpha = alpha.max(score);
            }
            scored.push(ScoredMove { mv, score });
        }

        // sort_by is stable: equal scores stay in discovery order.
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored
    }

    /// Value of `board` for `side` searched `depth` plies deep, as run by a
    /// worker for one job rooted `depth_offset` plies below the game root.
    pub fn search_subtree(
        &mut self,
        board: &Board,
        depth: u32,
        depth_offset: u32,
        side: Side,
        ctx: &mut SearchContext,
    ) -> i32 {
        ctx.reset_stats();
        ctx.set_root(depth, depth_offset);
        self.negamax(board, depth, -INFINITY, INFINITY, side, false, ctx)
    }

    #[allow(clippy::too_many_arguments)]
    fn negamax(
        &mut self,
        board: &Board,
        depth: u32,
        mut alpha: i32,
        beta: i32,
        side: Side,
        is_probe: bool,
        ctx: &mut SearchContext,
    ) -> i32 {
        if !is_probe {
            ctx.note_depth(depth);
        }

        if depth == 0 || ctx.out_of_time() {
            if !is_probe {
                ctx.mark_approximate();
            }
            return self.leaf(board, side, is_probe, ctx);
        }

        let moves = if self.params.use_move_ordering && !is_probe {
            let probe_depth = self.params.move_ordering_depth;
            self.tree_search(board, probe_depth, true, side, ctx)
                .into_iter()
                .map(|s| s.mv)
                .collect()
        } else {
            legal_moves(board, side)
        };

        if moves.is_empty() {
            if !has_moves(board, side.opponent()) {
                // Game over: exact score.
                return self.leaf(board, side, is_probe, ctx);
            }
            // Pass: the opponent moves again at the same depth.
            return -self.negamax(board, depth, -beta, -alpha, side.opponent(), is_probe, ctx);
        }

        let projected = ctx.stats.boards_evaluated.saturating_add(moves.len() as u64);
        if projected > self.params.max_boards {
            if !is_probe {
                ctx.mark_approximate();
            }
            return self.leaf(board, side, is_probe, ctx);
        }

        let mut best = -INFINITY;
        for (i, mv) in moves.iter().enumerate() {
            let child = apply_move(board, mv, side);
            let (a, b) = if self.params.use_pruning {
                (alpha, beta)
            } else {
                (-INFINITY, INFINITY)
            };
            let value = -self.negamax(&child, depth - 1, -b, -a, side.opponent(), is_probe, ctx);
            best = best.max(value);

            if self.params.use_pruning {
                alpha = alpha.max(value);
                if alpha >= beta {
                    let skipped = moves.len() - i - 1;
                    if !is_probe && skipped > 0 {
                        ctx.record_prune(skipped, depth, self.params.avg_branch_factor);
                    }
                    break;
                }
            }
        }
        best
    }

    fn leaf(&mut self, board: &Board, side: Side, is_probe: bool, ctx: &mut SearchContext) -> i32 {
        if !is_probe {
            ctx.stats.boards_evaluated += 1;
        }
        let score = self
            .evaluator
            .evaluate(board)
            .clamp(-INFINITY + 1, INFINITY - 1);
        side.sign() * score
    }
}
