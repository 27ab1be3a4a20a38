use crate::core::{Board, Move, ScoredMove, Side};
use crate::logic::{apply_move, legal_moves};
use crate::search::INFINITY;
use std::collections::VecDeque;

/// One position of the partitioned tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchNode {
    pub board: Board,
    /// `None` only for the root.
    pub parent: Option<usize>,
    /// Best root-relative score seen so far.
    pub best: i32,
    /// Move that led here from the parent.
    pub mv: Option<Move>,
    pub side: Side,
    /// Plies below the root.
    pub depth: u32,
}

/// Flat arena of the upper part of the game tree. Parents always come before
/// their children.
#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    pub fn new(root: Board, side: Side) -> Self {
        Self {
            nodes: vec![SearchNode {
                board: root,
                parent: None,
                best: -INFINITY,
                mv: None,
                side,
                depth: 0,
            }],
        }
    }

    pub fn nodes(&self) -> &[SearchNode] {
        &self.nodes
    }

    pub fn node(&self, id: usize) -> Option<&SearchNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn expand(&mut self, id: usize, moves: Vec<Move>, queue: &mut VecDeque<usize>) {
        let side = self.nodes[id].side;
        let depth = self.nodes[id].depth + 1;
        for mv in moves {
            let board = apply_move(&self.nodes[id].board, &mv, side);
            self.nodes.push(SearchNode {
                board,
                parent: Some(id),
                best: -INFINITY,
                mv: Some(mv),
                side: side.opponent(),
                depth,
            });
            queue.push_back(self.nodes.len() - 1);
        }
    }

    /// Breadth-first expansion until the frontier holds `target` nodes or
    /// nothing more can be expanded. Returns the frontier in job order, empty
    /// when the root has no move.
    ///
    /// The root is always expanded. Below it no node at `max_depth` or deeper
    /// is expanded, so every job keeps `depth <= max_depth` (the root's
    /// children excepted when `max_depth` is 0). Nodes that cannot be
    /// expanded, for lack of depth or of a move, go to the back of the queue;
    /// once twice the frontier has been deferred in a row, expansion stops.
    pub fn partition(&mut self, target: usize, max_depth: u32) -> Vec<usize> {
        let root = &self.nodes[0];
        let root_moves = legal_moves(&root.board, root.side);
        if root_moves.is_empty() {
            return Vec::new();
        }

        let mut queue = VecDeque::new();
        self.expand(0, root_moves, &mut queue);

        let mut deferred = 0;
        while queue.len() < target {
            let Some(id) = queue.pop_front() else { break };
            let node = &self.nodes[id];
            let moves = if node.depth < max_depth {
                legal_moves(&node.board, node.side)
            } else {
                Vec::new()
            };
            if moves.is_empty() {
                queue.push_back(id);
                deferred += 1;
                if deferred >= 2 * queue.len() {
                    break;
                }
                continue;
            }
            deferred = 0;
            self.expand(id, moves, &mut queue);
        }

        log::debug!(
            "partitioned into {} jobs over {} nodes (target {})",
            queue.len(),
            self.nodes.len(),
            target
        );
        queue.into()
    }

    /// Keep the best score reported for `id`.
    pub fn record(&mut self, id: usize, score: i32) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.best = node.best.max(score);
        }
    }

    /// Fold every node into its parent, last-created first.
    pub fn propagate(&mut self) {
        for id in (1..self.nodes.len()).rev() {
            if let Some(parent) = self.nodes[id].parent {
                let best = self.nodes[id].best;
                let p = &mut self.nodes[parent];
                p.best = p.best.max(best);
            }
        }
    }

    /// Root moves by descending score. Ties keep generation order.
    pub fn ranking(&self) -> Vec<ScoredMove> {
        let mut ranked: Vec<ScoredMove> = self
            .nodes
            .iter()
            .filter(|n| n.parent == Some(0))
            .filter_map(|n| n.mv.map(|mv| ScoredMove { mv, score: n.best }))
            .collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }
}
