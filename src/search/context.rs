use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cooperative stop signal shared by the coordinator and its workers.
///
/// Search only looks at it when a node is about to expand.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters of one search (or one worker job).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub boards_evaluated: u64,
    pub nodes_pruned: u64,
    /// Estimate of the max-depth nodes skipped by cutoffs.
    pub est_max_depth_pruned: u64,
    pub max_depth_reached: u32,
    /// False as soon as any depth, time or board cutoff happened.
    pub entire_space_covered: bool,
}

impl Default for SearchStats {
    fn default() -> Self {
        SearchStats {
            boards_evaluated: 0,
            nodes_pruned: 0,
            est_max_depth_pruned: 0,
            max_depth_reached: 0,
            entire_space_covered: true,
        }
    }
}

impl SearchStats {
    /// Fold the counters of another search into these.
    pub fn merge(&mut self, other: &SearchStats) {
        self.boards_evaluated += other.boards_evaluated;
        self.nodes_pruned += other.nodes_pruned;
        self.est_max_depth_pruned = self
            .est_max_depth_pruned
            .saturating_add(other.est_max_depth_pruned);
        self.max_depth_reached = self.max_depth_reached.max(other.max_depth_reached);
        self.entire_space_covered &= other.entire_space_covered;
    }
}

/// Per-run search state passed down the whole call chain.
#[derive(Debug, Clone)]
pub struct SearchContext {
    pub stats: SearchStats,
    started: Instant,
    timeout: Duration,
    cancel: CancellationToken,
    /// Remaining depth at the node the current search started from.
    root_depth: u32,
    /// Depth of that node below the real game root (non-zero on workers).
    depth_offset: u32,
}

impl SearchContext {
    pub fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        SearchContext {
            stats: SearchStats::default(),
            started: Instant::now(),
            timeout,
            cancel,
            root_depth: 0,
            depth_offset: 0,
        }
    }

    /// Fresh counters and a fresh clock.
    pub fn restart(&mut self) {
        self.started = Instant::now();
        self.reset_stats();
    }

    /// Fresh counters; the clock keeps running.
    pub fn reset_stats(&mut self) {
        self.stats = SearchStats::default();
    }

    pub(crate) fn set_root(&mut self, root_depth: u32, depth_offset: u32) {
        self.root_depth = root_depth;
        self.depth_offset = depth_offset;
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn out_of_time(&self) -> bool {
        self.cancel.is_cancelled() || self.started.elapsed() > self.timeout
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub(crate) fn note_depth(&mut self, remaining: u32) {
        let reached = self.depth_offset + self.root_depth.saturating_sub(remaining);
        self.stats.max_depth_reached = self.stats.max_depth_reached.max(reached);
    }

    /// `skipped` siblings were cut off at a node with `remaining` plies left.
    pub(crate) fn record_prune(&mut self, skipped: usize, remaining: u32, branch_factor: u32) {
        let skipped = skipped as u64;
        let below = (branch_factor as u64).saturating_pow(remaining.saturating_sub(1));
        self.stats.nodes_pruned += skipped;
        self.stats.est_max_depth_pruned = self
            .stats
            .est_max_depth_pruned
            .saturating_add(skipped.saturating_mul(below));
    }

    pub(crate) fn mark_approximate(&mut self) {
        self.stats.entire_space_covered = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_counts_as_timeout() {
        let token = CancellationToken::new();
        let ctx = SearchContext::new(Duration::from_secs(3600), token.clone());
        assert!(!ctx.out_of_time());
        token.cancel();
        assert!(ctx.out_of_time());
    }

    #[test]
    fn test_prune_estimate_uses_branch_factor() {
        let mut ctx = SearchContext::new(Duration::from_secs(1), CancellationToken::new());
        ctx.record_prune(3, 3, 7);
        assert_eq!(ctx.stats.nodes_pruned, 3);
        assert_eq!(ctx.stats.est_max_depth_pruned, 3 * 49);
    }

    #[test]
    fn test_depth_includes_offset() {
        let mut ctx = SearchContext::new(Duration::from_secs(1), CancellationToken::new());
        ctx.set_root(4, 2);
        ctx.note_depth(1);
        assert_eq!(ctx.stats.max_depth_reached, 5);
    }
}
