//! Sequential game-tree search.
//!
//! `Searcher` runs negamax with optional alpha-beta pruning and move
//! ordering. Every counter, the clock and the cancel flag live in a
//! `SearchContext` that the caller owns and passes down explicitly, so
//! several searchers can run side by side without sharing state.

pub mod alpha_beta;
pub mod context;

pub use alpha_beta::{Searcher, INFINITY};
pub use context::{CancellationToken, SearchContext, SearchStats};
