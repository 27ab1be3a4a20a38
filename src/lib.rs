//! Best-move search for Reversi-style disc-flipping games.
//!
//! The `engine` module is the entry point. It runs a sequential alpha-beta
//! search, splits the tree across worker threads, or scatters the static
//! evaluation across them, depending on `EvalParams` and the worker count.

pub mod cluster;
pub mod config;
pub mod core;
pub mod engine;
pub mod eval;
pub mod logic;
pub mod search;
pub mod stats;


pub use config::EvalParams;
pub use engine::{Engine, Mode, SearchOutcome};
