pub mod board;
pub mod r#move;
pub mod setup;
pub mod types;

pub use board::Board;
pub use r#move::{Move, ScoredMove};
pub use setup::{setup_from_strings, standard_setup};
pub use types::{Cell, Side};
