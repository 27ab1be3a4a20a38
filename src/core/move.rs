use serde::{Deserialize, Serialize};
use std::fmt;

/// A disc placement at column `x`, row `y` (0-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub x: usize,
    pub y: usize,
}

impl Move {
    pub fn new(x: usize, y: usize) -> Self {
        Move { x, y }
    }
}

/// Algebraic notation: column letter followed by the 1-based row, e.g. `d3`.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match u8::try_from(self.x).ok().filter(|&x| x < 26) {
            Some(x) => write!(f, "{}{}", char::from(b'a' + x), self.y + 1),
            None => write!(f, "({},{})", self.x + 1, self.y + 1),
        }
    }
}

/// A move together with the score the search assigned to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: i32,
}

impl fmt::Display for ScoredMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.mv, self.score)
    }
}
