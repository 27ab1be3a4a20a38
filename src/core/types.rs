use serde::{Deserialize, Serialize};
use std::fmt;

/// 手番 (Max = 探索する側)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Max,
    Min,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Max => Side::Min,
            Side::Min => Side::Max,
        }
    }

    /// +1 for Max, -1 for Min. Multiplying a Max-perspective score by this
    /// gives the score from this side's perspective.
    pub fn sign(self) -> i32 {
        match self {
            Side::Max => 1,
            Side::Min => -1,
        }
    }

    pub fn disc(self) -> Cell {
        match self {
            Side::Max => Cell::Max,
            Side::Min => Cell::Min,
        }
    }
}

/// マスの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Max,
    Min,
}

impl Cell {
    /// Numeric value used by the weighted sums: Max = 1, Min = -1, Empty = 0.
    pub fn value(self) -> i32 {
        match self {
            Cell::Empty => 0,
            Cell::Max => 1,
            Cell::Min => -1,
        }
    }

    pub fn negate(self) -> Cell {
        match self {
            Cell::Empty => Cell::Empty,
            Cell::Max => Cell::Min,
            Cell::Min => Cell::Max,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let c = match self {
            Cell::Empty => '.',
            Cell::Max => 'X',
            Cell::Min => 'O',
        };
        write!(f, "{}", c)
    }
}
