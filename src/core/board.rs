use super::types::Cell;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 盤面
///
/// Cells are stored row-major: the cell at column `x`, row `y` lives at
/// `y * width + x`. Dimensions never change after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    pub width: usize,
    pub height: usize,
    cells: Vec<Cell>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        Board {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    /// Builds a board from already laid-out cells. Returns `None` when the
    /// cell count does not match the dimensions.
    pub fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Option<Self> {
        if cells.len() != width * height {
            return None;
        }
        Some(Board {
            width,
            height,
            cells,
        })
    }

    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.cells[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        self.cells[y * self.width + x] = cell;
    }

    /// Signed-coordinate lookup used by the directional scans.
    pub fn at(&self, x: i32, y: i32) -> Option<Cell> {
        if self.in_bounds(x, y) {
            Some(self.get(x as usize, y as usize))
        } else {
            None
        }
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn map_cells(&self, f: impl Fn(Cell) -> Cell) -> Board {
        Board {
            width: self.width,
            height: self.height,
            cells: self.cells.iter().map(|&c| f(c)).collect(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&c| c != Cell::Empty)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "  ")?;
        for x in 0..self.width {
            let label = u8::try_from(x)
                .ok()
                .filter(|&x| x < 26)
                .map_or('?', |x| char::from(b'a' + x));
            write!(f, " {}", label)?;
        }
        writeln!(f)?;
        for y in 0..self.height {
            write!(f, "{:>2}", y + 1)?;
            for x in 0..self.width {
                write!(f, " {}", self.get(x, y))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
