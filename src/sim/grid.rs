//! Grid state values
//!
//! A grid is replaced, never edited in place: every tick builds a fresh
//! value, so at most one target and one hazard can ever be visible.

use serde::{Deserialize, Serialize};

/// One cell of the play grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub has_target: bool,
    pub has_hazard: bool,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        !self.has_target && !self.has_hazard
    }
}

/// Immutable snapshot of every cell on the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridState {
    cells: Vec<Cell>,
}

impl GridState {
    /// Grid of `n` empty cells
    pub fn all_clear(n: usize) -> Self {
        Self {
            cells: vec![Cell::default(); n],
        }
    }

    /// Grid of `n` cells with only `index` holding the target.
    /// An out-of-range index yields an all-clear grid.
    pub fn with_target(n: usize, index: usize) -> Self {
        let mut grid = Self::all_clear(n);
        if let Some(cell) = grid.cells.get_mut(index) {
            cell.has_target = true;
        }
        grid
    }

    /// Copy of `self` with `index` holding the hazard, replacing any
    /// previous hazard. Returns `None` if `index` is out of range or
    /// already holds the target.
    pub fn with_hazard(&self, index: usize) -> Option<Self> {
        if self.cells.get(index)?.has_target {
            return None;
        }
        let mut grid = self.clone();
        for cell in &mut grid.cells {
            cell.has_hazard = false;
        }
        grid.cells[index].has_hazard = true;
        Some(grid)
    }

    /// Copy of `self` with both flags removed from `index`
    pub fn cleared(&self, index: usize) -> Self {
        let mut grid = self.clone();
        if let Some(cell) = grid.cells.get_mut(index) {
            *cell = Cell::default();
        }
        grid
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Index of the target cell, if one is showing
    pub fn target(&self) -> Option<usize> {
        self.cells.iter().position(|c| c.has_target)
    }

    /// Index of the hazard cell, if one is showing
    pub fn hazard(&self) -> Option<usize> {
        self.cells.iter().position(|c| c.has_hazard)
    }

    /// Whether no cell shows anything
    pub fn is_clear(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }
}
