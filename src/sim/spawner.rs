//! Target/hazard spawner
//!
//! Idle until started, then Active with exactly one repeating timer at the
//! current level's interval. Each tick replaces the grid.

use std::time::Duration;

use rand::{Rng, RngCore};

use super::difficulty::Level;
use super::grid::GridState;
use crate::scheduler::{Scheduler, TimerHandle};

/// Source of uniformly random cell indices
pub trait CellSource {
    /// Uniform index in `[0, n)`. `n` is never zero.
    fn pick(&mut self, n: usize) -> usize;
}

impl<R: RngCore> CellSource for R {
    fn pick(&mut self, n: usize) -> usize {
        self.random_range(0..n)
    }
}

/// Spawner lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnerState {
    Idle,
    Active { timer: TimerHandle, interval: Duration },
}

pub struct Spawner<R> {
    cells: R,
    grid: GridState,
    state: SpawnerState,
}

impl<R: CellSource> Spawner<R> {
    /// Idle spawner over an all-clear grid of `n` cells
    pub fn new(n: usize, cells: R) -> Self {
        Self {
            cells,
            grid: GridState::all_clear(n),
            state: SpawnerState::Idle,
        }
    }

    pub fn state(&self) -> SpawnerState {
        self.state
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    /// Timer currently driving this spawner
    pub fn timer(&self) -> Option<TimerHandle> {
        match self.state {
            SpawnerState::Active { timer, .. } => Some(timer),
            SpawnerState::Idle => None,
        }
    }

    /// Enter Active at `level`'s interval. An outstanding timer is
    /// cancelled and replaced, so a level change takes effect immediately.
    pub fn start(&mut self, scheduler: &mut impl Scheduler, level: Level) {
        self.stop(scheduler);
        let interval = level.interval();
        let timer = scheduler.schedule_repeating(interval);
        self.state = SpawnerState::Active { timer, interval };
    }

    /// Re-arm at `level`'s interval if Active and the interval differs
    pub fn retime(&mut self, scheduler: &mut impl Scheduler, level: Level) {
        if let SpawnerState::Active { interval, .. } = self.state {
            if interval != level.interval() {
                log::debug!("Spawner retimed to {:?} (level {})", level.interval(), level);
                self.start(scheduler, level);
            }
        }
    }

    /// Return to Idle, cancelling the pending timer
    pub fn stop(&mut self, scheduler: &mut impl Scheduler) {
        if let SpawnerState::Active { timer, .. } = self.state {
            scheduler.cancel(timer);
        }
        self.state = SpawnerState::Idle;
    }

    /// Replace the grid with an all-clear one
    pub fn reset(&mut self) {
        self.grid = GridState::all_clear(self.grid.len());
    }

    /// Draw a new target, plus a distinct hazard from `HAZARD_LEVEL` on
    pub fn spawn(&mut self, level: Level) -> &GridState {
        let n = self.grid.len();
        if n == 0 {
            return &self.grid;
        }
        let target = self.cells.pick(n);
        let mut grid = GridState::with_target(n, target);

        if level.has_hazard() && n > 1 {
            let hazard = loop {
                let candidate = self.cells.pick(n);
                if candidate != target {
                    break candidate;
                }
            };
            if let Some(with_hazard) = grid.with_hazard(hazard) {
                grid = with_hazard;
            }
        }

        self.grid = grid;
        &self.grid
    }

    /// Remove whatever is showing at `index`
    pub fn clear_cell(&mut self, index: usize) {
        self.grid = self.grid.cleared(index);
    }
}
