//! Frame differencing between consecutive cell grids.

use std::num::NonZeroU32;

use crate::color::DistanceMetric;
use crate::grid::{Cell, Grid};

/// The cells that changed enough to be redrawn, in row-major order.
///
/// A cell absent from the delta is unchanged in the renderer's state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellDelta {
    cells: Vec<Cell>,
    full: bool,
}

impl CellDelta {
    pub fn new(cells: Vec<Cell>, full: bool) -> Self {
        Self { cells, full }
    }

    /// Every cell of the grid, as a full redraw.
    pub fn full(grid: &Grid) -> Self {
        Self::new(grid.cells().to_vec(), true)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// True when this delta covers the whole grid.
    pub fn is_full(&self) -> bool {
        self.full
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Compares each new grid against the last one it saw.
#[derive(Debug, Clone)]
pub struct FrameDiffer {
    previous: Option<Grid>,
    threshold: f64,
    metric: DistanceMetric,
    keyframe_interval: Option<NonZeroU32>,
    differential: bool,
    compared: u64,
}

impl FrameDiffer {
    pub fn new(threshold: f64, metric: DistanceMetric) -> Self {
        Self {
            previous: None,
            threshold,
            metric,
            keyframe_interval: None,
            differential: true,
            compared: 0,
        }
    }

    /// Force a full delta every `interval` grids.
    pub fn with_keyframe_interval(mut self, interval: Option<NonZeroU32>) -> Self {
        self.keyframe_interval = interval;
        self
    }

    /// When disabled, every grid yields a full delta.
    pub fn with_differential(mut self, differential: bool) -> Self {
        self.differential = differential;
        self
    }

    /// Diff `current` against the previous grid, then make it the previous grid.
    pub fn diff(&mut self, current: Grid) -> CellDelta {
        let index = self.compared;
        self.compared += 1;

        let keyframe = self
            .keyframe_interval
            .is_some_and(|n| index % u64::from(n.get()) == 0);

        let delta = match self.previous.as_ref() {
            Some(previous)
                if self.differential && !keyframe && previous.size() == current.size() =>
            {
                let cells = previous
                    .cells()
                    .iter()
                    .zip(current.cells())
                    .filter(|(old, new)| self.cell_distance(old, new) > self.threshold)
                    .map(|(_, new)| *new)
                    .collect();
                CellDelta::new(cells, false)
            }
            _ => CellDelta::full(&current),
        };

        self.previous = Some(current);
        delta
    }

    /// Distance between two cells as seen on screen: the larger of the
    /// top-half and bottom-half color distances.
    pub fn cell_distance(&self, old: &Cell, new: &Cell) -> f64 {
        let (old_top, old_bottom) = old.style().visible_halves();
        let (new_top, new_bottom) = new.style().visible_halves();
        self.metric
            .distance(old_top, new_top)
            .max(self.metric.distance(old_bottom, new_bottom))
    }

    /// Forget the previous grid so the next diff is full.
    pub fn reset(&mut self) {
        self.previous = None;
        self.compared = 0;
    }
}
