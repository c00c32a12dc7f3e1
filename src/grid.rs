use rand::Rng;
use tracing::debug;
use tracing::warn;

use crate::step;

/// Number of Moore neighbors of every cell.
pub const NEIGHBORS: usize = 8;

/// A dead cell. Cells are stored as bytes so that a neighbor count is a plain sum.
pub const DEAD: u8 = 0;

/// A live cell.
pub const ALIVE: u8 = 1;

/// Toroidal cell store.
///
/// Cells live in two row-major buffers of identical length, `current` and `next`. A generation
/// is computed from `current` into `next`, after which the two swap owners. The neighbor table
/// holds, for every cell index `i`, the indices of its eight wrapped neighbors at
/// `neighbors[i * 8..i * 8 + 8]`.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,

    current: Vec<u8>,
    next: Vec<u8>,

    neighbors: Vec<usize>,
}

impl Grid {
    /// Create an empty grid. A zero dimension yields an empty 0x0 grid, which can later be given
    /// a size with [`Grid::resize`].
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut grid = Self {
            rows: 0,
            cols: 0,
            current: Vec::new(),
            next: Vec::new(),
            neighbors: Vec::new(),
        };

        grid.resize(rows, cols);
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// The current generation, row-major.
    pub fn cells(&self) -> &[u8] {
        &self.current
    }

    pub fn neighbor_table(&self) -> &[usize] {
        &self.neighbors
    }

    /// Reallocate both buffers, cleared to dead, and rebuild the neighbor table.
    ///
    /// Returns `false` and leaves the grid untouched if either dimension is zero, or if the
    /// neighbor table for `rows * cols` cells would not be addressable.
    pub fn resize(&mut self, rows: usize, cols: usize) -> bool {
        if rows == 0 || cols == 0 {
            if self.rows != 0 || self.cols != 0 {
                warn!(rows, cols, "ignoring resize to an empty grid");
            }

            return false;
        }

        let Some(n) = rows
            .checked_mul(cols)
            .filter(|n| n.checked_mul(NEIGHBORS).is_some())
        else {
            warn!(rows, cols, "ignoring resize to an oversized grid");
            return false;
        };

        self.rows = rows;
        self.cols = cols;
        self.current = vec![DEAD; n];
        self.next = vec![DEAD; n];
        self.neighbors = Self::build_neighbors(rows, cols);

        debug!(rows, cols, "grid reallocated");

        true
    }

    /// Set every cell alive with probability one half.
    pub fn randomize(&mut self) {
        self.randomize_with(&mut rand::thread_rng());
    }

    pub fn randomize_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for cell in self.current.iter_mut() {
            *cell = if rng.gen_bool(0.5) { ALIVE } else { DEAD };
        }
    }

    /// Kill every cell.
    pub fn clear(&mut self) {
        self.current.fill(DEAD);
    }

    /// State of the cell at `(row, col)`, or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        self.index(row, col).map(|i| self.current[i] == ALIVE)
    }

    /// Set the cell at `(row, col)`. Ignored outside the grid.
    pub fn set(&mut self, row: usize, col: usize, alive: bool) {
        if let Some(i) = self.index(row, col) {
            self.current[i] = if alive { ALIVE } else { DEAD };
        }
    }

    /// Flip the cell at `(row, col)` and return its new state, or `None` outside the grid.
    pub fn toggle(&mut self, row: usize, col: usize) -> Option<bool> {
        let i = self.index(row, col)?;
        self.current[i] ^= ALIVE;

        Some(self.current[i] == ALIVE)
    }

    /// Number of live cells in the current generation
    pub fn population(&self) -> usize {
        self.current.iter().filter(|&&c| c == ALIVE).count()
    }

    /// Advance one generation and swap buffers. Returns the number of cells that changed state.
    pub fn step(&mut self) -> usize {
        let changed = step::step(&self.current, &mut self.next, &self.neighbors);
        std::mem::swap(&mut self.current, &mut self.next);

        changed
    }

    /// Row-major index of `(row, col)`, if it lies inside the grid.
    pub fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.rows && col < self.cols {
            Some(row * self.cols + col)
        } else {
            None
        }
    }

    fn build_neighbors(rows: usize, cols: usize) -> Vec<usize> {
        let mut table = Vec::with_capacity(rows * cols * NEIGHBORS);

        for r in 0..rows {
            // adding `rows - 1` instead of subtracting 1 keeps everything unsigned
            let up = (r + rows - 1) % rows;
            let down = (r + 1) % rows;

            for c in 0..cols {
                let left = (c + cols - 1) % cols;
                let right = (c + 1) % cols;

                table.extend_from_slice(&[
                    up * cols + left,
                    up * cols + c,
                    up * cols + right,
                    r * cols + left,
                    r * cols + right,
                    down * cols + left,
                    down * cols + c,
                    down * cols + right,
                ]);
            }
        }

        table
    }
}
