use tracing::debug;

use crate::events::PointerEvent;
use crate::simulation::Command;
use crate::simulation::RunMode;

/// Height to width ratio of a relaid-out grid.
pub const ASPECT: (usize, usize) = (9, 16);

/// Share of the viewport width a relaid-out grid covers.
pub const DEFAULT_DENSITY: f64 = 0.8;

/// Map a pointer position, relative to the canvas's top left corner, to `(row, col)`.
///
/// Positions outside the grid are rejected; pointer input never wraps.
pub fn cell_at(x: f64, y: f64, cell_size: f64, rows: usize, cols: usize) -> Option<(usize, usize)> {
    if !(cell_size > 0f64) {
        return None;
    }

    let col = (x / cell_size).floor();
    let row = (y / cell_size).floor();

    // NaN fails both comparisons
    if !(col >= 0f64 && row >= 0f64) {
        return None;
    }

    let (row, col) = (row as usize, col as usize);

    if row < rows && col < cols {
        Some((row, col))
    } else {
        None
    }
}

/// Grid dimensions `(rows, cols)` for a viewport `width` pixels wide.
///
/// The grid spans `density` of the width and keeps a 9:16 aspect ratio, whatever the viewport's
/// height.
pub fn relayout(width: f64, cell_size: usize, density: f64) -> (usize, usize) {
    let cell_size = cell_size.max(1) as f64;
    let cols = (width / cell_size * density).floor();
    let cols = if cols.is_finite() && cols > 0f64 { cols as usize } else { 0 };

    let rows = cols * ASPECT.0 / ASPECT.1;

    debug!(width, cols, rows, "relayout");

    (rows, cols)
}

/// Turns pointer gestures into cell commands.
///
/// A press paints the cell under the pointer alive and a drag paints every newly entered cell.
/// The release commits the last touched cell once more before the stroke ends, even if the
/// pointer never moved. A click toggles a single cell.
#[derive(Debug, Clone)]
pub struct Painter {
    cell_size: f64,

    pressed: bool,

    /// Last cell painted during the current stroke
    last: Option<(usize, usize)>,
}

impl Painter {
    pub fn new(cell_size: usize) -> Self {
        Self {
            cell_size: cell_size.max(1) as f64,
            pressed: false,
            last: None,
        }
    }

    /// Turn a pointer gesture at canvas position `(x, y)` into a command. Outside paint mode
    /// gestures are dropped and any stroke in progress is abandoned.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        (x, y): (f64, f64),
        mode: RunMode,
        rows: usize,
        cols: usize,
    ) -> Option<Command> {
        if mode != RunMode::Paint {
            self.cancel();
            return None;
        }

        match event {
            PointerEvent::Press { .. } => self.press(x, y, rows, cols),
            PointerEvent::Drag { .. } => self.drag(x, y, rows, cols),
            PointerEvent::Release { .. } => self.release(),
            PointerEvent::Click { .. } => self.click(x, y, rows, cols),
        }
    }

    pub fn press(&mut self, x: f64, y: f64, rows: usize, cols: usize) -> Option<Command> {
        self.pressed = true;
        self.last = None;

        let (row, col) = cell_at(x, y, self.cell_size, rows, cols)?;
        self.last = Some((row, col));

        Some(Command::PaintCell {
            row,
            col,
            alive: true,
        })
    }

    pub fn drag(&mut self, x: f64, y: f64, rows: usize, cols: usize) -> Option<Command> {
        if !self.pressed {
            return None;
        }

        let cell = cell_at(x, y, self.cell_size, rows, cols)?;

        if self.last == Some(cell) {
            return None;
        }

        self.last = Some(cell);

        Some(Command::PaintCell {
            row: cell.0,
            col: cell.1,
            alive: true,
        })
    }

    /// End the stroke, committing the last touched cell.
    pub fn release(&mut self) -> Option<Command> {
        let was_pressed = std::mem::replace(&mut self.pressed, false);
        let last = self.last.take();

        if !was_pressed {
            return None;
        }

        let (row, col) = last?;

        Some(Command::PaintCell {
            row,
            col,
            alive: true,
        })
    }

    /// End the stroke without committing anything.
    pub fn cancel(&mut self) {
        self.pressed = false;
        self.last = None;
    }

    pub fn click(&self, x: f64, y: f64, rows: usize, cols: usize) -> Option<Command> {
        let (row, col) = cell_at(x, y, self.cell_size, rows, cols)?;

        Some(Command::ToggleCell { row, col })
    }
}
