use crate::simulation::Command;

pub enum Event {
    /// Forward a command to the simulation
    Command(Command),

    Pointer(PointerEvent),

    /// The terminal is now `cols` by `rows` characters
    Viewport { cols: u16, rows: u16 },

    /// Exit the application
    Exit,
}

/// Pointer gestures, in terminal character coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Press { column: u16, row: u16 },
    Drag { column: u16, row: u16 },
    Release { column: u16, row: u16 },
    Click { column: u16, row: u16 },
}

impl PointerEvent {
    /// Terminal `(column, row)` the gesture happened at.
    pub fn position(&self) -> (u16, u16) {
        match *self {
            Self::Press { column, row }
            | Self::Drag { column, row }
            | Self::Release { column, row }
            | Self::Click { column, row } => (column, row),
        }
    }
}
