use std::io;
use std::io::Write;

use crossterm::cursor;
use crossterm::queue;
use crossterm::style;
use crossterm::terminal;

use crate::compositor::Frame;
use crate::config::Display;
use crate::simulation::RunMode;

/// Upper half block. Its foreground paints the top pixel, its background the bottom one.
const HALF_BLOCK: char = '\u{2580}';

/// Canvas pixels covered by one terminal character `(across, down)`.
///
/// Block frames put two pixels in a character, one above the other. The braille view puts 2x4
/// cells in a character, so its pixels are whole cells.
pub fn pixels_per_char(display: Display, cell_size: usize) -> (f64, f64) {
    match display {
        Display::Blocks => (1f64, 2f64),
        Display::Braille => (2f64 * cell_size as f64, 4f64 * cell_size as f64),
    }
}

/// Canvas pixel under the terminal character at `(column, row)`.
pub fn pointer_position(display: Display, cell_size: usize, column: u16, row: u16) -> (f64, f64) {
    let (px, py) = pixels_per_char(display, cell_size);

    (column as f64 * px, row as f64 * py)
}

/// Width in canvas pixels of a terminal `cols` characters wide.
pub fn viewport_width(display: Display, cell_size: usize, cols: u16) -> f64 {
    cols as f64 * pixels_per_char(display, cell_size).0
}

fn rgb(px: [u8; 4]) -> style::Color {
    style::Color::Rgb {
        r: px[0],
        g: px[1],
        b: px[2],
    }
}

/// Draw `frame` from the top left corner, clipped to `cols` by `rows` characters.
pub fn draw_frame<W: Write>(out: &mut W, frame: &Frame, cols: u16, rows: u16) -> io::Result<()> {
    let width = frame.width().min(cols as usize);
    let lines = frame.height().div_ceil(2).min(rows as usize);

    for line in 0..lines {
        queue!(out, cursor::MoveTo(0, line as u16))?;

        // only emit colors when they change
        let mut current: Option<([u8; 4], [u8; 4])> = None;

        for x in 0..width {
            let top = frame.pixel(x, 2 * line).unwrap_or([0, 0, 0, 255]);
            let bottom = frame.pixel(x, 2 * line + 1).unwrap_or([0, 0, 0, 255]);

            if current != Some((top, bottom)) {
                queue!(
                    out,
                    style::SetForegroundColor(rgb(top)),
                    style::SetBackgroundColor(rgb(bottom))
                )?;
                current = Some((top, bottom));
            }

            queue!(out, style::Print(HALF_BLOCK))?;
        }

        queue!(out, style::ResetColor)?;
    }

    Ok(())
}

/// Draw the lines of a braille view from the top left corner, clipped to `rows` lines.
pub fn draw_text<W: Write>(out: &mut W, text: &str, rows: u16) -> io::Result<()> {
    for (i, line) in text.lines().take(rows as usize).enumerate() {
        queue!(out, cursor::MoveTo(0, i as u16), style::Print(line))?;
    }

    Ok(())
}

/// What the status line reports.
pub struct Status {
    pub generation: u64,
    pub rate: f64,
    pub mode: RunMode,
    pub population: usize,

    /// Cells changed by the last tick
    pub changed: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Status {
    pub fn line(&self) -> String {
        let mode = match self.mode {
            RunMode::Idle => "paused",
            RunMode::Running => "running",
            RunMode::Paint => "paint",
        };

        format!(
            "gen {} | {:.0}/s | {} | {} alive | {} changed | {}x{} | space p r c n g +/- q",
            self.generation,
            self.rate,
            mode,
            self.population,
            self.changed,
            self.cols,
            self.rows
        )
    }
}

/// Overwrite terminal line `row` with the status.
pub fn draw_status<W: Write>(out: &mut W, status: &Status, row: u16) -> io::Result<()> {
    queue!(
        out,
        cursor::MoveTo(0, row),
        terminal::Clear(terminal::ClearType::CurrentLine),
        style::Print(status.line())
    )
}
