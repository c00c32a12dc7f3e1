use crate::grid::ALIVE;
use crate::grid::Grid;

/// Hex values of braille dots
///
/// ```text
///  1   8
///  2  10
///  4  20
/// 40  80
/// ```
///
/// Where the base blank pattern is codepoint `0x2800` (or U+2800)
///
/// To get other configurations, just add the numbers above.
const BRAILLE_EMPTY: u32 = 0x2800;

/// Monochrome text view of a [`Grid`], packing 2x4 cells into each braille character.
#[derive(Debug, Default)]
pub struct BrailleView {
    /// The frame buffer.
    fb: String,

    /// Codepoints. This allows us to construct the framebuffer more easily
    cp: Vec<u32>,
}

impl BrailleView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size in characters `(width, height)` of the view of a `rows` by `cols` grid, not counting
    /// newlines.
    pub fn size(rows: usize, cols: usize) -> (usize, usize) {
        (cols.div_ceil(2), rows.div_ceil(4))
    }

    /// Render the live cells of `grid`. Each line of the result ends with a newline.
    pub fn render(&mut self, grid: &Grid) -> &str {
        let (bw, bh) = Self::size(grid.rows(), grid.cols());

        // compute new codepoints
        self.cp.clear();
        self.cp.resize(bw * bh, BRAILLE_EMPTY);

        let cols = grid.cols();
        for (n, &cell) in grid.cells().iter().enumerate() {
            if cell != ALIVE {
                continue;
            }

            let (x, y) = (n % cols, n / cols);
            self.cp[(y / 4) * bw + (x / 2)] += Self::get_hex_value(x, y);
        }

        // For each braille character we need 3 bytes, and each line one more for the newline.
        self.fb.clear();
        self.fb.reserve(3 * (bw * bh) + bh);

        for (i, &c) in self.cp.iter().enumerate() {
            if i > 0 && i % bw == 0 {
                self.fb.push('\n');
            }

            // every codepoint stays within U+2800..=U+28FF
            self.fb.push(char::from_u32(c).unwrap_or('?'));
        }

        if !self.cp.is_empty() {
            self.fb.push('\n');
        }

        &self.fb
    }

    fn get_hex_value(x: usize, y: usize) -> u32 {
        match (x % 2, y % 4) {
            (0, 0) => 0x1,
            (1, 0) => 0x8,
            (0, 1) => 0x2,
            (1, 1) => 0x10,
            (0, 2) => 0x4,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => unreachable!(),
        }
    }
}
