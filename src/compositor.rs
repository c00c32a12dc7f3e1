use tracing::debug;
use tracing::warn;

use crate::grid::ALIVE;
use crate::grid::Grid;
use crate::palette::Color;
use crate::palette::ColorInterpolationExt;
use crate::palette::Palette;

/// Bytes per RGBA pixel
const CHANNELS: usize = 4;

/// Default opacity of the mesh over the cells.
pub const MESH_OPACITY: f64 = 0.3;

/// A row-major RGBA image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * CHANNELS],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes, `width * height * 4` of them.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let i = (y * self.width + x) * CHANNELS;
        let mut px = [0; CHANNELS];
        px.copy_from_slice(&self.pixels[i..i + CHANNELS]);

        Some(px)
    }

    fn put(&mut self, x: usize, y: usize, px: [u8; 4]) {
        let i = (y * self.width + x) * CHANNELS;
        self.pixels[i..i + CHANNELS].copy_from_slice(&px);
    }

    fn reshape(&mut self, width: usize, height: usize) {
        if (self.width, self.height) != (width, height) {
            *self = Self::new(width, height);
        }
    }
}

/// Nearest-neighbor scale of `src` onto the whole of `dst`. No smoothing, so cell edges stay
/// sharp.
pub fn upscale(src: &Frame, dst: &mut Frame) {
    if src.width == 0 || src.height == 0 {
        return;
    }

    for dy in 0..dst.height {
        let sy = dy * src.height / dst.height;

        for dx in 0..dst.width {
            let sx = dx * src.width / dst.width;

            let i = (sy * src.width + sx) * CHANNELS;
            let j = (dy * dst.width + dx) * CHANNELS;

            dst.pixels[j..j + CHANNELS].copy_from_slice(&src.pixels[i..i + CHANNELS]);
        }
    }
}

/// Turns the cell buffer into canvas pixels.
///
/// Every [`Compositor::render`] is a full redraw: one pixel per cell into a grid-resolution
/// image, then a nearest-neighbor upscale to the canvas, then the optional mesh.
#[derive(Debug, Clone)]
pub struct Compositor {
    /// Edge length of a cell on the canvas, in pixels
    cell_size: usize,

    show_mesh: bool,
    mesh_opacity: f64,

    /// One pixel per cell
    image: Frame,

    /// What the host displays
    canvas: Frame,
}

impl Compositor {
    pub fn new(cell_size: usize) -> Self {
        Self {
            cell_size: cell_size.max(1),
            show_mesh: false,
            mesh_opacity: MESH_OPACITY,
            image: Frame::new(0, 0),
            canvas: Frame::new(0, 0),
        }
    }

    pub fn cell_size(&self) -> usize {
        self.cell_size
    }

    pub fn show_mesh(&self) -> bool {
        self.show_mesh
    }

    pub fn set_mesh(&mut self, show: bool) {
        self.show_mesh = show;
    }

    pub fn toggle_mesh(&mut self) {
        self.show_mesh = !self.show_mesh;
    }

    pub fn set_mesh_opacity(&mut self, opacity: f64) {
        self.mesh_opacity = opacity.clamp(0f64, 1f64);
    }

    /// Canvas dimensions `(width, height)` for a grid of `rows` by `cols`, or `None` if its
    /// RGBA buffer would not be addressable.
    pub fn canvas_size(&self, rows: usize, cols: usize) -> Option<(usize, usize)> {
        let width = cols.checked_mul(self.cell_size)?;
        let height = rows.checked_mul(self.cell_size)?;

        width.checked_mul(height)?.checked_mul(CHANNELS)?;

        Some((width, height))
    }

    /// The last composited canvas.
    pub fn canvas(&self) -> &Frame {
        &self.canvas
    }

    /// Redraw the whole canvas from `grid`.
    pub fn render(&mut self, grid: &Grid, palette: &Palette) -> &Frame {
        let (rows, cols) = (grid.rows(), grid.cols());
        let Some((width, height)) = self.canvas_size(rows, cols) else {
            warn!(rows, cols, "grid too large to composite");
            return &self.canvas;
        };

        if (self.canvas.width, self.canvas.height) != (width, height) {
            debug!(width, height, "canvas reshaped");
        }

        self.image.reshape(cols, rows);
        self.canvas.reshape(width, height);

        for (px, &cell) in self
            .image
            .pixels
            .chunks_exact_mut(CHANNELS)
            .zip(grid.cells())
        {
            px.copy_from_slice(&palette.cell_rgba(cell == ALIVE));
        }

        upscale(&self.image, &mut self.canvas);

        if self.mesh_visible() {
            self.overlay_mesh(palette.mesh(), 0, 0, width, height);
        }

        &self.canvas
    }

    /// Paint a single cell straight onto the canvas without a full render. Returns `false` if
    /// the cell is outside the last rendered canvas.
    pub fn draw_cell(&mut self, row: usize, col: usize, alive: bool, palette: &Palette) -> bool {
        if col >= self.image.width || row >= self.image.height {
            return false;
        }

        let px = palette.cell_rgba(alive);
        self.image.put(col, row, px);

        let s = self.cell_size;
        let (x0, y0) = (col * s, row * s);

        for y in y0..y0 + s {
            for x in x0..x0 + s {
                self.canvas.put(x, y, px);
            }
        }

        if self.mesh_visible() {
            self.overlay_mesh(palette.mesh(), x0, y0, x0 + s, y0 + s);
        }

        true
    }

    // At one pixel per cell every pixel would be mesh.
    fn mesh_visible(&self) -> bool {
        self.show_mesh && self.cell_size > 1
    }

    /// Blend the mesh over the canvas region `[x0, x1) x [y0, y1)`.
    ///
    /// Lines run along the top and left pixel of every cell. A pixel on both a horizontal and a
    /// vertical line is blended once.
    fn overlay_mesh(&mut self, mesh: Color, x0: usize, y0: usize, x1: usize, y1: usize) {
        let s = self.cell_size;
        let opacity = self.mesh_opacity;

        for y in y0..y1 {
            let on_row = y % s == 0;

            for x in x0..x1 {
                if !on_row && x % s != 0 {
                    continue;
                }

                let i = (y * self.canvas.width + x) * CHANNELS;
                let px = &mut self.canvas.pixels[i..i + CHANNELS];
                let under = Color::rgb(px[0], px[1], px[2]);

                px.copy_from_slice(&mesh.lerp(&under, opacity).rgba());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> Palette {
        Palette::new(Color::BLACK, Color::WHITE, Color::rgb(200, 0, 0))
    }

    const BLACK: [u8; 4] = [0, 0, 0, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    #[test]
    fn renders_scaled_cells() {
        let mut grid = Grid::new(2, 3);
        grid.set(1, 2, true);

        let mut compositor = Compositor::new(4);
        let frame = compositor.render(&grid, &palette());

        assert_eq!((frame.width(), frame.height()), (12, 8));

        for y in 0..8 {
            for x in 0..12 {
                let want = if x >= 8 && y >= 4 { WHITE } else { BLACK };
                assert_eq!(frame.pixel(x, y), Some(want), "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn upscale_is_nearest_neighbor() {
        let mut src = Frame::new(2, 1);
        src.put(0, 0, [1, 2, 3, 255]);
        src.put(1, 0, [9, 8, 7, 255]);

        let mut dst = Frame::new(5, 2);
        upscale(&src, &mut dst);

        let row: Vec<[u8; 4]> = (0..5).map(|x| dst.pixel(x, 1).unwrap()).collect();
        assert_eq!(
            row,
            vec![
                [1, 2, 3, 255],
                [1, 2, 3, 255],
                [1, 2, 3, 255],
                [9, 8, 7, 255],
                [9, 8, 7, 255],
            ]
        );
    }

    #[test]
    fn mesh_marks_cell_edges() {
        let grid = Grid::new(2, 2);

        let mut compositor = Compositor::new(3);
        compositor.set_mesh(true);
        let frame = compositor.render(&grid, &palette());

        // 0.3 of the mesh red over black
        let line = [60, 0, 0, 255];

        assert_eq!(frame.pixel(0, 0), Some(line));
        assert_eq!(frame.pixel(3, 1), Some(line));
        assert_eq!(frame.pixel(1, 3), Some(line));
        assert_eq!(frame.pixel(1, 1), Some(BLACK));
        assert_eq!(frame.pixel(5, 5), Some(BLACK));
    }

    #[test]
    fn mesh_hidden_at_one_pixel_cells() {
        let grid = Grid::new(2, 2);

        let mut compositor = Compositor::new(1);
        compositor.set_mesh(true);
        let frame = compositor.render(&grid, &palette());

        assert!(frame.pixels().chunks_exact(4).all(|px| px == BLACK));
    }

    #[test]
    fn draw_cell_matches_full_render() {
        let palette = palette();
        let mut grid = Grid::new(3, 3);

        let mut compositor = Compositor::new(2);
        compositor.set_mesh(true);
        compositor.render(&grid, &palette);

        grid.set(2, 1, true);
        assert!(compositor.draw_cell(2, 1, true, &palette));
        let direct = compositor.canvas().clone();

        let full = compositor.render(&grid, &palette).clone();
        assert_eq!(direct, full);
    }

    #[test]
    fn canvas_size_rejects_overflow() {
        let compositor = Compositor::new(4);

        assert_eq!(compositor.canvas_size(3, 5), Some((20, 12)));
        assert_eq!(compositor.canvas_size(1, usize::MAX / 2), None);
        assert_eq!(compositor.canvas_size(usize::MAX / 8, usize::MAX / 8), None);
    }

    #[test]
    fn draw_cell_out_of_range() {
        let mut compositor = Compositor::new(2);
        compositor.render(&Grid::new(2, 2), &palette());

        assert!(!compositor.draw_cell(2, 0, true, &palette()));
        assert!(!compositor.draw_cell(0, 2, true, &palette()));
    }
}
