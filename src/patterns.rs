use crate::grid::Grid;

/// A named arrangement of live cells, as `(row, col)` offsets from its top left corner.
#[derive(Debug)]
pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(usize, usize)],
}

pub const GLIDER: Pattern = Pattern {
    name: "glider",
    cells: &[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)],
};

#[rustfmt::skip]
pub const EXPLODER: Pattern = Pattern {
    name: "exploder",
    cells: &[
        (0, 0), (0, 1), (0, 2), (0, 3), (0, 4),
        (2, 0), (2, 4),
        (4, 0), (4, 1), (4, 2), (4, 3), (4, 4),
    ],
};

pub const BLINKER: Pattern = Pattern {
    name: "blinker",
    cells: &[(0, 0), (0, 1), (0, 2)],
};

pub const BLOCK: Pattern = Pattern {
    name: "block",
    cells: &[(0, 0), (0, 1), (1, 0), (1, 1)],
};

pub const PATTERNS: &[Pattern] = &[GLIDER, EXPLODER, BLINKER, BLOCK];

/// Look a pattern up by name, ignoring case.
pub fn find(name: &str) -> Option<&'static Pattern> {
    PATTERNS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

impl Pattern {
    /// Largest row and column offsets
    pub fn extent(&self) -> (usize, usize) {
        self.cells
            .iter()
            .fold((0, 0), |(mr, mc), &(r, c)| (mr.max(r), mc.max(c)))
    }

    /// Set the pattern's cells alive with its top left corner at `(row, col)`. Cells that fall
    /// outside the grid are dropped, not wrapped.
    pub fn stamp(&self, grid: &mut Grid, row: isize, col: isize) {
        for &(r, c) in self.cells {
            let (r, c) = (row + r as isize, col + c as isize);

            if r >= 0 && c >= 0 {
                grid.set(r as usize, c as usize, true);
            }
        }
    }

    /// Stamp the pattern in the middle of the grid.
    pub fn stamp_centered(&self, grid: &mut Grid) {
        let (max_r, max_c) = self.extent();

        let row = (grid.rows() as isize - max_r as isize).div_euclid(2);
        let col = (grid.cols() as isize - max_c as isize).div_euclid(2);

        self.stamp(grid, row, col);
    }
}
