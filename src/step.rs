use crate::grid::ALIVE;
use crate::grid::NEIGHBORS;
use crate::rules::B3S23;

/// Compute one generation from `current` into `next`.
///
/// `neighbors[i * 8..i * 8 + 8]` must address the eight neighbors of cell `i`. Cells are read
/// only from `current` and written only to `next`, so every cell sees the same generation. The
/// caller owns the buffers and is expected to swap them afterwards.
///
/// Returns the number of cells whose state changed.
pub fn step(current: &[u8], next: &mut [u8], neighbors: &[usize]) -> usize {
    debug_assert_eq!(current.len(), next.len(), "buffers must match in length");
    debug_assert_eq!(neighbors.len(), current.len() * NEIGHBORS);

    let mut changed = 0;

    for (i, (out, nbhd)) in next
        .iter_mut()
        .zip(neighbors.chunks_exact(NEIGHBORS))
        .enumerate()
    {
        let count: u8 = nbhd.iter().map(|&j| current[j]).sum();
        let alive = current[i] == ALIVE;
        let state = B3S23.next_state(alive, count);

        *out = state as u8;

        if state != alive {
            changed += 1;
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use crate::grid::Grid;

    use super::step;

    #[test]
    fn reads_current_only() {
        // a vertical blinker on a 5x5 torus; an in-place update would kill the middle cell's
        // upper neighbor before the middle is evaluated
        let mut grid = Grid::new(5, 5);
        for r in 1..4 {
            grid.set(r, 2, true);
        }

        let current = grid.cells().to_vec();
        let mut next = vec![0xAA; current.len()];

        let changed = step(&current, &mut next, grid.neighbor_table());

        let alive: Vec<usize> = (0..next.len()).filter(|&i| next[i] == 1).collect();
        assert_eq!(alive, vec![11, 12, 13]);
        assert_eq!(changed, 4);
        assert!(next.iter().all(|&c| c <= 1), "every cell of `next` is overwritten");
    }

    #[test]
    fn empty_grid_stays_empty() {
        let grid = Grid::new(4, 4);
        let mut next = vec![0; 16];

        assert_eq!(step(grid.cells(), &mut next, grid.neighbor_table()), 0);
        assert!(next.iter().all(|&c| c == 0));
    }
}
