//! Fixed-size boolean cell field
//!
//! The same type backs the occupancy grid (every particle, falling or
//! settled) and the settlement field (settled particles only). Coordinates
//! are never checked beyond the slice index: callers clamp into the domain
//! first, and an out-of-range access panics.

/// Flat boolean field indexed `x + width * y`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Create an all-clear grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "cell ({x}, {y}) outside {}x{} grid",
            self.width,
            self.height
        );
        x + self.width * y
    }

    #[inline]
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.cells[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize) {
        let idx = self.index(x, y);
        self.cells[idx] = true;
    }

    #[inline]
    pub fn clear(&mut self, x: usize, y: usize) {
        let idx = self.index(x, y);
        self.cells[idx] = false;
    }

    /// Clear every cell
    pub fn reset_all(&mut self) {
        self.cells.fill(false);
    }

    /// Row-major cell slice
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Number of set cells
    pub fn count_set(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Overwrite this grid with `other`; dimensions must match
    pub fn copy_from(&mut self, other: &Grid) {
        assert_eq!(
            (self.width, self.height),
            (other.width, other.height),
            "grid dimensions differ"
        );
        self.cells.copy_from_slice(&other.cells);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_clear() {
        let grid = Grid::new(4, 3);
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.cells().len(), 12);
        assert_eq!(grid.count_set(), 0);
    }

    #[test]
    fn test_set_and_clear() {
        let mut grid = Grid::new(4, 3);
        grid.set(3, 2);
        assert!(grid.is_set(3, 2));
        assert!(!grid.is_set(2, 2));

        // Row-major layout
        assert!(grid.cells()[3 + 4 * 2]);

        grid.clear(3, 2);
        assert!(!grid.is_set(3, 2));
    }

    #[test]
    fn test_reset_all() {
        let mut grid = Grid::new(5, 5);
        for i in 0..5 {
            grid.set(i, i);
        }
        assert_eq!(grid.count_set(), 5);
        grid.reset_all();
        assert_eq!(grid.count_set(), 0);
    }

    #[test]
    fn test_copy_from() {
        let mut source = Grid::new(3, 3);
        source.set(1, 1);
        let mut target = Grid::new(3, 3);
        target.set(0, 0);

        target.copy_from(&source);
        assert_eq!(target, source);
    }

    #[test]
    #[should_panic]
    fn test_out_of_bounds_panics() {
        let grid = Grid::new(2, 2);
        grid.is_set(0, 2);
    }

    #[test]
    #[should_panic(expected = "grid dimensions differ")]
    fn test_copy_from_mismatched_panics() {
        let mut a = Grid::new(2, 2);
        let b = Grid::new(3, 2);
        a.copy_from(&b);
    }
}
