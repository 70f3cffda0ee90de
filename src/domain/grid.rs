use rayon::prelude::*;

use super::{GridCell, Rule};

/// Grid manages the 2D cell field the rule engine evolves and the renderer
/// snapshots. Evolution is functional: it returns a new grid and leaves the
/// current one untouched, so a snapshot handed to the drawing engine stays
/// valid while the next generation is computed.
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<GridCell>,
}

impl Grid {
    /// Create a new grid with all cells initially dead
    pub fn new(width: usize, height: usize) -> Self {
        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| GridCell::new(x, y, false)))
            .collect();
        Self {
            width,
            height,
            cells,
        }
    }

    /// Get grid dimensions
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Convert 2D coordinates to 1D index
    const fn get_index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Get cell at position (with bounds checking)
    pub fn get(&self, x: usize, y: usize) -> Option<GridCell> {
        (x < self.width && y < self.height).then(|| self.cells[self.get_index(x, y)])
    }

    /// Set cell state at position (mutable for editing)
    pub fn set_alive(&mut self, x: usize, y: usize, alive: bool) {
        if x < self.width && y < self.height {
            let idx = self.get_index(x, y);
            self.cells[idx].alive = alive;
        }
    }

    /// Flip a cell and return its new state, or None when out of bounds
    pub fn toggle(&mut self, x: usize, y: usize) -> Option<GridCell> {
        (x < self.width && y < self.height).then(|| {
            let idx = self.get_index(x, y);
            self.cells[idx].alive = !self.cells[idx].alive;
            self.cells[idx]
        })
    }

    /// Count live neighbors using toroidal wrapping (grid wraps like a torus)
    fn count_live_neighbors(&self, x: usize, y: usize) -> u8 {
        let w = self.width as i32;
        let h = self.height as i32;

        (-1..=1)
            .flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
            .filter(|&(dx, dy)| {
                let nx = ((x as i32 + dx) % w + w) % w;
                let ny = ((y as i32 + dy) % h + h) % h;
                self.cells[self.get_index(nx as usize, ny as usize)].is_alive()
            })
            .count() as u8
    }

    /// Pure functional evolution - returns the next generation (serial)
    pub fn next_generation(&self, rule: &dyn Rule) -> Self {
        let cells = self
            .cells
            .iter()
            .map(|cell| {
                let alive = rule.evolve(cell.alive, self.count_live_neighbors(cell.x, cell.y));
                GridCell::new(cell.x, cell.y, alive)
            })
            .collect();

        Self {
            width: self.width,
            height: self.height,
            cells,
        }
    }

    /// Parallel evolution using rayon, worthwhile for large grids
    pub fn next_generation_parallel(&self, rule: &dyn Rule) -> Self {
        let cells = self
            .cells
            .par_iter()
            .map(|cell| {
                let alive = rule.evolve(cell.alive, self.count_live_neighbors(cell.x, cell.y));
                GridCell::new(cell.x, cell.y, alive)
            })
            .collect();

        Self {
            width: self.width,
            height: self.height,
            cells,
        }
    }

    /// Re-seed every cell with the initial life probability
    pub fn randomize(&mut self) {
        let mut rng = rand::rng();
        self.cells
            .iter_mut()
            .for_each(|cell| *cell = GridCell::randomized(cell.x, cell.y, &mut rng));
    }

    /// Clear all cells to dead state
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| cell.alive = false);
    }

    /// Snapshot source handed to the drawing engine
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Number of cells currently alive
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }
}
