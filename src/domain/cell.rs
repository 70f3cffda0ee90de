use rand::Rng;

/// Chance of a cell starting alive when the grid is randomized
pub const INITIAL_LIFE_PROBABILITY: f64 = 0.3;

/// One cell of the life grid. Identity is the (x, y) pair; only the alive
/// flag ever changes, and it belongs to the grid. The renderer reads
/// snapshot copies and never mutates it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GridCell {
    pub x: usize,
    pub y: usize,
    pub alive: bool,
}

impl GridCell {
    pub const fn new(x: usize, y: usize, alive: bool) -> Self {
        Self { x, y, alive }
    }

    /// Cell with a randomized initial state
    pub fn randomized(x: usize, y: usize, rng: &mut impl Rng) -> Self {
        Self::new(x, y, rng.random_bool(INITIAL_LIFE_PROBABILITY))
    }

    /// Check if the cell is currently alive
    pub const fn is_alive(self) -> bool {
        self.alive
    }
}
