mod cell;
mod grid;
mod rules;

pub use cell::{GridCell, INITIAL_LIFE_PROBABILITY};
pub use grid::Grid;
pub use rules::{ConwayRule, Rule, default_rule};
