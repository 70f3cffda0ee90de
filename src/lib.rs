// Domain layer - grid state and evolution rules
pub mod domain;

// Application layer - session coordination
pub mod application;

// Infrastructure layer - rendering, input
pub mod input;
pub mod rendering;

// Re-exports for convenience
pub use application::GameSession;
pub use domain::{ConwayRule, Grid, GridCell, Rule};
pub use rendering::{
    CellGeometry, DrawingEngine, FrameRequest, FrameScheduler, MacroquadSurface, PaintSurface,
    Palette, RenderError, TickScheduler,
};
