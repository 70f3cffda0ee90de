mod engine;
mod geometry;
pub(crate) mod scheduler;
pub(crate) mod surface;

pub use engine::DrawingEngine;
pub use geometry::CellGeometry;
pub use scheduler::{FrameRequest, FrameScheduler, TickScheduler};
pub use surface::{MacroquadSurface, PaintSurface, Palette};

use thiserror::Error;

/// Rendering failures are configuration or misuse errors, surfaced
/// immediately and never retried; nothing in this layer performs I/O, so
/// no transient error class exists.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("drawing engine not ready: no {0} attached")]
    NotReady(&'static str),
}
