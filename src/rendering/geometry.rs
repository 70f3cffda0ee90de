use super::RenderError;

/// CellGeometry maps logical grid coordinates to pixel geometry.
/// All pixel math lives here so the animation engine, the settled repaint
/// and the canvas sizing share one set of formulas and cells never clip at
/// the grid edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellGeometry {
    cell_radius: f32,
    diameter: f32,
    padding: f32,
    position_offset: f32,
    columns: usize,
    rows: usize,
}

impl CellGeometry {
    /// Derive the geometry constants for a grid session.
    ///
    /// `size_percentage` is the share of the viewport width the grid may
    /// occupy, in (0, 100]. The derived values stay fixed until `configure`
    /// is re-run for a new viewport or grid size.
    pub fn configure(
        size_percentage: f32,
        columns: usize,
        rows: usize,
        viewport_width: f32,
    ) -> Result<Self, RenderError> {
        if columns == 0 || rows == 0 {
            return Err(RenderError::InvalidConfiguration {
                reason: format!(
                    "grid needs at least one column and one row, got {columns}x{rows}"
                ),
            });
        }
        if !(size_percentage > 0.0 && size_percentage <= 100.0) {
            return Err(RenderError::InvalidConfiguration {
                reason: format!("cell size percentage must be in (0, 100], got {size_percentage}"),
            });
        }
        if !viewport_width.is_finite() || viewport_width <= 0.0 {
            return Err(RenderError::InvalidConfiguration {
                reason: format!("viewport width must be positive, got {viewport_width}"),
            });
        }

        let grid_width = size_percentage / 100.0 * viewport_width;
        let cell_radius = (grid_width / columns as f32 / 2.0).ceil();
        Ok(Self {
            cell_radius,
            diameter: cell_radius * 2.0,
            padding: (0.5 * cell_radius).ceil(),
            position_offset: cell_radius + cell_radius / 4.0,
            columns,
            rows,
        })
    }

    /// Top-left pixel offset of the cell at `index` on either axis. Serves
    /// both as the corner of a cell's clear rectangle and as the basis for
    /// its circle center.
    pub fn absolute_position(&self, index: usize) -> f32 {
        index as f32 * (self.padding + self.diameter)
    }

    /// Pixel offset of the cell's circle center on either axis
    pub fn circle_center(&self, index: usize) -> f32 {
        self.absolute_position(index) + self.position_offset
    }

    /// Canvas size in pixels for the configured grid. Must be re-derived
    /// via `configure` whenever the viewport or grid dimensions change.
    pub fn canvas_extent(&self) -> (f32, f32) {
        (
            self.absolute_position(self.columns),
            self.absolute_position(self.rows),
        )
    }

    /// Inverse mapping: the grid cell under a pixel position, if any
    pub fn cell_at(&self, px: f32, py: f32) -> Option<(usize, usize)> {
        if px < 0.0 || py < 0.0 {
            return None;
        }
        let pitch = self.padding + self.diameter;
        let (x, y) = ((px / pitch) as usize, (py / pitch) as usize);
        (x < self.columns && y < self.rows).then_some((x, y))
    }

    pub const fn cell_radius(&self) -> f32 {
        self.cell_radius
    }

    pub const fn diameter(&self) -> f32 {
        self.diameter
    }

    pub const fn padding(&self) -> f32 {
        self.padding
    }

    pub const fn columns(&self) -> usize {
        self.columns
    }

    pub const fn rows(&self) -> usize {
        self.rows
    }
}
