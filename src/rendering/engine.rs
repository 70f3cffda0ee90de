use std::f32::consts::TAU;

use log::debug;
use macroquad::prelude::Color;

use super::geometry::CellGeometry;
use super::scheduler::{FrameRequest, FrameScheduler};
use super::surface::{PaintSurface, Palette};
use super::RenderError;
use crate::domain::GridCell;

/// Fraction of the generation interval spent animating, leaving a short
/// gap before the next generation lands
const ANIMATION_INTERVAL_RATIO: f64 = 0.9;

/// Lifecycle of one animation timeline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimelineState {
    Pending,
    Running,
    Complete,
    Cancelled,
}

/// One independent animation run covering one redraw request. Owns a copy
/// of the cells, so mutation of the live grid cannot corrupt a run already
/// in flight. The growth radius is a per-timeline field: every alive cell
/// in the snapshot grows with the same radius, every dying cell shrinks
/// with the complement.
struct Timeline {
    cells: Vec<GridCell>,
    started_at: Option<f64>,
    duration_ms: f64,
    growth_radius: f32,
    handle: Option<FrameRequest>,
    state: TimelineState,
}

impl Timeline {
    fn new(cells: Vec<GridCell>, duration_ms: f64) -> Self {
        Self {
            cells,
            started_at: None,
            duration_ms,
            growth_radius: 0.0,
            handle: None,
            state: TimelineState::Pending,
        }
    }

    fn is_active(&self) -> bool {
        matches!(self.state, TimelineState::Pending | TimelineState::Running)
    }
}

/// Animated drawing engine. Each `request_draw` opens its own timeline over
/// a snapshot of the grid; every display refresh advances all live
/// timelines one frame, painting births as growing circles and deaths as
/// shrinking ones. Overlapping timelines paint in registration order, so
/// the most recent request wins visually within a frame.
pub struct DrawingEngine<C: FrameScheduler, P: PaintSurface> {
    scheduler: C,
    surface: Option<P>,
    geometry: Option<CellGeometry>,
    palette: Palette,
    timelines: Vec<Timeline>,
    animation_duration_ms: f64,
}

impl<C: FrameScheduler, P: PaintSurface> DrawingEngine<C, P> {
    pub fn new(scheduler: C, interval_ms: f64) -> Self {
        Self {
            scheduler,
            surface: None,
            geometry: None,
            palette: Palette::default(),
            timelines: Vec::new(),
            animation_duration_ms: animation_duration(interval_ms),
        }
    }

    /// Attach the paint surface. Draw requests before this fail with
    /// `NotReady` instead of silently rendering nothing.
    pub fn attach(&mut self, surface: P) {
        self.surface = Some(surface);
    }

    /// Install the pixel geometry. When replacing the geometry of a live
    /// engine, call `cancel_animations` first so no stale frame paints
    /// with outdated coordinates.
    pub fn set_geometry(&mut self, geometry: CellGeometry) {
        self.geometry = Some(geometry);
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    pub fn geometry(&self) -> Option<&CellGeometry> {
        self.geometry.as_ref()
    }

    pub fn surface(&self) -> Option<&P> {
        self.surface.as_ref()
    }

    pub fn scheduler(&self) -> &C {
        &self.scheduler
    }

    /// Open a new animation timeline over a snapshot of `cells` and
    /// schedule its first frame. Returns immediately; timelines opened by
    /// earlier requests keep running alongside the new one, each painting
    /// its own snapshot until it completes.
    pub fn request_draw(&mut self, cells: &[GridCell]) -> Result<(), RenderError> {
        self.ensure_ready()?;
        debug!(
            "draw requested: {} cells over {}ms",
            cells.len(),
            self.animation_duration_ms
        );
        let mut timeline = Timeline::new(cells.to_vec(), self.animation_duration_ms);
        timeline.handle = Some(self.scheduler.schedule());
        self.timelines.push(timeline);
        Ok(())
    }

    /// Advance every timeline with a pending frame request, then drop the
    /// completed ones. The host calls this once per display refresh with
    /// the current timestamp in milliseconds.
    pub fn run_frame(&mut self, now_ms: f64) -> Result<(), RenderError> {
        if self.timelines.is_empty() {
            return Ok(());
        }
        let Self {
            scheduler,
            surface,
            geometry,
            palette,
            timelines,
            ..
        } = self;
        let geometry = geometry.as_ref().ok_or(RenderError::NotReady("geometry"))?;
        let surface = surface.as_mut().ok_or(RenderError::NotReady("surface"))?;
        for timeline in timelines.iter_mut() {
            if timeline.handle.take().is_none() {
                continue;
            }
            advance(timeline, now_ms, geometry, *palette, surface, scheduler);
        }
        timelines.retain(Timeline::is_active);
        Ok(())
    }

    /// Revoke every pending frame request and drop all timelines. Safe to
    /// call with nothing in flight; required before reconfiguring or
    /// discarding the engine.
    pub fn cancel_animations(&mut self) {
        if self.timelines.is_empty() {
            return;
        }
        debug!("cancelling {} timeline(s)", self.timelines.len());
        for timeline in &mut self.timelines {
            if let Some(handle) = timeline.handle.take() {
                self.scheduler.cancel(handle);
            }
            timeline.state = TimelineState::Cancelled;
        }
        self.timelines.clear();
    }

    /// Change the animation duration used by future `request_draw` calls.
    /// Timelines already in flight keep the duration they started with.
    pub fn update_interval_duration(&mut self, interval_ms: f64) {
        self.animation_duration_ms = animation_duration(interval_ms);
    }

    /// Paint the settled grid once, outside any timeline: alive cells at
    /// full radius, dead cells as cleared rectangles
    pub fn draw_static(&mut self, cells: &[GridCell]) -> Result<(), RenderError> {
        let Self {
            surface,
            geometry,
            palette,
            ..
        } = self;
        let geometry = geometry.as_ref().ok_or(RenderError::NotReady("geometry"))?;
        let surface = surface.as_mut().ok_or(RenderError::NotReady("surface"))?;
        for cell in cells {
            if cell.is_alive() {
                fill_circle(surface, geometry, palette.alive, cell, geometry.cell_radius());
            } else {
                clear_cell(surface, geometry, palette.background, cell);
            }
        }
        Ok(())
    }

    pub fn is_idle(&self) -> bool {
        self.timelines.is_empty()
    }

    pub fn active_timelines(&self) -> usize {
        self.timelines.len()
    }

    fn ensure_ready(&self) -> Result<(), RenderError> {
        if self.geometry.is_none() {
            return Err(RenderError::NotReady("geometry"));
        }
        if self.surface.is_none() {
            return Err(RenderError::NotReady("surface"));
        }
        Ok(())
    }
}

fn animation_duration(interval_ms: f64) -> f64 {
    (interval_ms * ANIMATION_INTERVAL_RATIO).round()
}

/// One frame of one timeline: interpolate the shared growth radius from
/// elapsed time, paint every cell in the snapshot, then either reschedule
/// or complete.
fn advance<C: FrameScheduler, P: PaintSurface>(
    timeline: &mut Timeline,
    now_ms: f64,
    geometry: &CellGeometry,
    palette: Palette,
    surface: &mut P,
    scheduler: &mut C,
) {
    let max_radius = geometry.cell_radius();

    if timeline.duration_ms <= 0.0 {
        // degenerate interval: paint the end state once, no further frames
        timeline.growth_radius = max_radius;
        for cell in &timeline.cells {
            paint_cell(surface, geometry, palette, cell, max_radius);
        }
        timeline.state = TimelineState::Complete;
        return;
    }

    timeline.state = TimelineState::Running;
    let started_at = *timeline.started_at.get_or_insert(now_ms);
    let elapsed = (now_ms - started_at).max(0.0);
    let progress = (elapsed / timeline.duration_ms).min(1.0);
    timeline.growth_radius = max_radius * progress as f32;
    for cell in &timeline.cells {
        paint_cell(surface, geometry, palette, cell, timeline.growth_radius);
    }

    // reschedule only while the timeline is still in the active set
    if progress < 1.0 && timeline.is_active() {
        timeline.handle = Some(scheduler.schedule());
    } else {
        timeline.state = TimelineState::Complete;
    }
}

fn paint_cell<P: PaintSurface>(
    surface: &mut P,
    geometry: &CellGeometry,
    palette: Palette,
    cell: &GridCell,
    growth_radius: f32,
) {
    // a dying cell first clears its zone so anti-aliasing remnants of the
    // larger circle from the previous frame do not linger
    if !cell.is_alive() {
        clear_cell(surface, geometry, palette.background, cell);
    }
    let radius = if cell.is_alive() {
        growth_radius
    } else {
        geometry.cell_radius() - growth_radius
    };
    fill_circle(surface, geometry, palette.alive, cell, radius);
}

fn clear_cell<P: PaintSurface>(
    surface: &mut P,
    geometry: &CellGeometry,
    background: Color,
    cell: &GridCell,
) {
    let footprint = geometry.diameter() + geometry.padding();
    surface.set_fill_style(background);
    surface.fill_rect(
        geometry.absolute_position(cell.x),
        geometry.absolute_position(cell.y),
        footprint,
        footprint,
    );
}

fn fill_circle<P: PaintSurface>(
    surface: &mut P,
    geometry: &CellGeometry,
    color: Color,
    cell: &GridCell,
    radius: f32,
) {
    surface.begin_path();
    surface.arc(
        geometry.circle_center(cell.x),
        geometry.circle_center(cell.y),
        radius,
        0.0,
        TAU,
    );
    surface.set_line_width(0.0);
    surface.set_fill_style(color);
    surface.fill();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::scheduler::testing::RecordingScheduler;
    use crate::rendering::surface::testing::{PaintOp, RecordingSurface};

    // 0.9 * 100ms interval -> 90ms timelines
    const INTERVAL_MS: f64 = 100.0;

    // percentage=80, columns=10, viewport=1000 -> radius 40, diameter 80,
    // padding 20, pitch 100, circle centers at 100*i + 50
    fn geometry() -> CellGeometry {
        CellGeometry::configure(80.0, 10, 10, 1000.0).unwrap()
    }

    fn engine() -> DrawingEngine<RecordingScheduler, RecordingSurface> {
        let mut engine = DrawingEngine::new(RecordingScheduler::default(), INTERVAL_MS);
        engine.attach(RecordingSurface::default());
        engine.set_geometry(geometry());
        engine
    }

    fn ops(engine: &DrawingEngine<RecordingScheduler, RecordingSurface>) -> &RecordingSurface {
        engine.surface().unwrap()
    }

    fn birth(x: usize, y: usize) -> GridCell {
        GridCell::new(x, y, true)
    }

    fn death(x: usize, y: usize) -> GridCell {
        GridCell::new(x, y, false)
    }

    #[test]
    fn test_request_draw_requires_geometry() {
        let mut engine: DrawingEngine<RecordingScheduler, RecordingSurface> =
            DrawingEngine::new(RecordingScheduler::default(), INTERVAL_MS);
        engine.attach(RecordingSurface::default());
        assert_eq!(
            engine.request_draw(&[birth(0, 0)]),
            Err(RenderError::NotReady("geometry"))
        );
    }

    #[test]
    fn test_request_draw_requires_surface() {
        let mut engine: DrawingEngine<RecordingScheduler, RecordingSurface> =
            DrawingEngine::new(RecordingScheduler::default(), INTERVAL_MS);
        engine.set_geometry(geometry());
        assert_eq!(
            engine.request_draw(&[birth(0, 0)]),
            Err(RenderError::NotReady("surface"))
        );
    }

    #[test]
    fn test_first_frame_paints_extremes() {
        let mut engine = engine();
        engine.request_draw(&[birth(0, 0), death(1, 0)]).unwrap();
        engine.run_frame(1000.0).unwrap();

        // progress 0: births at radius 0, deaths still at full radius
        assert_eq!(
            ops(&engine).circles(),
            vec![(50.0, 50.0, 0.0), (150.0, 50.0, 40.0)]
        );
        assert_eq!(engine.active_timelines(), 1);
    }

    #[test]
    fn test_midpoint_interpolation() {
        let mut engine = engine();
        engine.request_draw(&[birth(0, 0), death(1, 0)]).unwrap();
        engine.run_frame(1000.0).unwrap();
        engine.run_frame(1045.0).unwrap();

        // progress 0.5 of the 90ms timeline
        let circles = ops(&engine).circles();
        assert_eq!(circles[2], (50.0, 50.0, 20.0));
        assert_eq!(circles[3], (150.0, 50.0, 20.0));
    }

    #[test]
    fn test_completion_paints_end_state_and_retires_timeline() {
        let mut engine = engine();
        engine.request_draw(&[birth(0, 0), death(1, 0)]).unwrap();
        engine.run_frame(1000.0).unwrap();
        engine.run_frame(1090.0).unwrap();

        let circles = ops(&engine).circles();
        assert_eq!(circles[2], (50.0, 50.0, 40.0));
        assert_eq!(circles[3], (150.0, 50.0, 0.0));
        assert!(engine.is_idle());
    }

    #[test]
    fn test_progress_clamps_past_duration() {
        let mut engine = engine();
        engine.request_draw(&[birth(0, 0)]).unwrap();
        engine.run_frame(1000.0).unwrap();
        engine.run_frame(99_000.0).unwrap();

        let circles = ops(&engine).circles();
        assert_eq!(circles.last(), Some(&(50.0, 50.0, 40.0)));
        assert!(engine.is_idle());
    }

    #[test]
    fn test_continuing_timeline_reschedules_one_frame_per_tick() {
        let mut engine = engine();
        engine.request_draw(&[birth(0, 0)]).unwrap();
        assert_eq!(engine.scheduler.scheduled.len(), 1);
        engine.run_frame(1000.0).unwrap();
        assert_eq!(engine.scheduler.scheduled.len(), 2);
        engine.run_frame(1045.0).unwrap();
        assert_eq!(engine.scheduler.scheduled.len(), 3);
        engine.run_frame(1090.0).unwrap();
        // final frame does not reschedule
        assert_eq!(engine.scheduler.scheduled.len(), 3);
    }

    #[test]
    fn test_dying_cell_clears_its_footprint_first() {
        let mut engine = engine();
        engine.request_draw(&[death(2, 3)]).unwrap();
        engine.run_frame(1000.0).unwrap();

        // diameter 80 + padding 20 square at the absolute position
        assert_eq!(ops(&engine).rects(), vec![(200.0, 300.0, 100.0, 100.0)]);
        let background = Palette::default().background;
        assert_eq!(
            ops(&engine).ops[0],
            PaintOp::SetFillStyle(background)
        );
        assert!(matches!(ops(&engine).ops[1], PaintOp::FillRect { .. }));
    }

    #[test]
    fn test_zero_duration_paints_once_without_scheduling() {
        let mut engine: DrawingEngine<RecordingScheduler, RecordingSurface> =
            DrawingEngine::new(RecordingScheduler::default(), 0.0);
        engine.attach(RecordingSurface::default());
        engine.set_geometry(geometry());

        engine.request_draw(&[birth(0, 0), death(1, 1)]).unwrap();
        assert_eq!(engine.scheduler.scheduled.len(), 1);
        engine.run_frame(5000.0).unwrap();

        assert_eq!(
            ops(&engine).circles(),
            vec![(50.0, 50.0, 40.0), (150.0, 150.0, 0.0)]
        );
        assert!(engine.is_idle());
        // the single-shot paint never registers a follow-up frame
        assert_eq!(engine.scheduler.scheduled.len(), 1);
    }

    #[test]
    fn test_two_timelines_run_and_complete_independently() {
        let mut engine = engine();
        engine.request_draw(&[birth(0, 0)]).unwrap();
        engine.run_frame(1000.0).unwrap();

        engine.request_draw(&[death(1, 0)]).unwrap();
        assert_eq!(engine.active_timelines(), 2);

        // first timeline at progress 0.5, second at progress 0
        engine.run_frame(1045.0).unwrap();
        assert_eq!(engine.active_timelines(), 2);

        // first completes, second keeps running
        engine.run_frame(1090.0).unwrap();
        assert_eq!(engine.active_timelines(), 1);

        engine.run_frame(1135.0).unwrap();
        assert!(engine.is_idle());
    }

    #[test]
    fn test_overlapping_timelines_paint_in_registration_order() {
        let mut engine = engine();
        engine.request_draw(&[birth(0, 0)]).unwrap();
        engine.request_draw(&[death(0, 0)]).unwrap();
        engine.run_frame(1000.0).unwrap();

        // same cell painted twice in one frame; the later registration
        // paints second and wins visually
        let circles = ops(&engine).circles();
        assert_eq!(circles.len(), 2);
        assert_eq!(circles[0], (50.0, 50.0, 0.0));
        assert_eq!(circles[1], (50.0, 50.0, 40.0));
    }

    #[test]
    fn test_cancel_animations_revokes_and_clears() {
        let mut engine = engine();
        engine.request_draw(&[birth(0, 0)]).unwrap();
        engine.request_draw(&[birth(1, 1)]).unwrap();
        let pending = engine.scheduler.scheduled.clone();

        engine.cancel_animations();
        assert_eq!(engine.scheduler.cancelled, pending);
        assert!(engine.is_idle());

        // a tick after cancellation paints nothing
        engine.run_frame(1000.0).unwrap();
        assert!(ops(&engine).ops.is_empty());

        // idempotent with nothing in flight
        engine.cancel_animations();
        assert!(engine.scheduler.cancelled.len() == 2);
    }

    #[test]
    fn test_update_interval_only_affects_future_timelines() {
        let mut engine = engine();
        engine.request_draw(&[birth(0, 0)]).unwrap();
        engine.run_frame(1000.0).unwrap();

        engine.update_interval_duration(1000.0);
        engine.request_draw(&[birth(1, 0)]).unwrap();
        engine.run_frame(1045.0).unwrap();

        // in-flight timeline still completes on its original 90ms duration
        engine.run_frame(1090.0).unwrap();
        assert_eq!(engine.active_timelines(), 1);

        // the new timeline runs on the 900ms duration started at 1045
        engine.run_frame(1945.0).unwrap();
        assert!(engine.is_idle());
    }

    #[test]
    fn test_snapshot_is_independent_of_caller_buffer() {
        let mut engine = engine();
        let mut cells = vec![birth(0, 0)];
        engine.request_draw(&cells).unwrap();
        cells[0].alive = false;
        engine.run_frame(1000.0).unwrap();
        engine.run_frame(1090.0).unwrap();

        // the timeline painted its own copy: the cell stayed a birth
        assert_eq!(
            ops(&engine).circles().last(),
            Some(&(50.0, 50.0, 40.0))
        );
    }

    #[test]
    fn test_draw_static_paints_settled_states() {
        let mut engine = engine();
        engine.draw_static(&[birth(0, 0), death(1, 0)]).unwrap();

        assert_eq!(ops(&engine).circles(), vec![(50.0, 50.0, 40.0)]);
        assert_eq!(ops(&engine).rects(), vec![(100.0, 0.0, 100.0, 100.0)]);
        assert!(engine.is_idle());
    }
}
