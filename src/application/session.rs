use log::debug;

use crate::domain::{Grid, Rule, default_rule};
use crate::rendering::{CellGeometry, DrawingEngine, FrameScheduler, PaintSurface, RenderError};

/// Grids at or above this cell count evolve on the rayon pool
const PARALLEL_GRID_THRESHOLD: usize = 10_000;

const MIN_UPDATES_PER_SECOND: f32 = 1.0;
const MAX_UPDATES_PER_SECOND: f32 = 60.0;

/// GameSession orchestrates the simulation. This is the application layer:
/// it owns the grid, the drawing engine and the generation timer, and turns
/// elapsed wall time into generations and redraw requests.
pub struct GameSession<C: FrameScheduler, P: PaintSurface> {
    pub grid: Grid,
    engine: DrawingEngine<C, P>,
    rule: Box<dyn Rule>,
    pub is_running: bool,
    pub generation: u64,
    update_timer: f32,
    updates_per_second: f32,
}

impl<C: FrameScheduler, P: PaintSurface> GameSession<C, P> {
    /// Create a session over an equipped drawing engine
    pub fn new(columns: usize, rows: usize, mut engine: DrawingEngine<C, P>) -> Self {
        let updates_per_second = 10.0;
        engine.update_interval_duration(f64::from(1000.0 / updates_per_second));
        Self {
            grid: Grid::new(columns, rows),
            engine,
            rule: default_rule(),
            is_running: false,
            generation: 0,
            update_timer: 0.0,
            updates_per_second,
        }
    }

    pub fn engine(&self) -> &DrawingEngine<C, P> {
        &self.engine
    }

    pub const fn updates_per_second(&self) -> f32 {
        self.updates_per_second
    }

    /// Generation interval in milliseconds at the current speed
    pub fn interval_ms(&self) -> f64 {
        f64::from(1000.0 / self.updates_per_second)
    }

    pub fn geometry(&self) -> Option<CellGeometry> {
        self.engine.geometry().copied()
    }

    /// Set the cellular automaton rule
    pub fn set_rule(&mut self, rule: Box<dyn Rule>) {
        self.rule = rule;
    }

    /// Toggle play/pause state
    pub fn toggle_running(&mut self) {
        self.is_running = !self.is_running;
    }

    /// Adjust simulation speed. The matching animation duration applies to
    /// timelines started after this call; in-flight ones are unaffected.
    pub fn adjust_speed(&mut self, delta: f32) {
        self.updates_per_second = (self.updates_per_second + delta)
            .clamp(MIN_UPDATES_PER_SECOND, MAX_UPDATES_PER_SECOND);
        self.engine.update_interval_duration(self.interval_ms());
    }

    /// Re-seed the grid and repaint; pauses the simulation
    pub fn randomize(&mut self) -> Result<(), RenderError> {
        self.grid.randomize();
        self.generation = 0;
        self.is_running = false;
        self.request_redraw()
    }

    /// Kill every cell and repaint; pauses the simulation
    pub fn clear(&mut self) -> Result<(), RenderError> {
        self.grid.clear();
        self.generation = 0;
        self.is_running = false;
        self.request_redraw()
    }

    /// Flip a single cell (grid editing) and animate the change
    pub fn toggle_cell(&mut self, x: usize, y: usize) -> Result<(), RenderError> {
        match self.grid.toggle(x, y) {
            Some(_) => self.request_redraw(),
            None => Ok(()),
        }
    }

    /// Advance the simulation clock; fires a generation once the interval
    /// at the current speed has elapsed. This is the main loop coordination.
    pub fn tick(&mut self, delta_time: f32) -> Result<(), RenderError> {
        if !self.is_running {
            return Ok(());
        }

        self.update_timer += delta_time;
        let update_interval = 1.0 / self.updates_per_second;
        if self.update_timer < update_interval {
            return Ok(());
        }
        self.update_timer = 0.0;

        self.grid = if self.grid.cell_count() >= PARALLEL_GRID_THRESHOLD {
            self.grid.next_generation_parallel(self.rule.as_ref())
        } else {
            self.grid.next_generation(self.rule.as_ref())
        };
        self.generation += 1;
        debug!(
            "generation {}: {} alive",
            self.generation,
            self.grid.population()
        );
        self.request_redraw()
    }

    /// Advance every live animation timeline; call once per display refresh
    pub fn run_frame(&mut self, now_ms: f64) -> Result<(), RenderError> {
        self.engine.run_frame(now_ms)
    }

    /// Settled repaint of the current grid, for frames with no animation
    pub fn draw_current(&mut self) -> Result<(), RenderError> {
        self.engine.draw_static(self.grid.cells())
    }

    pub fn is_idle(&self) -> bool {
        self.engine.is_idle()
    }

    /// Swap in geometry for a resized viewport or grid. In-flight
    /// animations are cancelled so no stale frame paints with the old
    /// coordinates, then the grid is repainted from scratch.
    pub fn reconfigure(&mut self, geometry: CellGeometry) -> Result<(), RenderError> {
        self.engine.cancel_animations();
        self.engine.set_geometry(geometry);
        self.request_redraw()
    }

    fn request_redraw(&mut self) -> Result<(), RenderError> {
        self.engine.request_draw(self.grid.cells())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::scheduler::testing::RecordingScheduler;
    use crate::rendering::surface::testing::RecordingSurface;

    fn session() -> GameSession<RecordingScheduler, RecordingSurface> {
        let mut engine = DrawingEngine::new(RecordingScheduler::default(), 100.0);
        engine.attach(RecordingSurface::default());
        engine.set_geometry(CellGeometry::configure(80.0, 5, 5, 1000.0).unwrap());
        GameSession::new(5, 5, engine)
    }

    fn blinker_session() -> GameSession<RecordingScheduler, RecordingSurface> {
        let mut session = session();
        session.grid.set_alive(1, 2, true);
        session.grid.set_alive(2, 2, true);
        session.grid.set_alive(3, 2, true);
        session
    }

    #[test]
    fn test_tick_fires_generation_after_interval() {
        let mut session = blinker_session();
        session.toggle_running();

        // default speed is 10 generations per second
        session.tick(0.05).unwrap();
        assert_eq!(session.generation, 0);
        assert!(session.is_idle());

        session.tick(0.06).unwrap();
        assert_eq!(session.generation, 1);
        assert_eq!(session.engine().active_timelines(), 1);
        assert!(session.grid.get(2, 1).unwrap().is_alive());
    }

    #[test]
    fn test_tick_is_inert_while_paused() {
        let mut session = blinker_session();
        session.tick(10.0).unwrap();
        assert_eq!(session.generation, 0);
        assert!(session.is_idle());
    }

    #[test]
    fn test_adjust_speed_clamps() {
        let mut session = session();
        session.adjust_speed(1000.0);
        assert_eq!(session.updates_per_second(), 60.0);
        session.adjust_speed(-1000.0);
        assert_eq!(session.updates_per_second(), 1.0);
    }

    #[test]
    fn test_randomize_pauses_and_redraws() {
        let mut session = blinker_session();
        session.toggle_running();
        session.tick(0.2).unwrap();
        assert_eq!(session.generation, 1);

        session.randomize().unwrap();
        assert!(!session.is_running);
        assert_eq!(session.generation, 0);
        // the generation draw plus the randomize repaint
        assert_eq!(session.engine().active_timelines(), 2);
    }

    #[test]
    fn test_toggle_cell_requests_redraw_only_in_bounds() {
        let mut session = session();
        session.toggle_cell(1, 1).unwrap();
        assert!(session.grid.get(1, 1).unwrap().is_alive());
        assert_eq!(session.engine().active_timelines(), 1);

        session.toggle_cell(99, 99).unwrap();
        assert_eq!(session.engine().active_timelines(), 1);
    }

    #[test]
    fn test_reconfigure_cancels_in_flight_timelines() {
        let mut session = blinker_session();
        session.toggle_running();
        session.tick(0.2).unwrap();
        assert_eq!(session.engine().active_timelines(), 1);

        let geometry = CellGeometry::configure(40.0, 5, 5, 500.0).unwrap();
        session.reconfigure(geometry).unwrap();

        // old timeline gone, exactly one fresh repaint in flight
        assert_eq!(session.engine().active_timelines(), 1);
        assert_eq!(session.engine().geometry().copied(), Some(geometry));
        assert_eq!(session.engine().scheduler().cancelled.len(), 1);
    }
}
