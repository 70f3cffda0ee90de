use log::{error, info};
use macroquad::prelude::*;

use life_canvas::{
    CellGeometry, DrawingEngine, GameSession, MacroquadSurface, Palette, TickScheduler, input,
};

const GRID_COLUMNS: usize = 40;
const GRID_ROWS: usize = 30;

/// Share of the viewport width the grid may occupy
const GRID_SIZE_PERCENTAGE: f32 = 90.0;

fn window_conf() -> Conf {
    Conf {
        window_title: "Animated Game of Life".to_owned(),
        window_width: 1000,
        window_height: 800,
        window_resizable: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let mut viewport_width = screen_width();
    let geometry =
        CellGeometry::configure(GRID_SIZE_PERCENTAGE, GRID_COLUMNS, GRID_ROWS, viewport_width)
            .expect("startup geometry");

    let (canvas_width, canvas_height) = geometry.canvas_extent();
    info!("drawing area {canvas_width}x{canvas_height} px");

    let palette = Palette::default();
    let mut engine = DrawingEngine::new(TickScheduler::new(), 100.0);
    engine.attach(MacroquadSurface::new());
    engine.set_geometry(geometry);
    engine.set_palette(palette);

    let mut session = GameSession::new(GRID_COLUMNS, GRID_ROWS, engine);
    session.randomize().expect("initial paint");

    loop {
        input::process_keyboard_input(&mut session);
        input::handle_mouse_toggle(&mut session);

        // live resize: rebuild the geometry and repaint from scratch so no
        // stale frame paints with the old coordinates
        let width = screen_width();
        if width != viewport_width {
            viewport_width = width;
            match CellGeometry::configure(GRID_SIZE_PERCENTAGE, GRID_COLUMNS, GRID_ROWS, width) {
                Ok(geometry) => {
                    if let Err(err) = session.reconfigure(geometry) {
                        error!("reconfigure after resize failed: {err}");
                    }
                }
                Err(err) => error!("viewport resize rejected: {err}"),
            }
        }

        if let Err(err) = session.tick(get_frame_time()) {
            error!("generation tick failed: {err}");
        }

        clear_background(palette.background);
        let painted = if session.is_idle() {
            session.draw_current()
        } else {
            session.run_frame(get_time() * 1000.0)
        };
        if let Err(err) = painted {
            error!("paint failed: {err}");
        }

        next_frame().await;
    }
}
