use log::error;
use macroquad::prelude::*;

use crate::application::GameSession;
use crate::rendering::{FrameScheduler, PaintSurface, RenderError};

/// Process keyboard input: space toggles play/pause, R reseeds, C clears,
/// Up/Down adjust the simulation speed
pub fn process_keyboard_input<C: FrameScheduler, P: PaintSurface>(
    session: &mut GameSession<C, P>,
) {
    let actions: [(KeyCode, fn(&mut GameSession<C, P>) -> Result<(), RenderError>); 5] = [
        (KeyCode::Space, |s| {
            s.toggle_running();
            Ok(())
        }),
        (KeyCode::C, GameSession::clear),
        (KeyCode::R, GameSession::randomize),
        (KeyCode::Up, |s| {
            s.adjust_speed(1.0);
            Ok(())
        }),
        (KeyCode::Down, |s| {
            s.adjust_speed(-1.0);
            Ok(())
        }),
    ];

    for (key, action) in actions {
        if is_key_pressed(key) {
            if let Err(err) = action(session) {
                error!("input action failed: {err}");
            }
        }
    }
}

/// Toggle the clicked cell while the simulation is paused. Clicks outside
/// the grid or while running are ignored.
pub fn handle_mouse_toggle<C: FrameScheduler, P: PaintSurface>(session: &mut GameSession<C, P>) {
    if session.is_running || !is_mouse_button_pressed(MouseButton::Left) {
        return;
    }
    let Some(geometry) = session.geometry() else {
        return;
    };
    let (mx, my) = mouse_position();
    if let Some((x, y)) = geometry.cell_at(mx, my) {
        if let Err(err) = session.toggle_cell(x, y) {
            error!("cell toggle failed: {err}");
        }
    }
}
