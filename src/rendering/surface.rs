use macroquad::prelude::{Color, draw_circle, draw_rectangle};

/// Colors used when painting cells. Stands in for the CSS-variable theming
/// a browser canvas would read; hosts may supply their own.
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub alive: Color,
    pub background: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            alive: Color::from_rgba(0, 255, 150, 255),
            background: Color::from_rgba(15, 15, 15, 255),
        }
    }
}

/// Narrow capability interface over a 2D immediate-mode paint surface.
/// The engine needs exactly these operations, which keeps it decoupled from
/// any concrete backend and testable against a recording fake.
pub trait PaintSurface {
    fn begin_path(&mut self);
    fn arc(&mut self, cx: f32, cy: f32, radius: f32, start_angle: f32, end_angle: f32);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    fn set_fill_style(&mut self, color: Color);
    fn set_line_width(&mut self, width: f32);
    fn fill(&mut self);
}

/// PaintSurface backed by macroquad's immediate-mode draw calls
#[derive(Default)]
pub struct MacroquadSurface {
    fill_style: Color,
    path: Option<PendingArc>,
}

struct PendingArc {
    cx: f32,
    cy: f32,
    radius: f32,
}

impl MacroquadSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PaintSurface for MacroquadSurface {
    fn begin_path(&mut self) {
        self.path = None;
    }

    fn arc(&mut self, cx: f32, cy: f32, radius: f32, _start_angle: f32, _end_angle: f32) {
        // the engine only ever produces full circles, so the pending path
        // keeps the center and radius and ignores the sweep
        self.path = Some(PendingArc { cx, cy, radius });
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        draw_rectangle(x, y, width, height, self.fill_style);
    }

    fn set_fill_style(&mut self, color: Color) {
        self.fill_style = color;
    }

    fn set_line_width(&mut self, _width: f32) {
        // circles are filled, never stroked; nothing to remember
    }

    fn fill(&mut self) {
        if let Some(arc) = self.path.take() {
            draw_circle(arc.cx, arc.cy, arc.radius, self.fill_style);
        }
    }
}
