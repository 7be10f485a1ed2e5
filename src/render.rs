//! Drawing interface
//!
//! The simulation never draws pixels itself. After each tick the driver walks
//! the world and hands every drawable rectangle to a [`Canvas`].

use serde::{Deserialize, Serialize};

use crate::sim::{Rect, World};

/// RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0, 0, 0);
    pub const GREEN: Color = Color(0, 255, 0);
    pub const DARK_GREEN: Color = Color(0, 150, 0);
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Color(r, g, b)
    }
}

/// Render collaborator
pub trait Canvas {
    /// Start a frame
    fn clear(&mut self, _color: Color) {}

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Player score for the HUD
    fn score(&mut self, _score: u32) {}
}

/// Draw the whole world: background, pipes, birds, then the score
pub fn draw_world(world: &World, canvas: &mut dyn Canvas) {
    canvas.clear(Color::BLACK);

    for pipe in world.pipes.pipes() {
        let color = if pipe.target {
            Color::DARK_GREEN
        } else {
            Color::GREEN
        };
        canvas.fill_rect(pipe.top(), color);
        canvas.fill_rect(pipe.bottom(), color);
    }

    for bird in &world.birds {
        canvas.fill_rect(bird.rect(), bird.color.into());
    }

    canvas.score(world.player().map_or(0, |b| b.score));
}

/// Canvas that just keeps the last frame's draw calls
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub rects: Vec<(Rect, Color)>,
    pub score: u32,
    pub frames: u64,
}

impl Canvas for DrawList {
    fn clear(&mut self, _color: Color) {
        self.rects.clear();
        self.frames += 1;
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.rects.push((rect, color));
    }

    fn score(&mut self, score: u32) {
        self.score = score;
    }
}

/// Canvas that discards everything (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCanvas;

impl Canvas for NullCanvas {
    fn fill_rect(&mut self, _rect: Rect, _color: Color) {}
}
