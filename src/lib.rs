//! Flappy Learn - a side-scrolling pipe-dodging simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bird physics, pipes, collisions, policies)
//! - `model`: Feed-forward scorer used by the learned policy
//! - `recorder`: Append-only observation log for offline training
//! - `render`: Drawing interface the simulation hands rectangles to
//! - `runner`: Session driver (tick, record, render) and fixed-step clock
//! - `settings`: Simulation configuration

pub mod error;
pub mod model;
pub mod recorder;
pub mod render;
pub mod runner;
pub mod settings;
pub mod sim;

pub use error::{Error, PolicyError, Result};
pub use settings::SimConfig;

/// Game configuration constants
pub mod consts {
    /// Logical frame rate (ticks per second)
    pub const TICK_RATE: u32 = 60;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World dimensions
    pub const WORLD_WIDTH: f32 = 600.0;
    pub const WORLD_HEIGHT: f32 = 600.0;

    /// Downward acceleration per tick
    pub const GRAVITY: f32 = 0.98;

    /// Bird defaults
    pub const BIRD_X: f32 = 200.0;
    pub const BIRD_START_Y: f32 = WORLD_HEIGHT / 4.0;
    pub const BIRD_SIZE: f32 = 50.0;
    /// Upward velocity set by a jump; also the floor on velocity
    pub const JUMP_IMPULSE: f32 = 15.0;

    /// Pipe defaults
    pub const PIPE_WIDTH: f32 = 100.0;
    pub const PIPE_SPEED: f32 = 3.0;
    /// Horizontal distance between consecutive pipes
    pub const PIPE_SPACING: f32 = 300.0;
    /// Vertical opening between top and bottom segments
    pub const GAP_SIZE: f32 = 220.0;
    pub const GAP_MARGIN_TOP: f32 = 80.0;
    pub const GAP_MARGIN_BOTTOM: f32 = 80.0;

    /// Heuristic policy: jump when the bird's bottom is this close to the gap bottom
    pub const HEURISTIC_MARGIN: f32 = 20.0;
    /// Learned policy: jump when the score is above this
    pub const JUMP_THRESHOLD: f32 = 0.5;

    /// Record a no-jump sample after this many ticks without one
    pub const FRAME_MAX: u32 = 20;
}
