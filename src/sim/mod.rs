//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, file or platform dependencies

pub mod bird;
pub mod collision;
pub mod pipes;
pub mod policy;
pub mod rect;
pub mod state;
pub mod tick;

pub use bird::{Bird, Observation};
pub use collision::{hits_pipe, rects_overlap};
pub use pipes::{Pipe, PipeField};
pub use policy::{Policy, Scorer, should_jump};
pub use rect::Rect;
pub use state::World;
pub use tick::{GameEvent, InputEvent, SampleGate, TickInput, TickReport, tick};
