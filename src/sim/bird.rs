//! The bird: kinematics, jumping and what it can observe
//!
//! Velocity is positive upward while y grows downward, so integrating is
//! `y -= vel`.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::pipes::PipeField;
use super::policy::Policy;
use super::rect::Rect;
use crate::error::{Error, Result};
use crate::settings::SimConfig;

/// Raw observation a policy decides on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Bird's top edge
    pub y: f32,
    /// Y of the bottom of the gap in the next pipe ahead
    pub gap_bottom: f32,
    pub jumped: bool,
}

impl Observation {
    /// Scale both positions into [0, 1] for logging and inference
    pub fn normalized(&self, config: &SimConfig) -> [f32; 2] {
        [
            self.y / config.floor_y(),
            self.gap_bottom / config.world_height,
        ]
    }
}

/// A bird entity
#[derive(Debug, Clone)]
pub struct Bird {
    pub id: u32,
    /// Top-left corner; x never changes
    pub pos: Vec2,
    pub size: f32,
    /// Vertical velocity, positive = up
    pub vel: f32,
    pub jump_impulse: f32,
    pub alive: bool,
    pub score: u32,
    /// Set by `jump`, cleared at the start of every tick
    pub jumped_this_tick: bool,
    pub policy: Policy,
    /// RGB, cosmetic
    pub color: [u8; 3],
}

impl Bird {
    pub fn new(id: u32, policy: Policy, config: &SimConfig, rng: &mut impl Rng) -> Self {
        Self {
            id,
            pos: Vec2::new(config.bird_x, config.bird_start_y),
            size: config.bird_size,
            vel: 0.0,
            jump_impulse: config.jump_impulse,
            alive: true,
            score: 0,
            jumped_this_tick: false,
            policy,
            color: random_color(rng),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size, self.size)
    }

    pub fn begin_tick(&mut self) {
        self.jumped_this_tick = false;
    }

    /// Overwrite velocity with the jump impulse
    pub fn jump(&mut self) {
        self.vel = self.jump_impulse;
        self.jumped_this_tick = true;
    }

    /// Integrate one tick of gravity and clamp to the world.
    ///
    /// The velocity floor only limits how fast the bird can fall (to one
    /// jump's worth); rising speed is bounded by the jump impulse itself.
    pub fn apply_gravity(&mut self, config: &SimConfig) {
        self.vel -= config.gravity;
        self.pos.y -= self.vel;

        if self.vel < -self.jump_impulse {
            self.vel = -self.jump_impulse;
        }

        let floor = config.world_height - self.size;
        if self.pos.y > floor {
            self.pos.y = floor;
            self.vel = 0.0;
        } else if self.pos.y < 0.0 {
            self.pos.y = 0.0;
            self.vel = 0.0;
        }
    }

    /// Observe the next pipe ahead of this bird
    pub fn observe(&self, pipes: &PipeField) -> Result<Observation> {
        let next = pipes
            .next_ahead(self.pos.x)
            .ok_or(Error::NoPipeAhead { x: self.pos.x })?;
        Ok(Observation {
            y: self.pos.y,
            gap_bottom: next.gap_bottom(),
            jumped: self.jumped_this_tick,
        })
    }
}

fn random_color(rng: &mut impl Rng) -> [u8; 3] {
    // Keep channels bright enough to read against a black background
    [
        rng.random_range(80..=255),
        rng.random_range(80..=255),
        rng.random_range(80..=255),
    ]
}
