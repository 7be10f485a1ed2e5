//! Simulation configuration
//!
//! Loaded from a JSON file; any key left out falls back to the defaults in
//! [`crate::consts`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};

/// Every tunable of the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === World ===
    pub world_width: f32,
    pub world_height: f32,
    /// Logical frame rate, used only for real-time pacing
    pub tick_rate: u32,

    // === Bird ===
    pub gravity: f32,
    pub bird_x: f32,
    pub bird_start_y: f32,
    pub bird_size: f32,
    pub jump_impulse: f32,

    // === Pipes ===
    pub pipe_width: f32,
    pub pipe_speed: f32,
    pub pipe_spacing: f32,
    pub gap_size: f32,
    pub gap_margin_top: f32,
    pub gap_margin_bottom: f32,

    // === Policies ===
    pub heuristic_margin: f32,
    pub jump_threshold: f32,

    // === Recording ===
    /// Ticks without a jump before a no-jump sample is taken
    pub frame_max: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            tick_rate: TICK_RATE,

            gravity: GRAVITY,
            bird_x: BIRD_X,
            bird_start_y: BIRD_START_Y,
            bird_size: BIRD_SIZE,
            jump_impulse: JUMP_IMPULSE,

            pipe_width: PIPE_WIDTH,
            pipe_speed: PIPE_SPEED,
            pipe_spacing: PIPE_SPACING,
            gap_size: GAP_SIZE,
            gap_margin_top: GAP_MARGIN_TOP,
            gap_margin_bottom: GAP_MARGIN_BOTTOM,

            heuristic_margin: HEURISTIC_MARGIN,
            jump_threshold: JUMP_THRESHOLD,

            frame_max: FRAME_MAX,
        }
    }
}

impl SimConfig {
    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the config as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Lowest y the bird may occupy (the floor)
    #[inline]
    pub fn floor_y(&self) -> f32 {
        self.world_height - self.bird_size
    }

    /// Inclusive range of gap start offsets a new pipe can draw from
    pub fn gap_start_range(&self) -> (u32, u32) {
        let lo = self.gap_margin_top.ceil() as u32;
        let hi = (self.world_height - self.gap_size - self.gap_margin_bottom).floor() as u32;
        (lo, hi)
    }

    /// Reject configs that can't produce a playable world
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("bird_size", self.bird_size),
            ("pipe_width", self.pipe_width),
            ("pipe_speed", self.pipe_speed),
            ("pipe_spacing", self.pipe_spacing),
            ("gap_size", self.gap_size),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Config(format!("{name} must be positive, got {value}")));
            }
        }
        if !self.gravity.is_finite() || !self.jump_impulse.is_finite() {
            return Err(Error::Config("gravity and jump_impulse must be finite".into()));
        }
        if self.gap_margin_top < 0.0 || self.gap_margin_bottom < 0.0 {
            return Err(Error::Config("gap margins must not be negative".into()));
        }
        if self.gap_margin_top + self.gap_size + self.gap_margin_bottom > self.world_height {
            return Err(Error::Config(format!(
                "gap of {} with margins {}/{} does not fit a world {} high",
                self.gap_size, self.gap_margin_top, self.gap_margin_bottom, self.world_height
            )));
        }
        let (lo, hi) = self.gap_start_range();
        if lo > hi {
            return Err(Error::Config(format!(
                "no whole-pixel gap start between margins {}/{}",
                self.gap_margin_top, self.gap_margin_bottom
            )));
        }
        if self.bird_size > self.world_height {
            return Err(Error::Config("bird is taller than the world".into()));
        }
        if !(0.0..=self.floor_y()).contains(&self.bird_start_y) {
            return Err(Error::Config(format!(
                "bird_start_y {} outside [0, {}]",
                self.bird_start_y,
                self.floor_y()
            )));
        }
        // The newest pipe must still reach past the birds when the next one spawns
        let trailing_edge = self.world_width - self.pipe_spacing - self.pipe_speed + self.pipe_width;
        if trailing_edge < self.bird_x {
            return Err(Error::Config(format!(
                "pipe_spacing {} leaves no pipe ahead of x = {} (last pipe ends at {})",
                self.pipe_spacing, self.bird_x, trailing_edge
            )));
        }
        if self.tick_rate == 0 {
            return Err(Error::Config("tick_rate must be positive".into()));
        }
        Ok(())
    }
}
