//! Pipe spawning, scrolling and retirement
//!
//! Pipes always spawn at the right edge of the world and all move at the same
//! speed, so spawn order is also left-to-right order. Nothing here ever
//! re-sorts the sequence.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::settings::SimConfig;

/// A pair of pipe segments with a gap between them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipe {
    pub id: u32,
    /// Left edge (decreases every tick)
    pub x: f32,
    pub width: f32,
    /// Y of the top of the gap (height of the top segment)
    pub gap_start: f32,
    pub gap_size: f32,
    pub world_height: f32,
    /// Birds that have already been awarded a point for this pipe
    #[serde(default)]
    pub scored_by: Vec<u32>,
    /// The pipe the player is currently heading for (render emphasis only)
    #[serde(default)]
    pub target: bool,
}

impl Pipe {
    pub fn new(id: u32, x: f32, gap_start: f32, config: &SimConfig) -> Self {
        Self {
            id,
            x,
            width: config.pipe_width,
            gap_start,
            gap_size: config.gap_size,
            world_height: config.world_height,
            scored_by: Vec::new(),
            target: false,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Y of the bottom of the gap (top of the lower segment)
    #[inline]
    pub fn gap_bottom(&self) -> f32 {
        self.gap_start + self.gap_size
    }

    /// Upper segment, from the ceiling down to the gap
    pub fn top(&self) -> Rect {
        Rect::new(self.x, 0.0, self.width, self.gap_start)
    }

    /// Lower segment, from the gap down to the floor
    pub fn bottom(&self) -> Rect {
        let y = self.gap_bottom();
        Rect::new(self.x, y, self.width, self.world_height - y)
    }

    /// Whether `bird_id` still has a point to collect from this pipe
    pub fn score_pending_for(&self, bird_id: u32) -> bool {
        !self.scored_by.contains(&bird_id)
    }

    pub fn award(&mut self, bird_id: u32) {
        if self.score_pending_for(bird_id) {
            self.scored_by.push(bird_id);
        }
    }
}

/// Owns the ordered pipe sequence and the RNG that places gaps
#[derive(Debug, Clone)]
pub struct PipeField {
    pipes: Vec<Pipe>,
    rng: Pcg32,
    next_id: u32,
}

impl PipeField {
    pub fn new(rng: Pcg32) -> Self {
        Self {
            pipes: Vec::new(),
            rng,
            next_id: 1,
        }
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn pipes_mut(&mut self) -> &mut [Pipe] {
        &mut self.pipes
    }

    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }

    /// Drop every pipe and seed a single fresh one at the right edge
    pub fn reset(&mut self, config: &SimConfig) {
        self.pipes.clear();
        self.spawn(config);
    }

    /// Append a new pipe at x = world width with a random gap.
    /// `config` must have passed [`SimConfig::validate`].
    pub fn spawn(&mut self, config: &SimConfig) -> &Pipe {
        let (lo, hi) = config.gap_start_range();
        let gap_start = self.rng.random_range(lo..=hi) as f32;
        let id = self.next_id;
        self.next_id += 1;
        log::debug!("Spawned pipe {} with gap at {}", id, gap_start);
        self.pipes
            .push(Pipe::new(id, config.world_width, gap_start, config));
        &self.pipes[self.pipes.len() - 1]
    }

    /// Scroll every pipe left and retire those fully off-screen
    pub fn advance(&mut self, config: &SimConfig) {
        for pipe in &mut self.pipes {
            pipe.x -= config.pipe_speed;
        }
        // retain is stable, so spawn order survives
        self.pipes.retain(|p| p.right() >= 0.0);
    }

    /// Spawn a pipe once the newest one has scrolled past the spacing line.
    /// Returns true if a pipe was added.
    pub fn maybe_spawn(&mut self, config: &SimConfig) -> bool {
        let threshold = config.world_width - config.pipe_spacing;
        let due = self.pipes.last().is_none_or(|last| last.x < threshold);
        if due {
            self.spawn(config);
        }
        due
    }

    /// First pipe (in spawn order) whose right edge hasn't passed `x`
    pub fn next_ahead(&self, x: f32) -> Option<&Pipe> {
        self.pipes.iter().find(|p| p.right() >= x)
    }

    /// Flag the pipe ahead of `x` as the current target; clear all others
    pub fn highlight_target(&mut self, x: f32) {
        let target_id = self.next_ahead(x).map(|p| p.id);
        for pipe in &mut self.pipes {
            pipe.target = Some(pipe.id) == target_id;
        }
    }
}
