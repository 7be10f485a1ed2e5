//! World state: birds, pipes and the flags input events flip
//!
//! One `World` is one simulation run. Nothing here is global; the driver owns
//! the world and hands it to `tick`.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::bird::Bird;
use super::pipes::PipeField;
use super::policy::Policy;
use super::tick::SampleGate;
use crate::error::Result;
use crate::settings::SimConfig;

/// Stream id for the bird-color RNG, kept apart from the pipe RNG so that
/// spawning extra birds doesn't shift gap positions.
const COLOR_STREAM: u64 = 0xb1d;

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    pub config: SimConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    pub pipes: PipeField,
    /// Live birds, in spawn order
    pub birds: Vec<Bird>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Number of full resets since the run started
    pub resets: u32,
    /// Emit observation samples for the player
    pub recording: bool,
    /// Let the player's policy play instead of input events
    pub autonomous: bool,
    /// Decides which ticks produce an observation sample
    pub sample_gate: SampleGate,
    /// Policy the player bird is recreated with on reset
    pub player_policy: Policy,
    player_id: u32,
    next_id: u32,
    color_rng: Pcg32,
}

impl World {
    /// Create a world with one player bird and one pipe.
    ///
    /// `config` is trusted as-is; use [`World::try_new`] for configs that
    /// haven't been through [`SimConfig::validate`].
    pub fn new(config: SimConfig, seed: u64, player_policy: Policy) -> Self {
        let autonomous = player_policy.is_polled();
        let sample_gate = SampleGate::new(config.frame_max);
        let mut world = Self {
            config,
            seed,
            pipes: PipeField::new(Pcg32::seed_from_u64(seed)),
            birds: Vec::new(),
            time_ticks: 0,
            resets: 0,
            recording: false,
            autonomous,
            sample_gate,
            player_policy,
            player_id: 0,
            next_id: 1,
            color_rng: Pcg32::new(seed, COLOR_STREAM),
        };
        world.populate();
        world
    }

    /// Validate `config`, then build the world
    pub fn try_new(config: SimConfig, seed: u64, player_policy: Policy) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config, seed, player_policy))
    }

    /// Allocate a new bird ID
    fn next_bird_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn populate(&mut self) {
        self.birds.clear();
        let id = self.next_bird_id();
        let bird = Bird::new(
            id,
            self.player_policy.clone(),
            &self.config,
            &mut self.color_rng,
        );
        self.birds.push(bird);
        self.player_id = id;
        self.pipes.reset(&self.config);
    }

    /// Clear back to a single fresh player bird and a single fresh pipe
    pub fn reset(&mut self) {
        self.populate();
        self.resets += 1;
        log::info!("World reset #{} at tick {}", self.resets, self.time_ticks);
    }

    /// Add an extra bird driven by its own policy. Returns its ID.
    pub fn spawn_bird(&mut self, policy: Policy) -> u32 {
        let id = self.next_bird_id();
        let bird = Bird::new(id, policy, &self.config, &mut self.color_rng);
        self.birds.push(bird);
        id
    }

    pub fn player_id(&self) -> u32 {
        self.player_id
    }

    /// The player bird, if it's still alive
    pub fn player(&self) -> Option<&Bird> {
        self.birds.iter().find(|b| b.id == self.player_id)
    }

    pub fn player_mut(&mut self) -> Option<&mut Bird> {
        let id = self.player_id;
        self.birds.iter_mut().find(|b| b.id == id)
    }

    /// Change the player's policy, taking effect now and after resets
    pub fn set_player_policy(&mut self, policy: Policy) {
        if let Some(player) = self.player_mut() {
            player.policy = policy.clone();
        }
        self.player_policy = policy;
    }

    pub fn toggle_recording(&mut self) {
        self.recording = !self.recording;
        log::info!(
            "{}",
            if self.recording {
                "Recording data..."
            } else {
                "Stopped recording data"
            }
        );
    }

    pub fn toggle_autonomous(&mut self) {
        self.autonomous = !self.autonomous;
        log::info!(
            "{}",
            if self.autonomous {
                "Policy is now playing"
            } else {
                "Human is now playing"
            }
        );
    }

    /// Whether a bird's policy gets asked this tick
    pub fn polls_policy(&self, bird: &Bird) -> bool {
        bird.policy.is_polled() && (bird.id != self.player_id || self.autonomous)
    }
}
