//! Fixed timestep simulation tick
//!
//! Core game loop that advances the world deterministically. Within a tick
//! every phase runs for all birds before the next phase starts: pipes move,
//! all birds decide, all birds integrate, then collisions and scoring resolve
//! against the moved pipes.

use serde::{Deserialize, Serialize};

use super::bird::Observation;
use super::collision::hits_pipe;
use super::state::World;
use crate::error::Result;

/// Discrete events from the input collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    Jump,
    ToggleRecording,
    ToggleAutonomous,
    Reset,
    Quit,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Make the player jump
    pub jump: bool,
    pub toggle_recording: bool,
    pub toggle_autonomous: bool,
    /// Start over with a fresh player and pipe
    pub reset: bool,
    /// Stop the session at this tick boundary (the world itself ignores it)
    pub quit: bool,
}

impl TickInput {
    /// Fold a batch of events into one tick's input
    pub fn from_events(events: impl IntoIterator<Item = InputEvent>) -> Self {
        let mut input = Self::default();
        for event in events {
            input.push(event);
        }
        input
    }

    pub fn push(&mut self, event: InputEvent) {
        match event {
            InputEvent::Jump => self.jump = true,
            // Two toggles in one tick cancel out
            InputEvent::ToggleRecording => self.toggle_recording = !self.toggle_recording,
            InputEvent::ToggleAutonomous => self.toggle_autonomous = !self.toggle_autonomous,
            InputEvent::Reset => self.reset = true,
            InputEvent::Quit => self.quit = true,
        }
    }
}

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PipeSpawned { pipe: u32 },
    Jumped { bird: u32 },
    /// The bird's policy failed; it didn't jump
    PolicyFailed { bird: u32 },
    Scored { bird: u32, pipe: u32, score: u32 },
    Died { bird: u32, score: u32 },
    Reset,
}

/// What a tick produced for the outer collaborators
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
    /// Player observation to persist, present when recording and the gate opens
    pub sample: Option<Observation>,
    /// The bird that was the player during decisions jumped, even if it died
    /// later in the tick
    pub player_jumped: bool,
    /// Player's score after the tick (None if the player died this tick and
    /// other birds are still alive)
    pub player_score: Option<u32>,
}

impl TickReport {
    pub fn was_reset(&self) -> bool {
        self.events.contains(&GameEvent::Reset)
    }
}

/// Duty-cycle sampling for the observation log.
///
/// Every jump is sampled. Runs without a jump are sampled once every
/// `frame_max` ticks so the log isn't flooded with no-jump rows.
#[derive(Debug, Clone)]
pub struct SampleGate {
    pub frame_max: u32,
    since_sample: u32,
}

impl SampleGate {
    pub fn new(frame_max: u32) -> Self {
        Self {
            frame_max,
            since_sample: 0,
        }
    }

    /// Advance one tick; returns true if this tick should be sampled
    pub fn check(&mut self, jumped: bool) -> bool {
        if jumped {
            self.since_sample = 0;
            return true;
        }
        self.since_sample += 1;
        if self.since_sample >= self.frame_max {
            self.since_sample = 0;
            true
        } else {
            false
        }
    }
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput) -> Result<TickReport> {
    let mut report = TickReport::default();

    if input.toggle_recording {
        world.toggle_recording();
    }
    if input.toggle_autonomous {
        world.toggle_autonomous();
    }
    if input.reset {
        world.reset();
        report.events.push(GameEvent::Reset);
    }

    world.time_ticks += 1;
    for bird in &mut world.birds {
        bird.begin_tick();
    }

    // --- PIPES ---
    world.pipes.advance(&world.config);
    if world.pipes.maybe_spawn(&world.config) {
        if let Some(pipe) = world.pipes.pipes().last() {
            report.events.push(GameEvent::PipeSpawned { pipe: pipe.id });
        }
    }
    world.pipes.highlight_target(world.config.bird_x);

    // --- DECISIONS ---
    let player_id = world.player_id();
    for i in 0..world.birds.len() {
        let bird = &world.birds[i];
        let wants_jump = if bird.id == player_id && input.jump {
            true
        } else if world.polls_policy(bird) {
            let obs = bird.observe(&world.pipes)?;
            match bird.policy.decide(&obs, &world.config) {
                Ok(jump) => jump,
                Err(err) => {
                    log::warn!("Bird {} policy failed, not jumping: {}", bird.id, err);
                    report.events.push(GameEvent::PolicyFailed { bird: bird.id });
                    false
                }
            }
        } else {
            false
        };

        if wants_jump {
            let bird = &mut world.birds[i];
            bird.jump();
            report.player_jumped |= bird.id == player_id;
            report.events.push(GameEvent::Jumped { bird: bird.id });
        }
    }

    // Sample after decisions so the label matches the observation
    if world.recording {
        let observed = match world.player() {
            Some(player) => Some(player.observe(&world.pipes)?),
            None => None,
        };
        if let Some(obs) = observed {
            if world.sample_gate.check(obs.jumped) {
                report.sample = Some(obs);
            }
        }
    }

    // --- PHYSICS ---
    for bird in &mut world.birds {
        bird.apply_gravity(&world.config);
    }

    // --- COLLISIONS & SCORING ---
    for pipe in world.pipes.pipes_mut() {
        let top = pipe.top();
        let bottom = pipe.bottom();
        for bird in world.birds.iter_mut().filter(|b| b.alive) {
            if pipe.right() < bird.pos.x && pipe.score_pending_for(bird.id) {
                bird.score += 1;
                pipe.award(bird.id);
                log::debug!("Bird {} cleared pipe {} (score {})", bird.id, pipe.id, bird.score);
                report.events.push(GameEvent::Scored {
                    bird: bird.id,
                    pipe: pipe.id,
                    score: bird.score,
                });
            } else if hits_pipe(&bird.rect(), &top, &bottom) {
                bird.alive = false;
                log::debug!("Bird {} hit pipe {} with score {}", bird.id, pipe.id, bird.score);
                report.events.push(GameEvent::Died {
                    bird: bird.id,
                    score: bird.score,
                });
            }
        }
    }

    // Dead birds are compacted out only after the scan
    world.birds.retain(|b| b.alive);
    if world.birds.is_empty() {
        world.reset();
        report.events.push(GameEvent::Reset);
    }

    report.player_score = world.player().map(|b| b.score);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, PolicyError};
    use crate::settings::SimConfig;
    use crate::sim::policy::{Policy, Scorer};

    fn manual_world() -> World {
        World::new(SimConfig::default(), 12345, Policy::Manual)
    }

    /// Put the only pipe at `x` (before this tick's scroll) with the given gap
    fn place_pipe(world: &mut World, x: f32, gap_start: f32) {
        let pipe = &mut world.pipes.pipes_mut()[0];
        pipe.x = x;
        pipe.gap_start = gap_start;
    }

    #[test]
    fn test_manual_jump_from_input() {
        let mut world = manual_world();
        let input = TickInput {
            jump: true,
            ..Default::default()
        };
        let report = tick(&mut world, &input).unwrap();
        assert!(report.events.contains(&GameEvent::Jumped { bird: world.player_id() }));
        assert!(report.player_jumped);
        let player = world.player().unwrap();
        assert!((player.vel - (15.0 - 0.98)).abs() < 1e-4);
        assert!(player.jumped_this_tick);

        tick(&mut world, &TickInput::default()).unwrap();
        assert!(!world.player().unwrap().jumped_this_tick);
    }

    #[test]
    fn test_bird_in_gap_survives() {
        let mut world = manual_world();
        place_pipe(&mut world, 180.0, 100.0);
        world.birds[0].pos.y = 150.0;
        let report = tick(&mut world, &TickInput::default()).unwrap();
        assert!(!report.was_reset());
        assert_eq!(world.birds.len(), 1);
    }

    #[test]
    fn test_bird_in_top_segment_dies() {
        let mut world = manual_world();
        place_pipe(&mut world, 180.0, 100.0);
        let id = world.player_id();
        world.birds[0].pos.y = 50.0;
        let report = tick(&mut world, &TickInput::default()).unwrap();
        assert!(report.events.contains(&GameEvent::Died { bird: id, score: 0 }));
        assert!(report.was_reset());
    }

    #[test]
    fn test_bird_in_bottom_segment_dies() {
        let mut world = manual_world();
        place_pipe(&mut world, 180.0, 100.0);
        world.birds[0].pos.y = 350.0;
        let report = tick(&mut world, &TickInput::default()).unwrap();
        assert!(report.was_reset());
    }

    #[test]
    fn test_score_awarded_once() {
        let mut world = manual_world();
        // After the scroll the right edge sits at 199, just behind the bird
        place_pipe(&mut world, 102.0, 100.0);
        let id = world.player_id();

        let report = tick(&mut world, &TickInput::default()).unwrap();
        assert!(
            report
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::Scored { bird, pipe: 1, score: 1 } if *bird == id))
        );
        assert_eq!(report.player_score, Some(1));

        for _ in 0..30 {
            let report = tick(&mut world, &TickInput::default()).unwrap();
            assert!(!report.events.iter().any(|e| matches!(e, GameEvent::Scored { .. })));
        }
        assert_eq!(world.player().unwrap().score, 1);
    }

    #[test]
    fn test_right_edge_at_bird_edge_not_yet_scored() {
        let mut world = manual_world();
        place_pipe(&mut world, 103.0, 100.0); // right edge lands exactly on 200
        world.birds[0].pos.y = 150.0;
        let report = tick(&mut world, &TickInput::default()).unwrap();
        assert!(!report.events.iter().any(|e| matches!(e, GameEvent::Scored { .. })));
    }

    #[test]
    fn test_each_bird_scores_the_same_pipe() {
        let mut world = manual_world();
        let extra = world.spawn_bird(Policy::Manual);
        place_pipe(&mut world, 102.0, 100.0);
        tick(&mut world, &TickInput::default()).unwrap();
        assert!(world.birds.iter().all(|b| b.score == 1));
        assert!(world.birds.iter().any(|b| b.id == extra));
    }

    #[test]
    fn test_empty_live_set_resets() {
        let mut world = manual_world();
        world.spawn_bird(Policy::Manual);
        place_pipe(&mut world, 180.0, 100.0);
        for bird in &mut world.birds {
            bird.pos.y = 20.0;
            bird.score = 3;
        }

        let report = tick(&mut world, &TickInput::default()).unwrap();
        let deaths = report
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Died { .. }))
            .count();
        assert_eq!(deaths, 2);
        assert!(report.was_reset());
        assert_eq!(world.birds.len(), 1);
        assert_eq!(world.pipes.len(), 1);
        let player = world.player().unwrap();
        assert_eq!(player.score, 0);
        assert_eq!(player.pos.y, world.config.bird_start_y);
        assert_eq!(player.pos.x, world.config.bird_x);
        assert_eq!(report.player_score, Some(0));
    }

    #[test]
    fn test_player_death_with_survivors_does_not_reset() {
        let mut world = manual_world();
        let extra = world.spawn_bird(Policy::Manual);
        place_pipe(&mut world, 180.0, 100.0);
        world.birds[0].pos.y = 20.0;
        world.birds[1].pos.y = 150.0;

        let report = tick(&mut world, &TickInput::default()).unwrap();
        assert!(!report.was_reset());
        assert_eq!(report.player_score, None);
        assert_eq!(world.birds.len(), 1);
        assert_eq!(world.birds[0].id, extra);
    }

    #[test]
    fn test_reset_input() {
        let mut world = manual_world();
        for _ in 0..10 {
            tick(&mut world, &TickInput::default()).unwrap();
        }
        let input = TickInput {
            reset: true,
            ..Default::default()
        };
        let report = tick(&mut world, &input).unwrap();
        assert!(report.was_reset());
        assert_eq!(world.resets, 1);
    }

    #[test]
    fn test_failing_policy_does_not_jump() {
        struct Broken;
        impl Scorer for Broken {
            fn score(&self, _: [f32; 2]) -> std::result::Result<f32, PolicyError> {
                Err(PolicyError::Shape("no model".into()))
            }
        }

        let mut world = World::new(SimConfig::default(), 1, Policy::learned(Broken));
        let report = tick(&mut world, &TickInput::default()).unwrap();
        let id = world.player_id();
        assert!(report.events.contains(&GameEvent::PolicyFailed { bird: id }));
        assert!(!report.events.contains(&GameEvent::Jumped { bird: id }));
        assert!(world.player().unwrap().vel < 0.0);
    }

    #[test]
    fn test_autonomous_off_ignores_policy() {
        let mut world = World::new(SimConfig::default(), 1, Policy::learned(|_: [f32; 2]| -> f32 { 1.0 }));
        let input = TickInput {
            toggle_autonomous: true,
            ..Default::default()
        };
        let report = tick(&mut world, &input).unwrap();
        assert!(!world.autonomous);
        assert!(!report.events.iter().any(|e| matches!(e, GameEvent::Jumped { .. })));
    }

    #[test]
    fn test_heuristic_jumps_when_low() {
        let mut world = World::new(SimConfig::default(), 1, Policy::Heuristic);
        place_pipe(&mut world, 590.0, 100.0); // gap bottom at 320
        world.birds[0].pos.y = 300.0;
        let report = tick(&mut world, &TickInput::default()).unwrap();
        assert!(report.events.contains(&GameEvent::Jumped { bird: world.player_id() }));
    }

    #[test]
    fn test_missing_pipe_ahead_is_an_error() {
        let mut world = manual_world();
        let extra = world.spawn_bird(Policy::Heuristic);
        if let Some(bird) = world.birds.iter_mut().find(|b| b.id == extra) {
            bird.pos.x = 5000.0;
        }
        assert!(matches!(
            tick(&mut world, &TickInput::default()),
            Err(Error::NoPipeAhead { .. })
        ));
    }

    #[test]
    fn test_recording_samples_jumps_and_idle_runs() {
        let mut world = manual_world();
        let input = TickInput {
            toggle_recording: true,
            jump: true,
            ..Default::default()
        };
        let report = tick(&mut world, &input).unwrap();
        let sample = report.sample.expect("jump should be sampled");
        assert!(sample.jumped);
        assert_eq!(sample.y, world.config.bird_start_y);

        let mut sampled = 0;
        for _ in 0..world.config.frame_max {
            let report = tick(&mut world, &TickInput::default()).unwrap();
            if let Some(sample) = report.sample {
                assert!(!sample.jumped);
                sampled += 1;
            }
        }
        assert_eq!(sampled, 1);
    }

    #[test]
    fn test_sample_gate() {
        let mut gate = SampleGate::new(3);
        assert!(!gate.check(false));
        assert!(!gate.check(false));
        assert!(gate.check(false));
        assert!(!gate.check(false));
        assert!(gate.check(true));
        assert!(!gate.check(false));
        assert!(!gate.check(false));
        assert!(gate.check(false));
    }

    #[test]
    fn test_input_from_events() {
        let input = TickInput::from_events([
            InputEvent::Jump,
            InputEvent::ToggleRecording,
            InputEvent::ToggleRecording,
            InputEvent::Quit,
        ]);
        assert!(input.jump);
        assert!(!input.toggle_recording);
        assert!(input.quit);
    }

    #[test]
    fn test_spawns_follow_spacing() {
        let mut world = manual_world();
        let mut spawned = Vec::new();
        for t in 1..=250u64 {
            let report = tick(&mut world, &TickInput::default()).unwrap();
            if report
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::PipeSpawned { .. }))
            {
                spawned.push(t);
            }
            if report.was_reset() {
                break;
            }
        }
        assert_eq!(spawned.first(), Some(&101));
    }

    #[test]
    fn test_determinism() {
        // Two worlds with the same seed and inputs stay identical
        let mut world1 = World::new(SimConfig::default(), 99999, Policy::Heuristic);
        let mut world2 = World::new(SimConfig::default(), 99999, Policy::Heuristic);
        world1.spawn_bird(Policy::Heuristic);
        world2.spawn_bird(Policy::Heuristic);

        for t in 0..2000 {
            let input = TickInput {
                jump: t % 37 == 0,
                ..Default::default()
            };
            tick(&mut world1, &input).unwrap();
            tick(&mut world2, &input).unwrap();
        }

        assert_eq!(world1.time_ticks, world2.time_ticks);
        assert_eq!(world1.resets, world2.resets);
        assert_eq!(world1.birds.len(), world2.birds.len());
        for (a, b) in world1.birds.iter().zip(&world2.birds) {
            assert_eq!(a.pos, b.pos);
            assert_eq!(a.score, b.score);
        }
        let gaps1: Vec<f32> = world1.pipes.pipes().iter().map(|p| p.gap_start).collect();
        let gaps2: Vec<f32> = world2.pipes.pipes().iter().map(|p| p.gap_start).collect();
        assert_eq!(gaps1, gaps2);
    }

    #[test]
    fn test_all_birds_decide_before_any_moves() {
        use std::sync::{Arc, Mutex};

        let mut world = manual_world();
        let seen: Arc<Mutex<Vec<[f32; 2]>>> = Arc::default();
        let log = Arc::clone(&seen);
        let always = Policy::learned(move |input: [f32; 2]| -> f32 {
            log.lock().unwrap().push(input);
            1.0
        });
        let low = world.spawn_bird(always.clone());
        let high = world.spawn_bird(always);
        place_pipe(&mut world, 180.0, 100.0);
        // Player is in the top segment and dies; the other two stay in the gap
        world.birds[0].pos.y = 50.0;
        world.birds[1].pos.y = 250.0;
        world.birds[2].pos.y = 150.0;

        let report = tick(&mut world, &TickInput::default()).unwrap();

        // Both observations were taken from pre-physics positions
        assert_eq!(
            *seen.lock().unwrap(),
            vec![[250.0 / 550.0, 320.0 / 600.0], [150.0 / 550.0, 320.0 / 600.0]]
        );
        let moved: Vec<f32> = world.birds.iter().map(|b| b.pos.y).collect();
        assert_eq!(world.birds.len(), 2);
        assert!(moved[0] < 250.0 && moved[1] < 150.0);

        // Every jump is reported before any collision outcome
        let last_jump = report
            .events
            .iter()
            .rposition(|e| matches!(e, GameEvent::Jumped { .. }))
            .unwrap();
        let first_death = report
            .events
            .iter()
            .position(|e| matches!(e, GameEvent::Died { .. }))
            .unwrap();
        assert!(last_jump < first_death);
        assert!(report.events.contains(&GameEvent::Jumped { bird: low }));
        assert!(report.events.contains(&GameEvent::Jumped { bird: high }));
        assert!(!report.player_jumped);
    }

    #[test]
    fn test_default_cadence_always_has_pipe_ahead() {
        let mut world = World::new(SimConfig::default(), 166, Policy::Heuristic);
        world.spawn_bird(Policy::Heuristic);
        for t in 0..5000 {
            if let Err(err) = tick(&mut world, &TickInput::default()) {
                panic!("tick {t} failed: {err}");
            }
        }
    }
}
