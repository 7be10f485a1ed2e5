//! Session driver
//!
//! Runs the per-frame sequence around the simulation: tick the world, persist
//! the player's sample if one was taken, then render. Stop requests are only
//! looked at between ticks.

use serde::Serialize;

use crate::error::Result;
use crate::recorder::{DataLog, Sample};
use crate::render::{Canvas, draw_world};
use crate::sim::{GameEvent, TickInput, TickReport, World, tick};

/// Accumulates wall-clock time into whole fixed timesteps
#[derive(Debug, Clone)]
pub struct FixedStep {
    pub dt: f32,
    pub max_substeps: u32,
    accumulator: f32,
}

impl FixedStep {
    pub fn new(tick_rate: u32, max_substeps: u32) -> Self {
        Self {
            dt: 1.0 / tick_rate.max(1) as f32,
            max_substeps,
            accumulator: 0.0,
        }
    }

    /// Feed elapsed seconds; returns how many ticks to run now.
    /// Frames are capped at 0.1s and the tick count at `max_substeps`.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        self.accumulator += elapsed.clamp(0.0, 0.1);
        let mut steps = 0;
        while self.accumulator >= self.dt && steps < self.max_substeps {
            self.accumulator -= self.dt;
            steps += 1;
        }
        steps
    }
}

/// Totals for a finished session
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub resets: u32,
    pub best_score: u32,
    pub final_score: u32,
    pub pipes_cleared: u64,
    pub jumps: u64,
    pub samples_written: usize,
    pub quit: bool,
}

/// A world plus its optional observation log
#[derive(Debug)]
pub struct Session {
    pub world: World,
    log: Option<DataLog>,
    summary: RunSummary,
    stopped: bool,
}

impl Session {
    pub fn new(world: World) -> Self {
        Self {
            world,
            log: None,
            summary: RunSummary::default(),
            stopped: false,
        }
    }

    /// Persist sampled observations to `log`
    pub fn with_log(mut self, log: DataLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Run one frame: tick, record, render. Returns None once stopped.
    pub fn step(&mut self, input: &TickInput, canvas: &mut dyn Canvas) -> Result<Option<TickReport>> {
        if input.quit {
            self.summary.quit = true;
            self.stop();
        }
        if self.stopped {
            return Ok(None);
        }

        let report = tick(&mut self.world, input)?;

        if let (Some(obs), Some(log)) = (report.sample, self.log.as_mut()) {
            log.append(&Sample::from_observation(&obs, &self.world.config))?;
        }

        draw_world(&self.world, canvas);
        self.tally(&report);
        Ok(Some(report))
    }

    fn tally(&mut self, report: &TickReport) {
        let summary = &mut self.summary;
        summary.ticks += 1;
        if report.player_jumped {
            summary.jumps += 1;
        }
        for event in &report.events {
            match event {
                GameEvent::Scored { score, .. } => {
                    summary.pipes_cleared += 1;
                    summary.best_score = summary.best_score.max(*score);
                }
                GameEvent::Reset => summary.resets += 1,
                _ => {}
            }
        }
        if let Some(score) = report.player_score {
            summary.final_score = score;
        }
    }

    /// Step until `max_ticks` have run or an input asks to quit.
    /// `input` is called once per tick with the world's tick counter.
    pub fn run(
        &mut self,
        max_ticks: u64,
        mut input: impl FnMut(u64) -> TickInput,
        canvas: &mut dyn Canvas,
    ) -> Result<RunSummary> {
        while self.summary.ticks < max_ticks {
            let next = input(self.world.time_ticks);
            if self.step(&next, canvas)?.is_none() {
                break;
            }
        }
        self.finish()
    }

    /// Flush the log and return the totals so far
    pub fn finish(&mut self) -> Result<RunSummary> {
        if let Some(log) = self.log.as_mut() {
            log.flush()?;
            self.summary.samples_written = log.written();
        }
        Ok(self.summary.clone())
    }
}
