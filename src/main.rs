//! Flappy Learn headless runner
//!
//! Runs the simulation without a window: pick a policy, optionally record
//! observations for training, and print a summary when done.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};

use flappy_learn::consts::MAX_SUBSTEPS;
use flappy_learn::model::DenseNet;
use flappy_learn::recorder::DataLog;
use flappy_learn::render::NullCanvas;
use flappy_learn::runner::{FixedStep, RunSummary, Session};
use flappy_learn::sim::{Policy, TickInput, World};
use flappy_learn::{Error, Result, SimConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    Manual,
    Heuristic,
    Learned,
}

#[derive(Debug, Parser)]
#[command(name = "flappy-learn", about = "Headless pipe-dodging simulation")]
struct Args {
    /// Number of ticks to simulate
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// Run seed
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Policy for the player bird
    #[arg(long, value_enum, default_value_t = PolicyArg::Heuristic)]
    policy: PolicyArg,

    /// Model weights (JSON) for the learned policy
    #[arg(long)]
    model: Option<PathBuf>,

    /// Append observation samples to this file
    #[arg(long)]
    record: Option<PathBuf>,

    /// Simulation config (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra heuristic birds flying alongside the player
    #[arg(long, default_value_t = 0)]
    extra_birds: u32,

    /// Manual policy only: jump every N ticks (0 = never)
    #[arg(long, default_value_t = 0)]
    jump_every: u64,

    /// Pace ticks at the configured tick rate instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn build_policy(args: &Args) -> Result<Policy> {
    Ok(match args.policy {
        PolicyArg::Manual => Policy::Manual,
        PolicyArg::Heuristic => Policy::Heuristic,
        PolicyArg::Learned => {
            let path = args
                .model
                .as_ref()
                .ok_or_else(|| Error::Config("--policy learned needs --model <path>".into()))?;
            Policy::learned(DenseNet::load(path)?)
        }
    })
}

fn run(args: &Args) -> Result<RunSummary> {
    let config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let tick_rate = config.tick_rate;

    let mut world = World::try_new(config, args.seed, build_policy(args)?)?;
    for _ in 0..args.extra_birds {
        world.spawn_bird(Policy::Heuristic);
    }

    let mut session = Session::new(world);
    if let Some(path) = &args.record {
        session = session.with_log(DataLog::open(path)?);
    }

    let jump_every = args.jump_every;
    let recording = args.record.is_some();
    let input = move |t: u64| TickInput {
        jump: jump_every > 0 && t % jump_every == 0,
        toggle_recording: recording && t == 0,
        ..Default::default()
    };

    if !args.realtime {
        return session.run(args.ticks, input, &mut NullCanvas);
    }

    let mut input = input;
    let mut clock = FixedStep::new(tick_rate, MAX_SUBSTEPS);
    let mut last = Instant::now();
    let mut done = 0;
    while done < args.ticks && !session.is_stopped() {
        let now = Instant::now();
        let steps = clock.advance((now - last).as_secs_f32());
        last = now;
        for _ in 0..steps {
            if done >= args.ticks {
                break;
            }
            let next = input(session.world.time_ticks);
            session.step(&next, &mut NullCanvas)?;
            done += 1;
        }
        std::thread::sleep(Duration::from_secs_f32(clock.dt / 2.0));
    }
    session.finish()
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    log::info!("Flappy Learn starting with {:?} policy, seed {}", args.policy, args.seed);

    match run(&args) {
        Ok(summary) => {
            if args.json {
                match serde_json::to_string_pretty(&summary) {
                    Ok(json) => println!("{json}"),
                    Err(err) => {
                        log::error!("Failed to encode summary: {err}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                println!(
                    "ticks={} resets={} best={} final={} cleared={} jumps={} samples={}",
                    summary.ticks,
                    summary.resets,
                    summary.best_score,
                    summary.final_score,
                    summary.pipes_cleared,
                    summary.jumps,
                    summary.samples_written
                );
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
