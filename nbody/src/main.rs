//! Headless n-body driver
//!
//! Stands in for the render loop: each frame it measures (or synthesizes) the
//! frame time, lets the simulation catch up in fixed steps, then takes the
//! position buffer a renderer would upload.
//!
//! Usage:
//!   nbody <N_POINTS> [--config sim.yaml] [--frames K] [--fps F] [--realtime]
//!
//! Set `RUST_LOG=debug` for per-frame output.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use nbody::{SimConfig, SimError, Simulation};

#[derive(Parser, Debug)]
#[command(name = "nbody", version, about = "N-body problem simulator")]
struct Args {
    /// Number of bodies to simulate
    #[arg(value_name = "N_POINTS", allow_negative_numbers = true)]
    body_count: i64,

    /// YAML file with simulation tunables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frames to run before exiting
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Target frame rate
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Use measured wall-clock frame times instead of a fixed 1/fps
    #[arg(long)]
    realtime: bool,

    /// Seed for initial conditions (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads (overrides the config file)
    #[arg(long)]
    threads: Option<usize>,

    /// Abort once any body moves faster than this (overrides the config file)
    #[arg(long)]
    speed_limit: Option<f32>,

    /// Log a summary every this many frames
    #[arg(long, default_value_t = 60)]
    report_every: u64,
}

/// Frame period for `fps`, rejecting rates with no usable period.
fn frame_time(fps: f64) -> std::result::Result<Duration, String> {
    if !(fps.is_finite() && fps > 0.0) {
        return Err(format!("invalid --fps {fps}: must be a finite positive rate"));
    }
    match Duration::try_from_secs_f64(1.0 / fps) {
        Ok(period) if !period.is_zero() => Ok(period),
        Ok(_) => Err(format!("invalid --fps {fps}: frame time rounds to zero")),
        Err(err) => Err(format!("invalid --fps {fps}: {err}")),
    }
}

struct Driver {
    sim: Simulation,
    frame_time: Duration,
    realtime: bool,
    last_frame: Instant,
    dropped: f64,
}

impl Driver {
    fn new(sim: Simulation, frame_time: Duration, realtime: bool) -> Self {
        Self {
            sim,
            frame_time,
            realtime,
            last_frame: Instant::now(),
            dropped: 0.0,
        }
    }

    fn frame(&mut self, index: u64) -> Result<()> {
        let dt = if self.realtime {
            let target = self.last_frame + self.frame_time;
            let now = Instant::now();
            if target > now {
                std::thread::sleep(target - now);
            }
            let now = Instant::now();
            let dt = (now - self.last_frame).as_secs_f64();
            self.last_frame = now;
            dt
        } else {
            self.frame_time.as_secs_f64()
        };

        let report = self
            .sim
            .tick(dt)
            .with_context(|| format!("frame {index} failed"))?;
        self.dropped += report.dropped;

        let points = self.sim.positions();
        let upload = points.as_bytes();
        log::debug!(
            "frame {index}: dt={dt:.4}s sweeps={} alpha={:.3} uploaded {} bytes for {} points",
            report.sweeps,
            self.sim.alpha(),
            upload.len(),
            points.len()
        );
        Ok(())
    }

    fn summary(&self, frame: u64) {
        let bodies = self.sim.bodies();
        let com = bodies.center_of_mass();
        let momentum = bodies.total_momentum();
        let extent = self
            .sim
            .positions()
            .bounds()
            .map(|(lo, hi)| (hi - lo).length())
            .unwrap_or(0.0);

        log::info!(
            "frame {frame}: t={:.2}s steps={} com=({:.3}, {:.3}) |p|={:.3e} ke={:.3e} vmax={:.3} extent={:.1}",
            self.sim.elapsed(),
            self.sim.steps(),
            com.x,
            com.y,
            momentum.length(),
            bodies.kinetic_energy(),
            bodies.max_speed(),
            extent
        );
    }
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(threads) = args.threads {
        config = config.with_worker_threads(threads);
    }
    if let Some(limit) = args.speed_limit {
        config.speed_limit = Some(limit);
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    common::logging::init();
    let args = Args::parse();

    let period = match frame_time(args.fps) {
        Ok(period) => period,
        Err(msg) => Args::command().error(ErrorKind::ValueValidation, msg).exit(),
    };

    let config = load_config(&args)?;

    let sim = match Simulation::new(args.body_count, config) {
        Ok(sim) => sim,
        Err(err @ SimError::InvalidBodyCount { .. }) => {
            Args::command().error(ErrorKind::ValueValidation, err).exit();
        }
        Err(err) => return Err(err.into()),
    };

    log::info!(
        "running {} frames at {} fps ({})",
        args.frames,
        args.fps,
        if args.realtime { "wall clock" } else { "fixed frame time" }
    );

    let mut driver = Driver::new(sim, period, args.realtime);
    for frame in 1..=args.frames {
        driver.frame(frame)?;
        if args.report_every > 0 && frame % args.report_every == 0 {
            driver.summary(frame);
        }
    }

    if driver.dropped > 0.0 {
        log::warn!("{:.3}s of simulated time dropped to keep up", driver.dropped);
    }
    driver.summary(args.frames);
    Ok(())
}
