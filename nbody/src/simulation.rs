//! The simulation context
//!
//! [`Simulation`] owns the body store, the fixed-timestep clock and the worker
//! pool. A render loop calls [`Simulation::tick`] once per frame with the
//! measured frame time and then reads [`Simulation::positions`].

use rand::SeedableRng;
use rand_chacha::ChaChaRng;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::body::BodyStore;
use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::forces::Gravity;
use crate::integrator::{self, StepParams};
use crate::render::PositionView;
use crate::scheduler::{FixedTimestep, FrameReport};

pub struct Simulation {
    config: SimConfig,
    store: BodyStore,
    clock: FixedTimestep,
    params: StepParams,
    pool: ThreadPool,
    steps: u64,
}

impl Simulation {
    /// Validate `body_count` and draw initial conditions.
    ///
    /// The count and config are checked before anything is allocated.
    pub fn new(body_count: i64, config: SimConfig) -> Result<Self> {
        config.validate()?;
        let count = config.validate_body_count(body_count)?;

        let mut rng = match config.seed {
            Some(seed) => ChaChaRng::seed_from_u64(seed),
            None => ChaChaRng::from_entropy(),
        };
        let store = BodyStore::generate(count, &config, &mut rng)?;
        Self::with_store(store, config)
    }

    /// Run explicit initial conditions under `config`.
    pub fn with_store(store: BodyStore, config: SimConfig) -> Result<Self> {
        config.validate()?;
        config.validate_body_count(store.len() as i64)?;

        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("nbody-worker-{i}"));
        if let Some(threads) = config.worker_threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build()?;

        let params = StepParams {
            gravity: Gravity::new(config.gravity, config.softening),
            dt: config.timestep as f32,
            center_attractor: config.center_attractor,
        };
        let clock = FixedTimestep::new(config.timestep, config.max_steps_per_frame);

        log::info!(
            "simulation ready: {} bodies, dt={:.5}s, {} workers",
            store.len(),
            config.timestep,
            pool.current_num_threads()
        );

        Ok(Self {
            config,
            store,
            clock,
            params,
            pool,
            steps: 0,
        })
    }

    /// Feed one frame's wall-clock time and run the sweeps it pays for.
    pub fn tick(&mut self, frame_delta: f64) -> Result<FrameReport> {
        let Self {
            store,
            clock,
            params,
            pool,
            steps,
            config,
        } = self;

        clock.tick(frame_delta, || run_sweep(store, params, pool, config, steps))
    }

    /// Run exactly one sweep, bypassing the accumulator.
    pub fn step(&mut self) -> Result<()> {
        run_sweep(&mut self.store, &self.params, &self.pool, &self.config, &mut self.steps)
    }

    /// Fraction of a step waiting in the accumulator, for interpolating
    /// between the last two states when rendering.
    pub fn alpha(&self) -> f64 {
        self.clock.alpha()
    }

    /// Current positions for the renderer.
    pub fn positions(&self) -> PositionView<'_> {
        PositionView::new(self.store.positions())
    }

    pub fn bodies(&self) -> &BodyStore {
        &self.store
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn body_count(&self) -> usize {
        self.store.len()
    }

    /// Sweeps completed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Simulated seconds elapsed.
    pub fn elapsed(&self) -> f64 {
        self.steps as f64 * self.clock.dt()
    }

    pub fn accumulated_time(&self) -> f64 {
        self.clock.accumulated()
    }

    pub fn worker_threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

/// One sweep followed by the state checks.
///
/// The finite scan runs in debug builds or with `check_finite`; the speed
/// check runs whenever `speed_limit` is set.
fn run_sweep(
    store: &mut BodyStore,
    params: &StepParams,
    pool: &ThreadPool,
    config: &SimConfig,
    steps: &mut u64,
) -> Result<()> {
    integrator::sweep(store, params, pool);
    *steps += 1;

    if cfg!(debug_assertions) || config.check_finite {
        if let Some(index) = store.first_non_finite() {
            return Err(SimError::NonFinite { index, step: *steps });
        }
    }

    if let Some(limit) = config.speed_limit {
        if let Some((index, speed)) = store.fastest_body() {
            if speed > limit {
                return Err(SimError::SpeedLimit {
                    index,
                    speed,
                    limit,
                    step: *steps,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_new_rejects_bad_counts_before_allocating() {
        for bad in [0, -1, 5000] {
            let err = Simulation::new(bad, SimConfig::default()).err().unwrap();
            assert!(matches!(err, SimError::InvalidBodyCount { .. }), "{bad}: {err}");
        }
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = SimConfig {
            timestep: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            Simulation::new(4, config),
            Err(SimError::InvalidConfig { field: "timestep", .. })
        ));
    }

    #[test]
    fn test_seeded_construction_is_reproducible() {
        let config = SimConfig::default().with_seed(123).with_worker_threads(2);
        let a = Simulation::new(64, config.clone()).unwrap();
        let b = Simulation::new(64, config).unwrap();
        assert_eq!(a.positions().as_slice(), b.positions().as_slice());
        assert_eq!(a.bodies().masses(), b.bodies().masses());
        assert_eq!(a.worker_threads(), 2);
    }

    #[test]
    fn test_tick_counts_steps_and_time() {
        let config = SimConfig {
            timestep: 0.125,
            ..SimConfig::default().with_seed(1).with_worker_threads(2)
        };
        let mut sim = Simulation::new(16, config).unwrap();

        let report = sim.tick(0.3).unwrap();
        assert_eq!(report.sweeps, 2);
        assert_eq!(sim.steps(), 2);
        assert_eq!(sim.elapsed(), 0.25);
        assert!((sim.accumulated_time() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_with_store_rejects_oversized_store() {
        let config = SimConfig {
            max_bodies: 2,
            ..Default::default()
        };
        let store = BodyStore::from_parts(vec![Vec2::ZERO; 3], vec![Vec2::ZERO; 3], vec![1.0; 3]).unwrap();
        assert!(matches!(
            Simulation::with_store(store, config),
            Err(SimError::InvalidBodyCount { count: 3, max: 2 })
        ));
    }

    #[test]
    fn test_non_finite_state_is_reported() {
        let config = SimConfig {
            check_finite: true,
            ..SimConfig::default().with_worker_threads(1)
        };
        let store = BodyStore::from_parts(
            vec![Vec2::new(f32::MAX, 0.0)],
            vec![Vec2::new(f32::MAX, 0.0)],
            vec![1.0],
        )
        .unwrap();
        let mut sim = Simulation::with_store(store, config).unwrap();

        match sim.step() {
            Err(SimError::NonFinite { index, step }) => {
                assert_eq!(index, 0);
                assert_eq!(step, 1);
            }
            other => panic!("expected NonFinite, got {other:?}"),
        }
    }

    #[test]
    fn test_speed_limit_stops_runaway_body() {
        let config = SimConfig {
            speed_limit: Some(1.0),
            ..SimConfig::default().with_worker_threads(1)
        };
        let store = BodyStore::from_parts(
            vec![Vec2::ZERO, Vec2::new(50.0, 0.0)],
            vec![Vec2::ZERO, Vec2::new(0.0, 3.0)],
            vec![1.0, 1.0],
        )
        .unwrap();
        let mut sim = Simulation::with_store(store, config).unwrap();

        match sim.tick(0.1) {
            Err(SimError::SpeedLimit { index, limit, step, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(limit, 1.0);
                assert_eq!(step, 1);
            }
            other => panic!("expected SpeedLimit, got {other:?}"),
        }
    }

    #[test]
    fn test_tick_and_step_share_checks() {
        let config = SimConfig {
            check_finite: true,
            ..SimConfig::default().with_worker_threads(1)
        };
        let runaway = || {
            BodyStore::from_parts(vec![Vec2::new(f32::MAX, 0.0)], vec![Vec2::new(f32::MAX, 0.0)], vec![1.0])
                .unwrap()
        };

        let mut ticked = Simulation::with_store(runaway(), config.clone()).unwrap();
        assert!(matches!(ticked.tick(0.05), Err(SimError::NonFinite { index: 0, step: 1 })));

        let mut stepped = Simulation::with_store(runaway(), config).unwrap();
        assert!(matches!(stepped.step(), Err(SimError::NonFinite { index: 0, step: 1 })));
    }

    #[test]
    fn test_alpha_tracks_leftover_time() {
        let config = SimConfig {
            timestep: 0.125,
            ..SimConfig::default().with_seed(4).with_worker_threads(1)
        };
        let mut sim = Simulation::new(3, config).unwrap();
        sim.tick(0.1875).unwrap();
        assert_eq!(sim.steps(), 1);
        assert!((sim.alpha() - 0.5).abs() < 1e-12);
    }
}
