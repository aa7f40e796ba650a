//! Simulation tunables
//!
//! [`SimConfig`] collects every constant the integrator depends on so the same
//! code can be exercised at different scales. It can be built in code
//! (starting from [`SimConfig::default`]) or loaded from YAML:
//!
//! ```yaml
//! gravity: 1.0e-7
//! timestep: 0.008333333
//! softening: 1.0
//! mass_mean: 25000.0
//! mass_spread: 158.1
//! boundary: 100.0
//! max_bodies: 1024
//! max_steps_per_frame: 8
//! center_attractor: false
//! seed: 42
//! worker_threads: 4
//! ```
//!
//! Missing fields fall back to their defaults; unknown fields are an error.

use std::path::Path;

use common::constants;
use serde::Deserialize;

use crate::error::{Result, SimError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Gravitational constant
    pub gravity: f32,
    /// Fixed simulation step in seconds
    pub timestep: f64,
    /// Added to squared distance in the force law; must be > 0
    pub softening: f32,
    /// Mean of the initial mass distribution
    pub mass_mean: f32,
    /// Standard deviation of the initial mass distribution
    pub mass_spread: f32,
    /// Initial placement spread; positions are not confined afterwards
    pub boundary: f32,
    /// Upper bound on the body count
    pub max_bodies: usize,
    /// Sweeps per frame before the surplus accumulated time is dropped
    pub max_steps_per_frame: u32,
    /// Adds a weak pull toward the origin after each body update
    pub center_attractor: bool,
    /// RNG seed for initial conditions; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Worker pool size; `None` lets rayon decide
    pub worker_threads: Option<usize>,
    /// Scan for NaN/Inf after every sweep even in release builds
    pub check_finite: bool,
    /// Abort with [`SimError::SpeedLimit`] once any body moves faster than this
    pub speed_limit: Option<f32>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: constants::G,
            timestep: constants::TIME_STEP,
            softening: constants::SOFTENING,
            mass_mean: constants::BODY_MASS,
            mass_spread: constants::BODY_MASS.sqrt(),
            boundary: constants::SIM_BOUNDARY,
            max_bodies: constants::MAX_BODIES,
            max_steps_per_frame: constants::MAX_STEPS_PER_FRAME,
            center_attractor: false,
            seed: None,
            worker_threads: None,
            check_finite: false,
            speed_limit: None,
        }
    }
}

impl SimConfig {
    /// Parse a YAML document and validate it.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let config: SimConfig = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("loading config from {}", path.display());
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn with_center_attractor(mut self, enabled: bool) -> Self {
        self.center_attractor = enabled;
        self
    }

    /// Check every tunable is in range.
    pub fn validate(&self) -> Result<()> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> Result<()> {
            Err(SimError::InvalidConfig {
                field,
                reason: reason.into(),
            })
        }

        if !(self.gravity.is_finite() && self.gravity >= 0.0) {
            return invalid("gravity", format!("{} is not a finite non-negative value", self.gravity));
        }
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return invalid("timestep", format!("{} is not a finite positive value", self.timestep));
        }
        if !(self.softening.is_finite() && self.softening > 0.0) {
            return invalid("softening", format!("{} is not a finite positive value", self.softening));
        }
        if !(self.mass_mean.is_finite() && self.mass_mean > 0.0) {
            return invalid("mass_mean", format!("{} is not a finite positive value", self.mass_mean));
        }
        if !(self.mass_spread.is_finite() && self.mass_spread >= 0.0) {
            return invalid("mass_spread", format!("{} is not a finite non-negative value", self.mass_spread));
        }
        if !(self.boundary.is_finite() && self.boundary >= 0.0) {
            return invalid("boundary", format!("{} is not a finite non-negative value", self.boundary));
        }
        if self.max_bodies == 0 {
            return invalid("max_bodies", "must allow at least one body");
        }
        if self.max_steps_per_frame == 0 {
            return invalid("max_steps_per_frame", "must allow at least one sweep per frame");
        }
        if self.worker_threads == Some(0) {
            return invalid("worker_threads", "must be at least 1 when set");
        }
        if let Some(limit) = self.speed_limit {
            if !(limit.is_finite() && limit > 0.0) {
                return invalid("speed_limit", format!("{limit} is not a finite positive value"));
            }
        }
        Ok(())
    }

    /// Validate a requested body count against `max_bodies`.
    ///
    /// Takes a signed value so that negative command-line input is reported
    /// as a body-count error rather than a parse failure.
    pub fn validate_body_count(&self, count: i64) -> Result<usize> {
        match usize::try_from(count) {
            Ok(n) if n > 0 && n <= self.max_bodies => Ok(n),
            _ => Err(SimError::InvalidBodyCount {
                count,
                max: self.max_bodies,
            }),
        }
    }

    /// Standard deviation of each initial position component.
    pub fn position_spread(&self, body_count: usize) -> f32 {
        self.boundary.sqrt() * (body_count as f32).log10()
    }
}
