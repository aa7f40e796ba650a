//! Error type for simulation setup and stepping

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid body count {count}: must be between 1 and {max}")]
    InvalidBodyCount { count: i64, max: usize },

    #[error("invalid config value for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("body {index} has degenerate mass {mass}")]
    DegenerateMass { index: usize, mass: f32 },

    #[error("`{field}` has {found} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("body {index} became non-finite at step {step}")]
    NonFinite { index: usize, step: u64 },

    #[error("body {index} reached speed {speed} at step {step}, above the limit {limit}")]
    SpeedLimit {
        index: usize,
        speed: f32,
        limit: f32,
        step: u64,
    },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
