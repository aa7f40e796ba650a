//! Common utilities for the n-body simulation
//!
//! This crate provides the default physical constants and the logging setup
//! shared by the simulation library and its driver binary.

pub mod logging;

/// Physical constants used in simulations
pub mod constants {
    /// Gravitational constant (scaled so that ~1e4 mass units interact visibly)
    pub const G: f32 = 1e-7;

    /// Mean body mass
    pub const BODY_MASS: f32 = 2.5e4;

    /// Fixed simulation timestep in seconds (120 Hz)
    pub const TIME_STEP: f64 = 1.0 / 120.0;

    /// Spread parameter for initial body placement
    pub const SIM_BOUNDARY: f32 = 100.0;

    /// Added to the squared distance in the force law
    pub const SOFTENING: f32 = 1.0;

    /// Largest body count accepted; the force pass is O(n^2)
    pub const MAX_BODIES: usize = 1024;

    /// Sweeps allowed per rendered frame before accumulated time is dropped
    pub const MAX_STEPS_PER_FRAME: u32 = 8;
}
