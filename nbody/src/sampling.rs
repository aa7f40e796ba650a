//! Random draws for initial conditions

use std::f32::consts::TAU;

use rand::Rng;

use crate::error::{Result, SimError};

/// Attempts made to draw a positive mass before giving up.
pub const MAX_MASS_DRAWS: usize = 64;

/// Sample from a Gaussian (normal) distribution using the Box-Muller transform
///
/// # Arguments
/// * `rng` - Random number generator
/// * `mean` - Mean of the distribution
/// * `std_dev` - Standard deviation
pub fn sample_gaussian<R: Rng + ?Sized>(rng: &mut R, mean: f32, std_dev: f32) -> f32 {
    // gen::<f32>() is in [0, 1); flip it so ln() never sees zero
    let u1: f32 = 1.0 - rng.gen::<f32>();
    let u2: f32 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
    mean + std_dev * z
}

/// Draw masses until one is positive and finite.
///
/// `draw` is called at most [`MAX_MASS_DRAWS`] times; if every draw is
/// degenerate the last value is reported as [`SimError::DegenerateMass`].
pub fn draw_positive_mass(index: usize, mut draw: impl FnMut() -> f32) -> Result<f32> {
    let mut last = f32::NAN;
    for attempt in 0..MAX_MASS_DRAWS {
        last = draw();
        if last.is_finite() && last > 0.0 {
            if attempt > 0 {
                log::debug!("body {index}: resampled mass {attempt} time(s)");
            }
            return Ok(last);
        }
    }
    Err(SimError::DegenerateMass { index, mass: last })
}
