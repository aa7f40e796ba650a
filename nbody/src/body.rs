//! Per-body state stored as parallel arrays
//!
//! Index `i` in every array refers to the same body; the index is the body's
//! only identity. The store also owns a second set of kinematic arrays that a
//! sweep writes into, so force evaluation always reads a stable snapshot. The
//! two sets trade roles after each sweep via [`BodyStore::swap_buffers`].

use glam::Vec2;
use rand::Rng;

use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::sampling::{draw_positive_mass, sample_gaussian};

/// Read-only view of the state at the start of a sweep
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub positions: &'a [Vec2],
    pub velocities: &'a [Vec2],
    pub accelerations: &'a [Vec2],
    pub masses: &'a [f32],
}

/// Write targets for a sweep; one slot per body
#[derive(Debug)]
pub struct NextBuffers<'a> {
    pub positions: &'a mut [Vec2],
    pub velocities: &'a mut [Vec2],
    pub accelerations: &'a mut [Vec2],
}

#[derive(Debug, Clone)]
pub struct BodyStore {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    accelerations: Vec<Vec2>,
    masses: Vec<f32>,

    next_positions: Vec<Vec2>,
    next_velocities: Vec<Vec2>,
    next_accelerations: Vec<Vec2>,
}

impl BodyStore {
    /// Build a store from explicit initial conditions.
    ///
    /// Prior accelerations start at zero. Every mass must be positive and
    /// finite, and all arrays must have the same length.
    pub fn from_parts(positions: Vec<Vec2>, velocities: Vec<Vec2>, masses: Vec<f32>) -> Result<Self> {
        let n = positions.len();
        if velocities.len() != n {
            return Err(SimError::LengthMismatch {
                field: "velocities",
                expected: n,
                found: velocities.len(),
            });
        }
        if masses.len() != n {
            return Err(SimError::LengthMismatch {
                field: "masses",
                expected: n,
                found: masses.len(),
            });
        }
        if let Some((index, &mass)) = masses
            .iter()
            .enumerate()
            .find(|(_, m)| !(m.is_finite() && **m > 0.0))
        {
            return Err(SimError::DegenerateMass { index, mass });
        }

        Ok(Self {
            next_positions: positions.clone(),
            next_velocities: velocities.clone(),
            next_accelerations: vec![Vec2::ZERO; n],
            accelerations: vec![Vec2::ZERO; n],
            positions,
            velocities,
            masses,
        })
    }

    /// Draw `count` bodies from the configured distributions.
    ///
    /// Position components are normal with zero mean and standard deviation
    /// `sqrt(boundary) * log10(count)`; masses are normal around `mass_mean`,
    /// resampled when a draw is not positive. Bodies start at rest.
    pub fn generate<R: Rng + ?Sized>(count: usize, config: &SimConfig, rng: &mut R) -> Result<Self> {
        let spread = config.position_spread(count);
        let mut positions = Vec::with_capacity(count);
        let mut masses = Vec::with_capacity(count);

        for i in 0..count {
            let x = sample_gaussian(&mut *rng, 0.0, spread);
            let y = sample_gaussian(&mut *rng, 0.0, spread);
            positions.push(Vec2::new(x, y));
            masses.push(draw_positive_mass(i, || {
                sample_gaussian(&mut *rng, config.mass_mean, config.mass_spread)
            })?);
        }

        log::debug!("generated {count} bodies with position spread {spread:.3}");
        Self::from_parts(positions, vec![Vec2::ZERO; count], masses)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec2] {
        &self.velocities
    }

    pub fn accelerations(&self) -> &[Vec2] {
        &self.accelerations
    }

    pub fn masses(&self) -> &[f32] {
        &self.masses
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            positions: &self.positions,
            velocities: &self.velocities,
            accelerations: &self.accelerations,
            masses: &self.masses,
        }
    }

    /// Borrow the current state read-only and the next buffers mutably.
    pub fn split_for_sweep(&mut self) -> (Snapshot<'_>, NextBuffers<'_>) {
        (
            Snapshot {
                positions: &self.positions,
                velocities: &self.velocities,
                accelerations: &self.accelerations,
                masses: &self.masses,
            },
            NextBuffers {
                positions: &mut self.next_positions,
                velocities: &mut self.next_velocities,
                accelerations: &mut self.next_accelerations,
            },
        )
    }

    /// Promote the next buffers to current after a completed sweep.
    pub fn swap_buffers(&mut self) {
        std::mem::swap(&mut self.positions, &mut self.next_positions);
        std::mem::swap(&mut self.velocities, &mut self.next_velocities);
        std::mem::swap(&mut self.accelerations, &mut self.next_accelerations);
    }

    /// Index of the first body with a NaN or infinite component.
    pub fn first_non_finite(&self) -> Option<usize> {
        (0..self.len()).find(|&i| {
            !(self.positions[i].is_finite()
                && self.velocities[i].is_finite()
                && self.accelerations[i].is_finite())
        })
    }

    pub fn total_mass(&self) -> f32 {
        self.masses.iter().sum()
    }

    /// Get the center of mass of all bodies
    pub fn center_of_mass(&self) -> Vec2 {
        let total_mass = self.total_mass();
        if total_mass <= 0.0 {
            return Vec2::ZERO;
        }

        let weighted: Vec2 = self
            .positions
            .iter()
            .zip(&self.masses)
            .map(|(p, m)| *p * *m)
            .sum();
        weighted / total_mass
    }

    pub fn total_momentum(&self) -> Vec2 {
        self.velocities
            .iter()
            .zip(&self.masses)
            .map(|(v, m)| *v * *m)
            .sum()
    }

    pub fn kinetic_energy(&self) -> f32 {
        self.velocities
            .iter()
            .zip(&self.masses)
            .map(|(v, m)| 0.5 * m * v.length_squared())
            .sum()
    }

    pub fn max_speed(&self) -> f32 {
        self.velocities
            .iter()
            .map(|v| v.length())
            .fold(0.0, f32::max)
    }

    /// Index and speed of the fastest body, `None` for an empty store.
    pub fn fastest_body(&self) -> Option<(usize, f32)> {
        self.velocities
            .iter()
            .map(|v| v.length())
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}
