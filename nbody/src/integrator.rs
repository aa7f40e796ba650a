//! Velocity-Verlet step and the parallel sweep over all bodies

use glam::Vec2;
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::body::{BodyStore, NextBuffers, Snapshot};
use crate::forces::Gravity;

/// Everything a single body update needs besides the snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParams {
    pub gravity: Gravity,
    pub dt: f32,
    pub center_attractor: bool,
}

/// Kinematic state of one body after a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
}

/// Advance body `i` by one timestep.
///
/// Reads only from `snapshot`, so it gives the same answer no matter which
/// other bodies have already been stepped in the current sweep.
pub fn integrate(i: usize, snapshot: &Snapshot<'_>, params: &StepParams) -> BodyState {
    let dt = params.dt;
    let a_prev = snapshot.accelerations[i];
    let a_new = params
        .gravity
        .evaluate_acceleration(i, snapshot.positions, snapshot.masses);

    let position = snapshot.positions[i] + snapshot.velocities[i] * dt + 0.5 * a_prev * dt * dt;
    let velocity = snapshot.velocities[i] + 0.5 * (a_prev + a_new) * dt;

    let mut acceleration = a_new;
    if params.center_attractor {
        acceleration += (-position).normalize_or_zero() * dt;
    }

    BodyState {
        position,
        velocity,
        acceleration,
    }
}

/// Step every body once on `pool`.
///
/// Each worker writes only its own index of the next buffers; the buffers
/// become current once every body is done.
pub fn sweep(store: &mut BodyStore, params: &StepParams, pool: &ThreadPool) {
    let (snapshot, next) = store.split_for_sweep();
    let NextBuffers {
        positions,
        velocities,
        accelerations,
    } = next;

    pool.install(|| {
        positions
            .par_iter_mut()
            .zip(velocities.par_iter_mut())
            .zip(accelerations.par_iter_mut())
            .enumerate()
            .for_each(|(i, ((p, v), a))| {
                let state = integrate(i, &snapshot, params);
                *p = state.position;
                *v = state.velocity;
                *a = state.acceleration;
            });
    });

    store.swap_buffers();
}
