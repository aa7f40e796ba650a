//! Fixed-timestep accumulator
//!
//! Frame deltas are added to an accumulator that is drained in whole `dt`
//! steps, so simulated time always advances in identical increments however
//! irregular the render loop is. At most `max_steps` sweeps run per frame;
//! whole steps still pending after that are dropped and reported, keeping
//! only the fractional remainder.

/// Relative slack on the `accumulator >= dt` test, so deltas that sum to
/// `k * dt` in exact arithmetic always yield `k` steps.
const DRIFT_TOLERANCE: f64 = 1e-9;

/// Outcome of one scheduler tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// Sweeps run this frame
    pub sweeps: u32,
    /// Simulated seconds discarded by the per-frame cap
    pub dropped: f64,
}

#[derive(Debug, Clone)]
pub struct FixedTimestep {
    dt: f64,
    max_steps: u32,
    accumulator: f64,
}

impl FixedTimestep {
    /// `dt` must be positive and `max_steps` at least one; both are checked
    /// by [`crate::SimConfig::validate`].
    pub fn new(dt: f64, max_steps: u32) -> Self {
        debug_assert!(dt > 0.0 && dt.is_finite());
        debug_assert!(max_steps > 0);
        Self {
            dt,
            max_steps,
            accumulator: 0.0,
        }
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Unconsumed time, always in `[0, dt)` between ticks unless a pending
    /// step sits within the drift tolerance.
    pub fn accumulated(&self) -> f64 {
        self.accumulator
    }

    /// Fraction of a step left in the accumulator, for render interpolation.
    pub fn alpha(&self) -> f64 {
        (self.accumulator / self.dt).clamp(0.0, 1.0)
    }

    fn step_ready(&self) -> bool {
        self.accumulator >= self.dt * (1.0 - DRIFT_TOLERANCE)
    }

    /// Add `delta` seconds and run `step` once per whole timestep.
    ///
    /// `step` is called zero or more times, never more than `max_steps`.
    /// Negative or non-finite deltas are ignored.
    pub fn tick<E>(&mut self, delta: f64, mut step: impl FnMut() -> Result<(), E>) -> Result<FrameReport, E> {
        if !delta.is_finite() || delta < 0.0 {
            log::warn!("ignoring invalid frame delta {delta}");
            return Ok(FrameReport::default());
        }

        self.accumulator += delta;

        let mut report = FrameReport::default();
        while self.step_ready() {
            if report.sweeps == self.max_steps {
                report.dropped = self.drop_backlog();
                break;
            }
            step()?;
            self.accumulator = (self.accumulator - self.dt).max(0.0);
            report.sweeps += 1;
        }

        Ok(report)
    }

    /// Discard whole pending steps, keeping the fractional part.
    fn drop_backlog(&mut self) -> f64 {
        let kept = self.accumulator % self.dt;
        let kept = if self.dt - kept <= self.dt * DRIFT_TOLERANCE { 0.0 } else { kept };
        let dropped = self.accumulator - kept;
        self.accumulator = kept;

        log::warn!(
            "simulation falling behind: dropped {:.4}s ({} steps) after {} sweeps this frame",
            dropped,
            (dropped / self.dt).round(),
            self.max_steps
        );
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::convert::Infallible;

    fn count_ticks(clock: &mut FixedTimestep, delta: f64) -> FrameReport {
        clock.tick(delta, || Ok::<(), Infallible>(())).unwrap()
    }

    #[test]
    fn test_short_frame_runs_no_sweep() {
        let mut clock = FixedTimestep::new(1.0 / 120.0, 8);
        let report = count_ticks(&mut clock, 1.0 / 240.0);
        assert_eq!(report.sweeps, 0);
        assert_relative_eq!(clock.accumulated(), 1.0 / 240.0);
        assert_relative_eq!(clock.alpha(), 0.5);
    }

    #[test]
    fn test_half_frames_accumulate_into_a_sweep() {
        let mut clock = FixedTimestep::new(1.0 / 120.0, 8);
        assert_eq!(count_ticks(&mut clock, 1.0 / 240.0).sweeps, 0);
        assert_eq!(count_ticks(&mut clock, 1.0 / 240.0).sweeps, 1);
        assert!(clock.accumulated() < 1e-12);
    }

    #[test]
    fn test_chunking_does_not_change_sweep_count() {
        let dt = 1.0 / 120.0;
        let chunkings: Vec<Vec<f64>> = vec![
            vec![3.0 * dt],
            vec![dt, dt, dt],
            vec![0.5 * dt, 2.0 * dt, 0.5 * dt],
            vec![0.1 * dt; 30],
            vec![dt / 3.0; 9],
        ];

        for deltas in chunkings {
            let mut clock = FixedTimestep::new(dt, 64);
            let total: u32 = deltas.iter().map(|&d| count_ticks(&mut clock, d).sweeps).sum();
            assert_eq!(total, 3, "chunking {deltas:?}");
            assert!(clock.accumulated() >= 0.0);
        }
    }

    #[test]
    fn test_cap_drops_whole_steps_and_keeps_remainder() {
        let dt = 0.25;
        let mut clock = FixedTimestep::new(dt, 2);
        let report = count_ticks(&mut clock, 1.375);

        assert_eq!(report.sweeps, 2);
        assert_relative_eq!(report.dropped, 0.75);
        assert_relative_eq!(clock.accumulated(), 0.125);
    }

    #[test]
    fn test_invalid_deltas_are_ignored() {
        let mut clock = FixedTimestep::new(0.5, 4);
        for delta in [-1.0, f64::NAN, f64::INFINITY] {
            let report = count_ticks(&mut clock, delta);
            assert_eq!(report, FrameReport::default());
            assert_eq!(clock.accumulated(), 0.0);
        }
    }

    #[test]
    fn test_step_error_propagates() {
        let mut clock = FixedTimestep::new(0.5, 4);
        let mut calls = 0;
        let result = clock.tick(2.0, || {
            calls += 1;
            if calls == 2 {
                Err("boom")
            } else {
                Ok(())
            }
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(calls, 2);
    }
}
