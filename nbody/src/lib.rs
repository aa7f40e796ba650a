//! Fixed-timestep N-body simulation
//!
//! Bodies attract each other through an O(n^2) pairwise force pass that runs
//! in parallel on a rayon pool. Simulated time advances in fixed steps driven
//! by an accumulator, independent of how often the caller renders. Each sweep
//! reads a snapshot of the previous state and writes into a second buffer, so
//! the result does not depend on how work is split across threads.
//!
//! ```no_run
//! use nbody::{SimConfig, Simulation};
//!
//! let mut sim = Simulation::new(512, SimConfig::default().with_seed(7))?;
//! for _ in 0..60 {
//!     sim.tick(1.0 / 60.0)?;
//!     let points = sim.positions();
//!     let _upload: &[f32] = points.as_interleaved();
//! }
//! # Ok::<(), nbody::SimError>(())
//! ```

pub mod body;
pub mod config;
pub mod error;
pub mod forces;
pub mod integrator;
pub mod render;
pub mod sampling;
pub mod scheduler;
pub mod simulation;

pub use body::{BodyStore, Snapshot};
pub use config::SimConfig;
pub use error::{Result, SimError};
pub use forces::Gravity;
pub use integrator::{BodyState, StepParams};
pub use render::PositionView;
pub use scheduler::{FixedTimestep, FrameReport};
pub use simulation::Simulation;
