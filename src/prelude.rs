//! orbitstep prelude module
//!
//! Re-exports the types most systems and tests need, to keep imports short.

// External crate re-exports
pub use bevy::prelude::*;

// Internal re-exports - Config
pub use crate::config::SimulationConfig;

// Internal re-exports - States and events
pub use crate::events::SimulationCommand;
pub use crate::states::AppState;

// Internal re-exports - Physics
pub use crate::physics::field::{ForceLaw, InverseSquareField};
pub use crate::physics::integrators::{Algorithm, Integrator, IntegratorRegistry};
pub use crate::physics::math::{Scalar, Vector};
pub use crate::physics::scheduler::{FrameReport, TickScheduler};
pub use crate::physics::simulation::{PhysicalState, Simulation, SimulationError};

// Internal re-exports - Plugins
pub use crate::plugins::diagnostics::{FrameStats, SimulationDiagnosticsPlugin};
pub use crate::plugins::simulation::{SimulationPlugin, SimulationSet};
