//! Numerical integration methods for the rocket's equations of motion

use crate::physics::math::{Scalar, Vector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use crate::physics::field::AccelerationField;

pub mod explicit_euler;
pub mod registry;
pub mod symplectic_euler;
pub mod velocity_verlet;

pub use explicit_euler::ExplicitEuler;
pub use registry::IntegratorRegistry;
pub use symplectic_euler::SymplecticEuler;
pub use velocity_verlet::VelocityVerlet;

/// Base trait for all integrators
pub trait Integrator: Send + Sync {
    fn clone_box(&self) -> Box<dyn Integrator>;

    /// Advance a single state by one time step.
    ///
    /// Implementations must read the field only through `field` and keep no
    /// state between calls, so that `n` steps always compose exactly.
    fn step(
        &self,
        position: &mut Vector,
        velocity: &mut Vector,
        field: &dyn AccelerationField,
        dt: Scalar,
    );

    /// Order of the global error, e.g. 1 for the Euler family.
    fn convergence_order(&self) -> usize;

    /// Field evaluations made per call to [`Integrator::step`].
    fn force_evaluations(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str;

    fn aliases(&self) -> Vec<&'static str> {
        vec![]
    }
}

/// Every update rule a lane can be configured with.
///
/// The last five are reserved names with no update rule yet. They parse and
/// can be placed in a lane so that the failure is reported when the lane
/// advances instead of being swallowed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    ExplicitEuler,
    SymplecticEuler,
    VelocityVerlet,
    RungeKutta,
    Leapfrog,
    Midpoint,
    Beeman,
    Gear,
}

impl Algorithm {
    pub const ALL: [Algorithm; 8] = [
        Algorithm::ExplicitEuler,
        Algorithm::SymplecticEuler,
        Algorithm::VelocityVerlet,
        Algorithm::RungeKutta,
        Algorithm::Leapfrog,
        Algorithm::Midpoint,
        Algorithm::Beeman,
        Algorithm::Gear,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::ExplicitEuler => "explicit_euler",
            Algorithm::SymplecticEuler => "symplectic_euler",
            Algorithm::VelocityVerlet => "velocity_verlet",
            Algorithm::RungeKutta => "runge_kutta",
            Algorithm::Leapfrog => "leapfrog",
            Algorithm::Midpoint => "midpoint",
            Algorithm::Beeman => "beeman",
            Algorithm::Gear => "gear",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raised when a name matches neither an algorithm nor an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAlgorithm(pub String);

impl fmt::Display for UnknownAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown algorithm '{}'", self.0)
    }
}

impl std::error::Error for UnknownAlgorithm {}

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(algorithm) = Algorithm::ALL.into_iter().find(|a| a.name() == s) {
            return Ok(algorithm);
        }

        IntegratorRegistry::default()
            .resolve(s)
            .ok_or_else(|| UnknownAlgorithm(s.to_string()))
    }
}
