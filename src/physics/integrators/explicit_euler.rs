//! Explicit Euler integration method (forward Euler)
//!
//! Provided for comparison. On a closed orbit its energy grows every step, so
//! the rocket spirals away from the planet.

use super::{AccelerationField, Integrator};
use crate::physics::math::{Scalar, Vector};

/// Explicit Euler integrator (forward Euler method)
///
/// Both updates read only the state at the start of the step:
///
/// ```text
/// a(t)    = a(x(t))
/// x(t+dt) = x(t) + v(t) * dt
/// v(t+dt) = v(t) + a(t) * dt
/// ```
///
/// # Properties
///
/// - **Order of accuracy**: 1
/// - **Force evaluations**: 1 per timestep
/// - **Symplectic**: No; phase-space area grows every step
///
/// | Property      | Explicit Euler | Symplectic Euler | Velocity Verlet |
/// |---------------|----------------|------------------|-----------------|
/// | Order         | 1              | 1                | 2               |
/// | Force evals   | 1              | 1                | 2               |
/// | Symplectic    | No             | Yes              | Yes             |
/// | Energy drift  | Unbounded      | Bounded          | Bounded         |
#[derive(Debug, Copy, Clone, Default)]
pub struct ExplicitEuler;

impl Integrator for ExplicitEuler {
    fn clone_box(&self) -> Box<dyn Integrator> {
        Box::new(*self)
    }

    fn step(
        &self,
        position: &mut Vector,
        velocity: &mut Vector,
        field: &dyn AccelerationField,
        dt: Scalar,
    ) {
        let acceleration = field.at(*position);
        let current_velocity = *velocity;

        // Position first, with the velocity from before this step
        *position += current_velocity * dt;
        *velocity += acceleration * dt;
    }

    fn convergence_order(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str {
        "explicit_euler"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["euler", "forward_euler"]
    }
}
