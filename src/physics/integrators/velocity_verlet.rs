//! Velocity Verlet integration method

use super::{AccelerationField, Integrator};
use crate::physics::math::{Scalar, Vector};

/// Velocity Verlet integrator
///
/// A second-order symplectic method. The field is evaluated at both ends of
/// the step and the velocity update uses their average:
///
/// ```text
/// a0      = a(x(t))
/// x(t+dt) = x(t) + v(t)*dt + 0.5*a0*dt²
/// a1      = a(x(t+dt))
/// v(t+dt) = v(t) + 0.5*(a0 + a1)*dt
/// ```
///
/// Nothing is cached between steps, so each step costs two field
/// evaluations and `n` steps compose exactly regardless of how they are
/// batched.
#[derive(Debug, Copy, Clone, Default)]
pub struct VelocityVerlet;

impl Integrator for VelocityVerlet {
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
        let starting_acceleration = field.at(*position);

        *position += *velocity * dt + starting_acceleration * (0.5 * dt * dt);

        let new_acceleration = field.at(*position);
        *velocity += (starting_acceleration + new_acceleration) * (0.5 * dt);
    }

    fn convergence_order(&self) -> usize {
        2
    }

    fn force_evaluations(&self) -> usize {
        2
    }

    fn name(&self) -> &'static str {
        "velocity_verlet"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["verlet"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct ConstantField(Vector);

    impl AccelerationField for ConstantField {
        fn at(&self, _position: Vector) -> Vector {
            self.0
        }
    }

    struct CountingSpring {
        calls: Cell<usize>,
    }

    impl AccelerationField for CountingSpring {
        fn at(&self, position: Vector) -> Vector {
            self.calls.set(self.calls.get() + 1);
            -position
        }
    }

    #[test]
    fn test_velocity_verlet_constant_acceleration_is_exact() {
        let field = ConstantField(Vector::new(0.0, -9.81));

        let mut position = Vector::new(1.0, 0.0);
        let mut velocity = Vector::new(0.0, 1.0);
        VelocityVerlet.step(&mut position, &mut velocity, &field, 0.01);

        // x = x0 + v0*t + a*t²/2 holds exactly under uniform acceleration
        assert!((position - Vector::new(1.0, 0.01 - 0.0004905)).length() < 1e-12);
        assert!((velocity - Vector::new(0.0, 0.9019)).length() < 1e-12);
    }

    #[test]
    fn test_velocity_verlet_averages_old_and_new_acceleration() {
        let field = CountingSpring {
            calls: Cell::new(0),
        };

        let mut position = Vector::new(1.0, 0.0);
        let mut velocity = Vector::ZERO;
        VelocityVerlet.step(&mut position, &mut velocity, &field, 0.1);

        // x1 = 1 - 0.5*0.01 = 0.995, v1 = -0.5*(1 + 0.995)*0.1
        assert!((position.x - 0.995).abs() < 1e-12);
        assert!((velocity.x + 0.09975).abs() < 1e-12);
        assert_eq!(field.calls.get(), VelocityVerlet.force_evaluations());
    }

    #[test]
    fn test_velocity_verlet_energy_conservation() {
        let field = CountingSpring {
            calls: Cell::new(0),
        };
        let energy = |p: Vector, v: Vector| 0.5 * v.length_squared() + 0.5 * p.length_squared();

        let mut position = Vector::new(1.0, 0.0);
        let mut velocity = Vector::ZERO;
        let initial = energy(position, velocity);

        let mut max_error: Scalar = 0.0;
        for _ in 0..10_000 {
            VelocityVerlet.step(&mut position, &mut velocity, &field, 0.01);
            max_error = max_error.max(((energy(position, velocity) - initial) / initial).abs());
        }

        assert!(max_error < 1e-4, "energy error {max_error}");
    }
}
