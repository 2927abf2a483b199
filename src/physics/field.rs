//! Acceleration fields acting on the rocket
//!
//! The only physical field in this crate is the pull of a single fixed planet.
//! Integrators only ever see it through [`AccelerationField`], which keeps the
//! update rules testable against simpler fields such as springs.

use crate::physics::math::{self, Scalar, Vector};

/// Something that yields the acceleration felt at a point in space.
pub trait AccelerationField {
    fn at(&self, position: Vector) -> Vector;
}

/// Constants of the simplified inverse-square law.
///
/// Acceleration magnitude at distance `d` is `G * (R / d)^2`, so `G` is the
/// surface gravity of a planet with reference radius `R`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ForceLaw {
    pub gravitational_constant: Scalar,
    pub reference_radius: Scalar,
}

impl Default for ForceLaw {
    fn default() -> Self {
        Self {
            gravitational_constant: 1000.0,
            reference_radius: 0.001,
        }
    }
}

impl ForceLaw {
    /// The combined strength `G * R^2`.
    pub fn strength(&self) -> Scalar {
        self.gravitational_constant * self.reference_radius * self.reference_radius
    }
}

/// Attraction towards a fixed source position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InverseSquareField {
    source: Vector,
    law: ForceLaw,
}

impl InverseSquareField {
    pub fn new(source: Vector, law: ForceLaw) -> Self {
        Self { source, law }
    }

    pub fn source(&self) -> Vector {
        self.source
    }

    pub fn law(&self) -> ForceLaw {
        self.law
    }

    /// Potential energy per unit mass, `-G * R^2 / d`.
    pub fn potential(&self, position: Vector) -> Scalar {
        -self.law.strength() / math::length(position - self.source)
    }

    /// Kinetic plus potential energy per unit mass.
    pub fn specific_energy(&self, position: Vector, velocity: Vector) -> Scalar {
        0.5 * velocity.length_squared() + self.potential(position)
    }

    /// Velocity that keeps a rocket at `position` on a counter-clockwise
    /// circular orbit around the source.
    pub fn circular_velocity(&self, position: Vector) -> Vector {
        let relative = position - self.source;
        let speed = libm::sqrt(self.law.strength() / math::length(relative));
        math::rescale(relative.perp(), speed)
    }
}

impl AccelerationField for InverseSquareField {
    fn at(&self, position: Vector) -> Vector {
        let relative = position - self.source;
        let distance = math::length(relative);
        let ratio = self.law.reference_radius / distance;
        let effective_gravity = self.law.gravitational_constant * ratio * ratio;

        -effective_gravity * (relative / distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_field() -> InverseSquareField {
        InverseSquareField::new(
            Vector::ZERO,
            ForceLaw {
                gravitational_constant: 1.0,
                reference_radius: 1.0,
            },
        )
    }

    #[test]
    fn test_default_strength() {
        assert!((ForceLaw::default().strength() - 0.001).abs() < 1e-15);
    }

    #[test]
    fn test_acceleration_points_at_source() {
        let field = InverseSquareField::new(Vector::new(1.0, 1.0), ForceLaw::default());
        let acceleration = field.at(Vector::new(1.0, 3.0));

        assert_eq!(acceleration.x, 0.0);
        assert!(acceleration.y < 0.0);
    }

    #[test]
    fn test_inverse_square_falloff() {
        let field = unit_field();
        let near = field.at(Vector::new(1.0, 0.0)).length();
        let far = field.at(Vector::new(2.0, 0.0)).length();

        assert!((near - 1.0).abs() < 1e-12);
        assert!((far - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_acceleration_matches_potential_gradient() {
        let field = InverseSquareField::new(Vector::new(0.2, -0.1), ForceLaw::default());
        let position = Vector::new(-0.3, 0.05);
        let eps = 1e-7;

        let dx = (field.potential(position + Vector::new(eps, 0.0))
            - field.potential(position - Vector::new(eps, 0.0)))
            / (2.0 * eps);
        let dy = (field.potential(position + Vector::new(0.0, eps))
            - field.potential(position - Vector::new(0.0, eps)))
            / (2.0 * eps);

        let acceleration = field.at(position);
        assert!((acceleration.x + dx).abs() < 1e-6);
        assert!((acceleration.y + dy).abs() < 1e-6);
    }

    #[test]
    fn test_circular_velocity() {
        let field = unit_field();
        let velocity = field.circular_velocity(Vector::new(4.0, 0.0));

        assert!(velocity.x.abs() < 1e-15);
        assert!((velocity.y - 0.5).abs() < 1e-12);
        // Centripetal acceleration v^2/r equals the field strength
        let centripetal = velocity.length_squared() / 4.0;
        assert!((centripetal - field.at(Vector::new(4.0, 0.0)).length()).abs() < 1e-12);
    }

    #[test]
    fn test_zero_separation_is_not_finite() {
        let field = unit_field();
        assert!(!math::is_finite(field.at(Vector::ZERO)));
    }
}
