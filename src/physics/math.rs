/// Scalar type for physics calculations (f64 for precision)
pub type Scalar = f64;

/// 2D vector type for positions, velocities, and accelerations
pub type Vector = bevy::math::DVec2;

/// Returns `vector` pointing the same way with length `magnitude`.
///
/// A zero vector has no direction, so the result is non-finite.
pub fn rescale(vector: Vector, magnitude: Scalar) -> Vector {
    vector * (magnitude / length(vector))
}

/// Euclidean length computed through `libm` so results do not depend on the
/// platform's `sqrt`.
pub fn length(vector: Vector) -> Scalar {
    libm::sqrt(vector.x * vector.x + vector.y * vector.y)
}

/// True when both components are finite.
pub fn is_finite(vector: Vector) -> bool {
    vector.x.is_finite() && vector.y.is_finite()
}
