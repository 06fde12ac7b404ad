//! Math utilities and types
//!
//! Provides the 2D vector type and degree-based angle helpers used by the
//! transform hierarchy. Angles are in degrees throughout the engine.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Math constants
pub mod constants {
    /// Degrees in a full turn
    pub const FULL_TURN_DEGREES: f32 = 360.0;
}

/// Normalize an angle in degrees to `[0, 360)`
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(constants::FULL_TURN_DEGREES);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= constants::FULL_TURN_DEGREES {
        0.0
    } else {
        wrapped
    }
}

/// Rotate a vector counter-clockwise (in a y-up frame) by `degrees`
///
/// Uses the standard 2D rotation matrix:
/// `x' = x·cos θ − y·sin θ`, `y' = x·sin θ + y·cos θ`.
pub fn rotate_degrees(v: Vec2, degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Unit vector pointing along `degrees`
pub fn direction_from_degrees(degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(cos, sin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_degrees_range() {
        assert_relative_eq!(normalize_degrees(370.0), 10.0, epsilon = 1e-4);
        assert_relative_eq!(normalize_degrees(-90.0), 270.0, epsilon = 1e-4);
        assert_relative_eq!(normalize_degrees(720.0), 0.0, epsilon = 1e-4);

        let tiny = normalize_degrees(-1e-8);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let rotated = rotate_degrees(Vec2::new(1.0, 0.0), 90.0);
        assert_relative_eq!(rotated, Vec2::new(0.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_direction_from_degrees() {
        assert_relative_eq!(direction_from_degrees(0.0), Vec2::new(1.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(direction_from_degrees(180.0), Vec2::new(-1.0, 0.0), epsilon = 1e-6);
    }
}
