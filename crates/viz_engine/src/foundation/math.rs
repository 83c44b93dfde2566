//! Math utilities and types
//!
//! Provides fundamental math types for 3D visualization work.

pub use nalgebra::{
    Vector2, Vector3,
    Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Rigid transform holding a translation vector and a rotation quaternion
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Translation in 3D space
    pub translation: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with translation and rotation
    pub fn from_parts(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Convert to a transformation matrix
    ///
    /// The matrix applies the rotation first and the translation second,
    /// which is the order scene nodes expect when pushing onto a surface.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.translation) * self.rotation.to_homogeneous()
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;
}

/// Math utility functions
pub mod utils {
    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min { min } else if value > max { max } else { value }
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_is_the_default() {
        assert_eq!(Transform::identity(), Transform::default());
    }

    #[test]
    fn test_to_matrix_rotates_before_translating() {
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), constants::HALF_PI);
        let transform = Transform::from_parts(Vec3::new(1.0, 2.0, 3.0), rotation);

        let moved = transform
            .to_matrix()
            .transform_point(&nalgebra::Point3::new(1.0, 0.0, 0.0));

        // A quarter turn about Y sends +X to -Z, then the translation lands on top.
        assert_relative_eq!(moved.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(moved.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(moved.z, 2.0, epsilon = 1e-5);
    }
}
