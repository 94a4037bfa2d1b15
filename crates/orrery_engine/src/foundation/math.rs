//! Math utilities and types
//!
//! Provides the nalgebra aliases used by the scene, camera and picking code,
//! plus the angle helpers the orbit kinematics rely on.

pub use nalgebra::{Vector3, Vector4, Matrix4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi, one full revolution
    pub const TAU: f32 = std::f32::consts::TAU;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Wrap an angle into `[0, 2π)`.
    ///
    /// `rem_euclid` can return exactly `TAU` when `angle` is a tiny negative
    /// number, so that case is folded back to zero.
    pub fn wrap_angle(angle: f32) -> f32 {
        let wrapped = angle.rem_euclid(constants::TAU);
        if wrapped >= constants::TAU {
            0.0
        } else {
            wrapped
        }
    }

    /// Smallest absolute difference between two angles, in `[0, π]`
    pub fn angle_distance(a: f32, b: f32) -> f32 {
        let d = wrap_angle(a - b);
        d.min(constants::TAU - d)
    }

    /// Point on a circle of `radius` in the XZ plane at `phase`, keeping `y`
    pub fn planar_circle_point(radius: f32, phase: f32, y: f32) -> super::Vec3 {
        super::Vec3::new(radius * phase.cos(), y, radius * phase.sin())
    }
}
