//! # Perspective Camera
//!
//! The camera the orrery is viewed through. Picking unprojects pointer
//! positions through the same matrices that the backend draws with, so what
//! the user clicks on is exactly what was drawn under the pointer.
//!
//! ## Conventions
//! - Right-handed, Y-up world space
//! - OpenGL-style clip space: NDC `x`, `y` and `z` all span `[-1, 1]`, with
//!   `y` pointing up and `z = -1` on the near plane

use crate::core::config::CameraSettings;
use crate::foundation::math::{Mat4, Point3, Vec3, Vec4, utils};
use crate::physics::Ray;

/// 3D camera with a perspective projection
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically `[0, 1, 0]`)
    pub up: Vec3,

    /// Vertical field of view in radians
    pub fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a perspective camera looking at the origin
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    ///
    /// # Example
    /// ```rust
    /// use orrery_engine::foundation::math::Vec3;
    /// use orrery_engine::render::Camera;
    ///
    /// let camera = Camera::perspective(Vec3::new(0.0, 0.0, 10.0), 75.0, 16.0 / 9.0, 0.1, 1000.0);
    /// assert_eq!(camera.target, Vec3::zeros());
    /// ```
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::y(),
            fov: utils::deg_to_rad(fov_degrees),
            aspect,
            near,
            far,
        }
    }

    /// Create the camera described by the configuration
    pub fn from_settings(settings: &CameraSettings) -> Self {
        let aspect = settings.viewport_width as f32 / settings.viewport_height.max(1) as f32;
        let mut camera = Self::perspective(
            Vec3::from(settings.position),
            settings.fov_degrees,
            aspect,
            settings.near,
            settings.far,
        );
        camera.target = Vec3::from(settings.target);
        camera
    }

    /// Update the aspect ratio after a viewport resize
    ///
    /// Only logs when the change is significant (> 0.01) to keep resize
    /// storms out of the log.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if (self.aspect - aspect).abs() > 0.01 {
            log::info!("Camera aspect ratio changed: {:.3} -> {aspect:.3}", self.aspect);
        }
        self.aspect = aspect;
    }

    /// Unit vector the camera looks along
    ///
    /// Falls back to `-Z` when position and target coincide.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| -Vec3::z())
    }

    /// World-to-camera transformation
    pub fn get_view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(self.position), &Point3::from(self.target), &self.up)
    }

    /// Camera-to-clip transformation
    pub fn get_projection_matrix(&self) -> Mat4 {
        Mat4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Combined view-projection matrix: `P × V`
    pub fn get_view_projection_matrix(&self) -> Mat4 {
        self.get_projection_matrix() * self.get_view_matrix()
    }

    /// Convert a position in normalized device coordinates into a world-space ray
    ///
    /// The ray starts at the camera and passes through the pointer's position
    /// on the far plane. If the view-projection matrix cannot be inverted the
    /// ray points straight ahead.
    ///
    /// # Usage Example
    /// ```rust
    /// use orrery_engine::foundation::math::Vec3;
    /// use orrery_engine::render::Camera;
    ///
    /// let camera = Camera::perspective(Vec3::new(0.0, 0.0, 10.0), 75.0, 1.0, 0.1, 100.0);
    /// let ray = camera.screen_to_world_ray(0.0, 0.0);
    /// assert!((ray.direction - Vec3::new(0.0, 0.0, -1.0)).magnitude() < 1e-5);
    /// ```
    pub fn screen_to_world_ray(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let Some(inv_view_proj) = self.get_view_projection_matrix().try_inverse() else {
            log::warn!("View-projection matrix is singular; picking straight ahead");
            return Ray::new(self.position, self.forward());
        };

        let unproject = |z: f32| {
            let h = inv_view_proj * Vec4::new(ndc_x, ndc_y, z, 1.0);
            Vec3::new(h.x / h.w, h.y / h.w, h.z / h.w)
        };
        let world_near = unproject(-1.0);
        let world_far = unproject(1.0);

        match (world_far - world_near).try_normalize(f32::EPSILON) {
            Some(direction) if direction.iter().all(|c| c.is_finite()) => Ray::new(self.position, direction),
            _ => Ray::new(self.position, self.forward()),
        }
    }

    /// Project a world-space point into normalized device coordinates
    ///
    /// Returns `None` for points behind the camera.
    pub fn world_to_ndc(&self, point: Vec3) -> Option<Vec3> {
        let clip = self.get_view_projection_matrix() * point.push(1.0);
        (clip.w > f32::EPSILON).then(|| Vec3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w))
    }
}

impl Default for Camera {
    /// The camera of [`CameraSettings::default`]
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn front_camera() -> Camera {
        Camera::perspective(Vec3::new(0.0, 0.0, 10.0), 75.0, 16.0 / 9.0, 0.1, 1000.0)
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = front_camera();
        let ray = camera.screen_to_world_ray(0.0, 0.0);
        assert_relative_eq!(ray.origin, camera.position);
        assert_relative_eq!(ray.direction, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_ndc_axes_orientation() {
        let camera = front_camera();
        let up_right = camera.screen_to_world_ray(0.5, 0.5);
        assert!(up_right.direction.x > 0.0);
        assert!(up_right.direction.y > 0.0);
    }

    #[test]
    fn test_unproject_inverts_project() {
        let camera = Camera::default();
        let point = Vec3::new(1.5, -0.5, 2.0);

        let ndc = camera.world_to_ndc(point).unwrap();
        let ray = camera.screen_to_world_ray(ndc.x, ndc.y);
        let along = (point - ray.origin).dot(&ray.direction);
        assert_relative_eq!(ray.point_at(along), point, epsilon = 1e-3);
    }

    #[test]
    fn test_point_behind_camera_has_no_projection() {
        assert!(front_camera().world_to_ndc(Vec3::new(0.0, 0.0, 20.0)).is_none());
    }

    #[test]
    fn test_from_settings_uses_viewport_aspect() {
        let camera = Camera::default();
        assert_relative_eq!(camera.aspect, 1280.0 / 720.0);
        assert_eq!(camera.position, Vec3::new(0.0, 8.0, 10.0));
    }
}
