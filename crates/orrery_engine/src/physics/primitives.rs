//! Ray and bounding sphere primitives

use crate::foundation::math::Vec3;

/// A ray in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Origin of the ray
    pub origin: Vec3,
    /// Unit direction of the ray
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; the direction is normalized
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point at distance `t` along the ray
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Where a ray met a sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin
    pub distance: f32,
    /// Hit point in world space
    pub point: Vec3,
}

/// Sphere used as a pick volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// Centre in world space
    pub center: Vec3,
    /// Radius
    pub radius: f32,
}

impl BoundingSphere {
    /// Create a bounding sphere
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Whether `point` lies inside or on the sphere
    pub fn contains(&self, point: &Vec3) -> bool {
        (point - self.center).magnitude_squared() <= self.radius * self.radius
    }

    /// Nearest intersection in front of the ray origin
    ///
    /// A ray starting inside the sphere hits its far side.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<RayHit> {
        // |origin + t*direction - center|^2 = radius^2 with |direction| = 1
        let oc = ray.origin - self.center;
        let b = oc.dot(&ray.direction);
        let c = oc.dot(&oc) - self.radius * self.radius;

        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let near = -b - root;
        let far = -b + root;
        let t = if near >= 0.0 {
            near
        } else if far >= 0.0 {
            far
        } else {
            return None;
        };

        Some(RayHit {
            distance: t,
            point: ray.point_at(t),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ray_direction_is_normalized() {
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -5.0));
        assert_relative_eq!(ray.direction.magnitude(), 1.0);
        assert_relative_eq!(ray.point_at(2.0), Vec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn test_head_on_hit_reports_near_surface() {
        let sphere = BoundingSphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0);
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));

        let hit = sphere.intersect_ray(&ray).unwrap();
        assert_relative_eq!(hit.distance, 9.0, epsilon = 1e-5);
        assert_relative_eq!(hit.point, Vec3::new(0.0, 0.0, -9.0), epsilon = 1e-5);
    }

    #[test]
    fn test_miss_and_behind() {
        let sphere = BoundingSphere::new(Vec3::new(0.0, 3.0, -10.0), 1.0);
        let forward = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.intersect_ray(&forward).is_none());

        let behind = BoundingSphere::new(Vec3::new(0.0, 0.0, 10.0), 1.0);
        assert!(behind.intersect_ray(&forward).is_none());
    }

    #[test]
    fn test_origin_inside_hits_far_side() {
        let sphere = BoundingSphere::new(Vec3::zeros(), 2.0);
        let ray = Ray::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0));

        let hit = sphere.intersect_ray(&ray).unwrap();
        assert_relative_eq!(hit.distance, 2.0, epsilon = 1e-5);
        assert!(sphere.contains(&Vec3::new(0.5, 0.5, 0.5)));
    }
}
