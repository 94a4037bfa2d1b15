//! Scene nodes: orbiting entities, their visuals and labels

use std::sync::Arc;

use crate::feeds::{ObjectDescriptor, ObjectKind};
use crate::foundation::math::{Vec3, utils};
use crate::render::color::Color;
use crate::render::text::FontResource;

use super::{EntityHandle, LabelHandle, VisualHandle};

/// Circular orbital parameters
///
/// The radius is fixed at creation. Only the phase moves, and it always
/// stays in `[0, 2π)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitParams {
    radius: f32,
    angular_speed: f32,
    phase: f32,
}

impl OrbitParams {
    /// Create orbit parameters; `None` unless `radius` is positive and finite
    pub fn new(radius: f32, angular_speed: f32, phase: f32) -> Option<Self> {
        if !(radius.is_finite() && radius > 0.0 && angular_speed.is_finite() && phase.is_finite()) {
            return None;
        }
        Some(Self {
            radius,
            angular_speed,
            phase: utils::wrap_angle(phase),
        })
    }

    /// Orbit radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Radians per tick at unit speed
    pub fn angular_speed(&self) -> f32 {
        self.angular_speed
    }

    /// Current angle in `[0, 2π)`
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Advance the phase by one tick at `multiplier`
    pub(crate) fn advance(&mut self, multiplier: f32) {
        self.phase = utils::wrap_angle(self.phase + self.angular_speed * multiplier);
    }

    /// Position on the orbit in the parent's frame, at height `y`
    pub fn local_position(&self, y: f32) -> Vec3 {
        utils::planar_circle_point(self.radius, self.phase, y)
    }
}

/// A drawable sphere owned by the scene graph
#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    /// World position of the centre
    pub position: Vec3,
    /// Sphere radius
    pub radius: f32,
    /// Colour currently drawn
    pub color: Color,
    /// Axial rotation in `[0, 2π)`
    pub spin: f32,
    /// Axial rotation per tick
    pub spin_rate: f32,
}

impl Visual {
    /// A non-spinning sphere at the origin
    pub fn sphere(radius: f32, color: Color) -> Self {
        Self {
            position: Vec3::zeros(),
            radius,
            color,
            spin: 0.0,
            spin_rate: 0.0,
        }
    }
}

/// Billboard text that follows its owning entity
#[derive(Debug, Clone)]
pub struct Label {
    /// Entity the label belongs to
    pub owner: EntityHandle,
    /// Displayed text
    pub text: String,
    /// Offset from the owner's position
    pub offset: Vec3,
    /// Derived world position
    pub world_position: Vec3,
    /// Glyph height
    pub size: f32,
    /// Measured text width
    pub width: f32,
    /// Text colour
    pub color: Color,
    /// Shared font
    pub font: Arc<FontResource>,
}

/// A body that never moves, such as the central star
#[derive(Debug, Clone, PartialEq)]
pub struct StaticBody {
    /// Display name
    pub name: String,
    /// Visual drawn for the body
    pub visual: VisualHandle,
}

/// A celestial object on a circular orbit
#[derive(Debug, Clone)]
pub struct OrbitingEntity {
    pub(crate) descriptor: Arc<ObjectDescriptor>,
    pub(crate) visual: VisualHandle,
    pub(crate) orbit: OrbitParams,
    pub(crate) plane_normal: Vec3,
    pub(crate) parent: Option<EntityHandle>,
    pub(crate) local_position: Vec3,
    pub(crate) world_position: Vec3,
    pub(crate) base_color: Color,
    pub(crate) label: Option<LabelHandle>,
}

impl OrbitingEntity {
    /// Source record
    pub fn descriptor(&self) -> &Arc<ObjectDescriptor> {
        &self.descriptor
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Object kind
    pub fn kind(&self) -> ObjectKind {
        self.descriptor.kind
    }

    /// Drawn sphere
    pub fn visual(&self) -> VisualHandle {
        self.visual
    }

    /// Orbital parameters
    pub fn orbit(&self) -> &OrbitParams {
        &self.orbit
    }

    /// Normal of the orbital plane
    pub fn plane_normal(&self) -> Vec3 {
        self.plane_normal
    }

    /// Body this entity orbits, if not the scene origin
    pub fn parent(&self) -> Option<EntityHandle> {
        self.parent
    }

    /// Position relative to the orbit centre
    pub fn local_position(&self) -> Vec3 {
        self.local_position
    }

    /// Position in the world
    pub fn world_position(&self) -> Vec3 {
        self.world_position
    }

    /// Orbit centre in the world
    pub fn orbit_center(&self) -> Vec3 {
        self.world_position - self.local_position
    }

    /// Colour when not highlighted
    pub fn base_color(&self) -> Color {
        self.base_color
    }

    /// Attached label, if any
    pub fn label(&self) -> Option<LabelHandle> {
        self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::foundation::math::constants::TAU;

    #[test]
    fn test_orbit_params_reject_bad_radius() {
        assert!(OrbitParams::new(0.0, 0.01, 0.0).is_none());
        assert!(OrbitParams::new(-2.0, 0.01, 0.0).is_none());
        assert!(OrbitParams::new(f32::NAN, 0.01, 0.0).is_none());
        assert!(OrbitParams::new(2.0, f32::INFINITY, 0.0).is_none());
    }

    #[test]
    fn test_phase_wraps_on_creation_and_advance() {
        let mut orbit = OrbitParams::new(3.0, 1.0, TAU + 0.25).unwrap();
        assert_relative_eq!(orbit.phase(), 0.25, epsilon = 1e-5);

        for _ in 0..20 {
            orbit.advance(1.0);
            assert!((0.0..TAU).contains(&orbit.phase()));
        }

        orbit.advance(-50.0);
        assert!((0.0..TAU).contains(&orbit.phase()));
    }
}
