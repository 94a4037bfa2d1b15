//! Bulk creation of orbiting entities from feed descriptors

use std::sync::Arc;

use rand::Rng;

use crate::core::config::OrbitRanges;
use crate::feeds::{keys, ObjectDescriptor};
use crate::foundation::math::{Vec3, constants::TAU};
use crate::render::color::Color;

use super::entity::{OrbitParams, OrbitingEntity, Visual};
use super::{EntityHandle, SceneGraph};

/// Create entities for `descriptors`
///
/// At most `limit` entities of each kind end up in the scene, counting the
/// ones already there; excess descriptors are dropped in order. Orbital
/// parameters carried by a descriptor are used as given, the rest are drawn
/// from `ranges`. Returns the new handles in creation order.
pub fn populate<R: Rng + ?Sized>(
    scene: &mut SceneGraph,
    descriptors: Vec<ObjectDescriptor>,
    limit: usize,
    ranges: &OrbitRanges,
    rng: &mut R,
) -> Vec<EntityHandle> {
    if let Err(e) = ranges.validate() {
        log::error!("Refusing to populate: {e}");
        return Vec::new();
    }

    let mut created = Vec::new();
    let mut dropped = 0_usize;

    for descriptor in descriptors {
        if scene.count_of_kind(descriptor.kind) >= limit {
            dropped += 1;
            continue;
        }

        let Some(orbit) = orbit_for(&descriptor, ranges, rng) else {
            log::warn!("Skipping '{}': unusable orbit parameters", descriptor.name);
            continue;
        };

        created.push(spawn_entity(scene, Arc::new(descriptor), orbit));
    }

    if dropped > 0 {
        log::debug!("Dropped {dropped} descriptor(s) over the per-kind limit of {limit}");
    }
    log::debug!("Populated {} entities ({} total)", created.len(), scene.len());
    created
}

/// Orbital parameters for `descriptor`, synthesising what it does not carry
fn orbit_for<R: Rng + ?Sized>(descriptor: &ObjectDescriptor, ranges: &OrbitRanges, rng: &mut R) -> Option<OrbitParams> {
    let radius = attribute_f32(descriptor, keys::ORBIT_RADIUS)
        .filter(|radius| *radius > 0.0)
        .unwrap_or_else(|| rng.gen_range(ranges.radius_min..ranges.radius_max));
    let angular_speed = attribute_f32(descriptor, keys::ANGULAR_SPEED)
        .unwrap_or_else(|| rng.gen_range(ranges.speed_min..ranges.speed_max));
    let phase = rng.gen_range(0.0..TAU);

    OrbitParams::new(radius, angular_speed, phase)
}

/// Build one entity with its visual and insert it
///
/// The entity is complete, with its position already derived, before the
/// graph sees it.
pub(crate) fn spawn_entity(scene: &mut SceneGraph, descriptor: Arc<ObjectDescriptor>, orbit: OrbitParams) -> EntityHandle {
    let kind = descriptor.kind;

    let parent = descriptor.text(keys::PARENT).and_then(|name| {
        let found = scene.find_by_name(name);
        if found.is_none() {
            log::warn!("'{}' orbits unknown body '{name}', using the origin", descriptor.name);
        }
        found
    });
    let center = parent
        .and_then(|handle| scene.entity(handle))
        .map_or_else(Vec3::zeros, |entity| entity.world_position());

    let base_color = descriptor
        .attributes
        .get(keys::COLOR)
        .and_then(serde_json::Value::as_u64)
        .and_then(|color| u32::try_from(color).ok())
        .map_or_else(|| Color(kind.default_color()), Color::from);
    let body_radius = attribute_f32(&descriptor, keys::BODY_RADIUS)
        .filter(|radius| *radius > 0.0)
        .unwrap_or_else(|| kind.default_body_radius());

    let local_position = orbit.local_position(0.0);
    let world_position = center + local_position;

    let mut visual = Visual::sphere(body_radius, base_color);
    visual.position = world_position;
    visual.spin_rate = attribute_f32(&descriptor, keys::SPIN_RATE).unwrap_or(0.0);
    let visual = scene.insert_visual(visual);

    scene.insert_entity(OrbitingEntity {
        descriptor,
        visual,
        orbit,
        plane_normal: Vec3::y(),
        parent,
        local_position,
        world_position,
        base_color,
        label: None,
    })
}

#[allow(clippy::cast_possible_truncation)]
fn attribute_f32(descriptor: &ObjectDescriptor, key: &str) -> Option<f32> {
    descriptor
        .number(key)
        .map(|value| value as f32)
        .filter(|value| value.is_finite())
}
