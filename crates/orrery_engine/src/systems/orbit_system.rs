//! Orbit kinematics
//!
//! Motion is planar and circular: each tick the phase advances by
//! `angular_speed × multiplier` and the position is read off the circle.
//! Advancement is per tick, so the apparent speed follows the frame rate.

use crate::foundation::math::{Vec3, utils};
use crate::scene::SceneGraph;

/// Advance every entity by one tick
///
/// All phases advance first, then world positions are resolved in traversal
/// order (parents precede children), then visuals follow their entities.
pub fn step(scene: &mut SceneGraph, multiplier: f32) {
    let count = scene.handles().len();

    for i in 0..count {
        let handle = scene.handles()[i];
        if let Some(entity) = scene.entity_mut(handle) {
            entity.orbit.advance(multiplier);
            entity.local_position = entity.orbit.local_position(entity.local_position.y);
        }
    }

    for i in 0..count {
        let handle = scene.handles()[i];
        let Some(parent) = scene.entity(handle).map(|entity| entity.parent) else {
            continue;
        };
        let center = parent
            .and_then(|parent| scene.entity(parent))
            .map_or_else(Vec3::zeros, |parent| parent.world_position);

        if let Some(entity) = scene.entity_mut(handle) {
            entity.world_position = center + entity.local_position;
        }
    }

    for i in 0..count {
        let handle = scene.handles()[i];
        let Some((visual, position)) = scene.entity(handle).map(|entity| (entity.visual, entity.world_position)) else {
            continue;
        };
        if let Some(visual) = scene.visual_mut(visual) {
            visual.position = position;
            if visual.spin_rate != 0.0 {
                visual.spin = utils::wrap_angle(visual.spin + visual.spin_rate);
            }
        }
    }

    log::trace!("Stepped {count} orbits at x{multiplier}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::OrbitRanges;
    use crate::feeds::{ObjectDescriptor, ObjectKind, PlanetaryDataset};
    use crate::foundation::math::constants::TAU;
    use crate::scene::population::{populate, spawn_entity};
    use crate::scene::OrbitParams;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;

    fn single(radius: f32, speed: f32, phase: f32) -> (SceneGraph, crate::scene::EntityHandle) {
        let mut scene = SceneGraph::new();
        let handle = spawn_entity(
            &mut scene,
            Arc::new(ObjectDescriptor::new("probe", ObjectKind::SmallBody)),
            OrbitParams::new(radius, speed, phase).unwrap(),
        );
        (scene, handle)
    }

    #[test]
    fn test_quarter_turn() {
        let (mut scene, handle) = single(2.0, TAU / 4.0, 0.0);
        step(&mut scene, 1.0);

        let entity = scene.entity(handle).unwrap();
        assert_relative_eq!(entity.world_position(), Vec3::new(0.0, 0.0, 2.0), epsilon = 1e-5);
    }

    #[test]
    fn test_zero_multiplier_freezes_motion() {
        let (mut scene, handle) = single(3.0, 0.02, 1.0);
        let before = scene.entity(handle).unwrap().world_position();
        for _ in 0..10 {
            step(&mut scene, 0.0);
        }
        assert_eq!(scene.entity(handle).unwrap().world_position(), before);
    }

    #[test]
    fn test_visual_follows_and_y_is_preserved() {
        let mut scene = SceneGraph::new();
        let mut rng = StdRng::seed_from_u64(11);
        populate(
            &mut scene,
            (0..5).map(|i| ObjectDescriptor::new(format!("n{i}"), ObjectKind::Fireball)).collect(),
            10,
            &OrbitRanges::default(),
            &mut rng,
        );

        for _ in 0..37 {
            step(&mut scene, 2.5);
        }
        for (_, entity) in scene.entities() {
            let visual = scene.visual(entity.visual()).unwrap();
            assert_eq!(visual.position, entity.world_position());
            assert_eq!(entity.local_position().y, 0.0);
        }
    }

    #[test]
    fn test_moon_tracks_planet() {
        let mut scene = SceneGraph::new();
        let mut rng = StdRng::seed_from_u64(12);
        populate(&mut scene, [PlanetaryDataset::planets(), PlanetaryDataset::moons()].concat(), usize::MAX, &OrbitRanges::default(), &mut rng);

        for _ in 0..100 {
            step(&mut scene, 3.0);
        }

        let mars = scene.entity(scene.find_by_name("Mars").unwrap()).unwrap();
        let phobos = scene.entity(scene.find_by_name("Phobos").unwrap()).unwrap();
        assert_relative_eq!(phobos.orbit_center(), mars.world_position(), epsilon = 1e-4);
        assert_relative_eq!(
            (phobos.world_position() - mars.world_position()).magnitude(),
            phobos.orbit().radius(),
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_planets_spin() {
        let mut scene = SceneGraph::new();
        let mut rng = StdRng::seed_from_u64(13);
        populate(&mut scene, PlanetaryDataset::planets(), usize::MAX, &OrbitRanges::default(), &mut rng);

        for _ in 0..3 {
            step(&mut scene, 0.0);
        }
        let earth = scene.entity(scene.find_by_name("Earth").unwrap()).unwrap();
        assert_relative_eq!(scene.visual(earth.visual()).unwrap().spin, 0.03, epsilon = 1e-5);
    }
}
