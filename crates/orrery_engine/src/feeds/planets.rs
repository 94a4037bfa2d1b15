//! The fixed solar-system dataset
//!
//! Distances are in scaled astronomical units and speeds are relative to
//! Earth, exactly as the classic orrery view drew them.

use super::{keys, DataFeed, FeedError, ObjectDescriptor, ObjectKind};

/// Scene units per astronomical unit
pub const AU: f32 = 4.0;

/// Angular speed per tick of a body with relative speed 1.0
const SPEED_SCALE: f32 = 0.01;

/// Axial rotation per tick of every planet
const PLANET_SPIN: f32 = 0.01;

/// Angular speed per tick of the moons around their planet
const MOON_SPEED: f32 = 0.02;

struct Body {
    name: &'static str,
    radius: f32,
    distance_au: f32,
    color: u32,
    relative_speed: f32,
}

const PLANETS: [Body; 8] = [
    Body { name: "Mercury", radius: 0.2, distance_au: 0.39, color: 0x8b_4513, relative_speed: 0.24 },
    Body { name: "Venus", radius: 0.4, distance_au: 0.72, color: 0xff_cc00, relative_speed: 0.615 },
    Body { name: "Earth", radius: 0.5, distance_au: 1.00, color: 0x00_00ff, relative_speed: 1.0 },
    Body { name: "Mars", radius: 0.4, distance_au: 1.52, color: 0xff_4500, relative_speed: 0.524 },
    Body { name: "Jupiter", radius: 0.6, distance_au: 5.20, color: 0x00_ff00, relative_speed: 0.083 },
    Body { name: "Saturn", radius: 0.5, distance_au: 9.54, color: 0xff_d700, relative_speed: 0.034 },
    Body { name: "Uranus", radius: 0.4, distance_au: 19.22, color: 0x00_ffff, relative_speed: 0.012 },
    Body { name: "Neptune", radius: 0.4, distance_au: 30.06, color: 0x00_00ff, relative_speed: 0.0068 },
];

/// (moon, parent, distance in AU)
const MOONS: [(&str, &str, f32); 2] = [("Moon", "Earth", 0.6), ("Phobos", "Mars", 0.8)];

const MOON_RADIUS: f32 = 0.1;
const MOON_COLOR: u32 = 0xaa_aaaa;

/// Built-in source of planets and moons
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanetaryDataset;

impl PlanetaryDataset {
    /// Planet descriptors, innermost first
    pub fn planets() -> Vec<ObjectDescriptor> {
        PLANETS
            .iter()
            .map(|body| {
                ObjectDescriptor::new(body.name, ObjectKind::Planet)
                    .with_attribute(keys::ORBIT_RADIUS, body.distance_au * AU)
                    .with_attribute(keys::ANGULAR_SPEED, body.relative_speed * SPEED_SCALE)
                    .with_attribute(keys::BODY_RADIUS, body.radius)
                    .with_attribute(keys::COLOR, body.color)
                    .with_attribute(keys::SPIN_RATE, PLANET_SPIN)
                    .with_attribute("distance_au", body.distance_au)
            })
            .collect()
    }

    /// Moon descriptors; each names its parent planet
    pub fn moons() -> Vec<ObjectDescriptor> {
        MOONS
            .iter()
            .map(|&(name, parent, distance_au)| {
                ObjectDescriptor::new(name, ObjectKind::Moon)
                    .with_attribute(keys::ORBIT_RADIUS, distance_au * AU)
                    .with_attribute(keys::ANGULAR_SPEED, MOON_SPEED)
                    .with_attribute(keys::BODY_RADIUS, MOON_RADIUS)
                    .with_attribute(keys::COLOR, MOON_COLOR)
                    .with_attribute(keys::PARENT, parent)
            })
            .collect()
    }
}

impl DataFeed for PlanetaryDataset {
    fn fetch_fireballs(&self) -> Result<Vec<ObjectDescriptor>, FeedError> {
        Ok(Vec::new())
    }

    fn fetch_small_bodies(&self) -> Result<Vec<ObjectDescriptor>, FeedError> {
        Ok(Vec::new())
    }

    fn fetch(&self, kind: ObjectKind) -> Result<Vec<ObjectDescriptor>, FeedError> {
        Ok(match kind {
            ObjectKind::Planet => Self::planets(),
            ObjectKind::Moon => Self::moons(),
            ObjectKind::Fireball | ObjectKind::SmallBody => Vec::new(),
        })
    }
}
