//! Packed `0xRRGGBB` colours

use serde::{Serialize, Deserialize};

use crate::foundation::math::Vec3;

/// An sRGB colour packed as `0xRRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    /// Selection highlight
    pub const HIGHLIGHT: Self = Self(0x00ff_0000);
    /// Label text
    pub const WHITE: Self = Self(0x00ff_ffff);
    /// Central body
    pub const SUN: Self = Self(0x00ff_ff00);
    /// Orbit path rings
    pub const TRAJECTORY: Self = Self(0x0088_8888);

    /// Red, green and blue channels in `[0, 1]`
    pub fn to_rgb(self) -> Vec3 {
        let [_, r, g, b] = self.0.to_be_bytes();
        Vec3::new(f32::from(r), f32::from(g), f32::from(b)) / 255.0
    }

    /// Red, green, blue and alpha channels in `[0, 1]`, fully opaque
    pub fn to_rgba(self) -> [f32; 4] {
        let rgb = self.to_rgb();
        [rgb.x, rgb.y, rgb.z, 1.0]
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Self(value & 0x00ff_ffff)
    }
}
