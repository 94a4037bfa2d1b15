//! Billboard labels
//!
//! A label is a child of its entity: it stores only an offset, and its world
//! position is re-derived from the owner on every tick. Hiding labels stops
//! them being drawn; they are not destroyed.

use thiserror::Error;

use crate::core::config::SceneSettings;
use crate::foundation::math::Vec3;
use crate::render::color::Color;
use crate::render::text::{FontCache, FontError};
use crate::scene::{EntityHandle, Label, LabelHandle, SceneGraph};

/// Label attachment failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    /// The shared font could not be loaded
    #[error("label font unavailable: {0}")]
    FontUnavailable(#[from] FontError),

    /// Nothing to display
    #[error("label text is empty")]
    EmptyText,

    /// The owning entity is not in the scene
    #[error("no entity {0:?} to label")]
    UnknownEntity(EntityHandle),
}

/// How labels look and where they sit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    /// Glyph height
    pub size: f32,
    /// Height above the owning entity
    pub offset: f32,
    /// Text colour
    pub color: Color,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            size: 0.1,
            offset: 0.1,
            color: Color::WHITE,
        }
    }
}

impl From<&SceneSettings> for LabelStyle {
    fn from(settings: &SceneSettings) -> Self {
        Self {
            size: settings.label_size,
            offset: settings.label_offset,
            ..Self::default()
        }
    }
}

/// Attach a label reading `text` above `entity`
///
/// The shared font is loaded on first use. An entity that already has a
/// label gets the new one in its place.
pub fn attach_label(
    scene: &mut SceneGraph,
    fonts: &FontCache,
    entity: EntityHandle,
    text: &str,
    style: &LabelStyle,
) -> Result<LabelHandle, LabelError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LabelError::EmptyText);
    }
    let owner_position = scene
        .entity(entity)
        .map(|owner| owner.world_position())
        .ok_or(LabelError::UnknownEntity(entity))?;

    let font = fonts.get()?;
    let offset = Vec3::new(0.0, style.offset, 0.0);
    let label = Label {
        owner: entity,
        text: text.to_string(),
        offset,
        world_position: owner_position + offset,
        size: style.size,
        width: font.measure(text, style.size),
        color: style.color,
        font,
    };

    scene.insert_label(label).ok_or(LabelError::UnknownEntity(entity))
}

/// Move every label to its owner's current position plus its offset
pub fn sync_labels(scene: &mut SceneGraph) {
    for handle in scene.label_handles() {
        let Some(owner) = scene.label(handle).map(|label| label.owner) else {
            continue;
        };
        let Some(owner_position) = scene.entity(owner).map(|entity| entity.world_position()) else {
            continue;
        };
        if let Some(label) = scene.label_mut(handle) {
            label.world_position = owner_position + label.offset;
        }
    }
}

/// Label visibility and bulk attachment
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSystem {
    style: LabelStyle,
    visible: bool,
}

impl LabelSystem {
    /// Create a label system
    pub fn new(style: LabelStyle, visible: bool) -> Self {
        Self { style, visible }
    }

    /// Label every entity in `entities` with its name
    ///
    /// Failures are logged and skipped. Returns how many labels were attached.
    pub fn attach_all(&self, scene: &mut SceneGraph, fonts: &FontCache, entities: &[EntityHandle]) -> usize {
        let mut attached = 0;
        for &entity in entities {
            let Some(name) = scene.entity(entity).map(|e| e.name().to_string()) else {
                continue;
            };
            match attach_label(scene, fonts, entity, &name, &self.style) {
                Ok(_) => attached += 1,
                Err(LabelError::FontUnavailable(e)) => {
                    log::warn!("Skipping labels: {e}");
                    break;
                }
                Err(e) => log::warn!("No label for '{name}': {e}"),
            }
        }
        log::debug!("Attached {attached} label(s)");
        attached
    }

    /// Show or hide all labels
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            log::debug!("Labels {}", if visible { "shown" } else { "hidden" });
        }
        self.visible = visible;
    }

    /// Whether labels are drawn
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Style applied to new labels
    pub fn style(&self) -> &LabelStyle {
        &self.style
    }

    /// Labels that should be drawn this frame
    pub fn visible_labels<'a>(&self, scene: &'a SceneGraph) -> Vec<&'a Label> {
        if self.visible {
            scene.labels().map(|(_, label)| label).collect()
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::{ObjectDescriptor, ObjectKind};
    use crate::render::text::{FontResource, FontSource};
    use crate::scene::OrbitParams;
    use crate::scene::population::spawn_entity;
    use crate::systems::orbit_system;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    struct Placeholder;

    impl FontSource for Placeholder {
        fn load(&self) -> Result<FontResource, FontError> {
            Ok(FontResource::placeholder("test"))
        }
    }

    struct Broken;

    impl FontSource for Broken {
        fn load(&self) -> Result<FontResource, FontError> {
            Err(FontError::LoadError("no glyphs".into()))
        }
    }

    fn entity(scene: &mut SceneGraph, name: &str) -> EntityHandle {
        spawn_entity(
            scene,
            Arc::new(ObjectDescriptor::new(name, ObjectKind::Fireball)),
            OrbitParams::new(3.0, 0.1, 0.5).unwrap(),
        )
    }

    #[test]
    fn test_label_sits_above_owner() {
        let mut scene = SceneGraph::new();
        let owner = entity(&mut scene, "Bolide");
        let fonts = FontCache::new(Placeholder);

        let handle = attach_label(&mut scene, &fonts, owner, "Bolide", &LabelStyle::default()).unwrap();
        let label = scene.label(handle).unwrap();
        let expected = scene.entity(owner).unwrap().world_position() + Vec3::new(0.0, 0.1, 0.0);
        assert_relative_eq!(label.world_position, expected);
        assert_eq!(label.text, "Bolide");
        assert!(label.width > 0.0);
    }

    #[test]
    fn test_rejects_empty_text_and_unknown_entity() {
        let mut scene = SceneGraph::new();
        let owner = entity(&mut scene, "x");
        let fonts = FontCache::new(Placeholder);
        let style = LabelStyle::default();

        assert_eq!(attach_label(&mut scene, &fonts, owner, "   ", &style), Err(LabelError::EmptyText));

        scene.clear_entities();
        assert_eq!(
            attach_label(&mut scene, &fonts, owner, "x", &style),
            Err(LabelError::UnknownEntity(owner))
        );
    }

    #[test]
    fn test_labels_follow_owner_through_ticks() {
        let mut scene = SceneGraph::new();
        let owner = entity(&mut scene, "Mover");
        let fonts = FontCache::new(Placeholder);
        let handle = attach_label(&mut scene, &fonts, owner, "Mover", &LabelStyle::default()).unwrap();

        for _ in 0..25 {
            orbit_system::step(&mut scene, 1.0);
            sync_labels(&mut scene);
            let owner_position = scene.entity(owner).unwrap().world_position();
            let label = scene.label(handle).unwrap();
            assert_relative_eq!(label.world_position - owner_position, Vec3::new(0.0, 0.1, 0.0), epsilon = 1e-5);
        }
    }

    #[test]
    fn test_font_failure_skips_remaining_labels() {
        let mut scene = SceneGraph::new();
        let handles: Vec<_> = (0..4).map(|i| entity(&mut scene, &format!("e{i}"))).collect();
        let fonts = FontCache::new(Broken);
        let labels = LabelSystem::new(LabelStyle::default(), true);

        assert_eq!(labels.attach_all(&mut scene, &fonts, &handles), 0);
        assert_eq!(fonts.load_count(), 1);
        assert_eq!(scene.labels().count(), 0);
    }

    #[test]
    fn test_hidden_labels_are_kept() {
        let mut scene = SceneGraph::new();
        let handles: Vec<_> = (0..3).map(|i| entity(&mut scene, &format!("e{i}"))).collect();
        let fonts = FontCache::new(Placeholder);
        let mut labels = LabelSystem::new(LabelStyle::default(), true);
        assert_eq!(labels.attach_all(&mut scene, &fonts, &handles), 3);

        labels.set_visible(false);
        assert!(labels.visible_labels(&scene).is_empty());
        assert_eq!(scene.labels().count(), 3);

        orbit_system::step(&mut scene, 1.0);
        sync_labels(&mut scene);
        labels.set_visible(true);
        for label in labels.visible_labels(&scene) {
            let owner = scene.entity(label.owner).unwrap().world_position();
            assert_relative_eq!(label.world_position, owner + label.offset, epsilon = 1e-6);
        }
    }
}
