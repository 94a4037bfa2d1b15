//! Scene graph
//!
//! The graph exclusively owns every entity, visual and label. Everything
//! else refers to them by `slotmap` key, so entity, visual and label never
//! hold references to each other.

use slotmap::{new_key_type, SlotMap};

use crate::feeds::ObjectKind;

use super::entity::{Label, OrbitingEntity, StaticBody, Visual};

new_key_type! {
    /// Stable key of an orbiting entity
    pub struct EntityHandle;
    /// Stable key of a visual
    pub struct VisualHandle;
    /// Stable key of a label
    pub struct LabelHandle;
}

/// Arena of everything in the orrery
#[derive(Debug, Default)]
pub struct SceneGraph {
    entities: SlotMap<EntityHandle, OrbitingEntity>,
    /// Insertion order; parents always precede their children
    order: Vec<EntityHandle>,
    visuals: SlotMap<VisualHandle, Visual>,
    labels: SlotMap<LabelHandle, Label>,
    statics: Vec<StaticBody>,
}

impl SceneGraph {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a body that never moves, such as the central star
    pub fn add_static_body(&mut self, name: impl Into<String>, visual: Visual) -> VisualHandle {
        let visual = self.visuals.insert(visual);
        self.statics.push(StaticBody {
            name: name.into(),
            visual,
        });
        visual
    }

    pub(crate) fn insert_visual(&mut self, visual: Visual) -> VisualHandle {
        self.visuals.insert(visual)
    }

    /// Insert a fully built entity; it becomes visible to every system at once
    pub(crate) fn insert_entity(&mut self, entity: OrbitingEntity) -> EntityHandle {
        let handle = self.entities.insert(entity);
        self.order.push(handle);
        handle
    }

    /// Insert a label and link it to its owner
    ///
    /// Returns `None` when the owner is not in the scene.
    pub(crate) fn insert_label(&mut self, label: Label) -> Option<LabelHandle> {
        let owner = label.owner;
        if !self.entities.contains_key(owner) {
            return None;
        }
        let handle = self.labels.insert(label);
        if let Some(entity) = self.entities.get_mut(owner) {
            if let Some(previous) = entity.label.replace(handle) {
                self.labels.remove(previous);
            }
        }
        Some(handle)
    }

    /// Look up an entity
    pub fn entity(&self, handle: EntityHandle) -> Option<&OrbitingEntity> {
        self.entities.get(handle)
    }

    pub(crate) fn entity_mut(&mut self, handle: EntityHandle) -> Option<&mut OrbitingEntity> {
        self.entities.get_mut(handle)
    }

    /// Look up a visual
    pub fn visual(&self, handle: VisualHandle) -> Option<&Visual> {
        self.visuals.get(handle)
    }

    pub(crate) fn visual_mut(&mut self, handle: VisualHandle) -> Option<&mut Visual> {
        self.visuals.get_mut(handle)
    }

    /// Look up a label
    pub fn label(&self, handle: LabelHandle) -> Option<&Label> {
        self.labels.get(handle)
    }

    pub(crate) fn label_mut(&mut self, handle: LabelHandle) -> Option<&mut Label> {
        self.labels.get_mut(handle)
    }

    /// Entity handles in traversal order
    pub fn handles(&self) -> &[EntityHandle] {
        &self.order
    }

    /// Entities in traversal order
    pub fn entities(&self) -> impl Iterator<Item = (EntityHandle, &OrbitingEntity)> + '_ {
        self.order
            .iter()
            .filter_map(|&handle| self.entities.get(handle).map(|entity| (handle, entity)))
    }

    /// Every visual, static bodies included
    pub fn visuals(&self) -> impl Iterator<Item = (VisualHandle, &Visual)> + '_ {
        self.visuals.iter()
    }

    /// Every label
    pub fn labels(&self) -> impl Iterator<Item = (LabelHandle, &Label)> + '_ {
        self.labels.iter()
    }

    pub(crate) fn label_handles(&self) -> Vec<LabelHandle> {
        self.labels.keys().collect()
    }

    /// Bodies that never move
    pub fn static_bodies(&self) -> &[StaticBody] {
        &self.statics
    }

    /// Number of orbiting entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether there are no orbiting entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of orbiting entities of `kind`
    pub fn count_of_kind(&self, kind: ObjectKind) -> usize {
        self.entities.values().filter(|entity| entity.kind() == kind).count()
    }

    /// First entity named `name`, in traversal order
    pub fn find_by_name(&self, name: &str) -> Option<EntityHandle> {
        self.entities()
            .find(|(_, entity)| entity.name() == name)
            .map(|(handle, _)| handle)
    }

    /// Remove every orbiting entity with its visual and label, keeping static bodies
    pub fn clear_entities(&mut self) {
        for (_, entity) in self.entities.drain() {
            self.visuals.remove(entity.visual);
            if let Some(label) = entity.label {
                self.labels.remove(label);
            }
        }
        self.labels.clear();
        self.order.clear();
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.entities.clear();
        self.order.clear();
        self.visuals.clear();
        self.labels.clear();
        self.statics.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::ObjectDescriptor;
    use crate::foundation::math::Vec3;
    use crate::render::color::Color;
    use crate::render::text::FontResource;
    use crate::scene::entity::OrbitParams;
    use std::sync::Arc;

    fn entity(scene: &mut SceneGraph, name: &str, kind: ObjectKind) -> EntityHandle {
        let visual = scene.insert_visual(Visual::sphere(0.1, Color::WHITE));
        scene.insert_entity(OrbitingEntity {
            descriptor: Arc::new(ObjectDescriptor::new(name, kind)),
            visual,
            orbit: OrbitParams::new(2.0, 0.01, 0.0).unwrap(),
            plane_normal: Vec3::y(),
            parent: None,
            local_position: Vec3::new(2.0, 0.0, 0.0),
            world_position: Vec3::new(2.0, 0.0, 0.0),
            base_color: Color::WHITE,
            label: None,
        })
    }

    fn label(owner: EntityHandle) -> Label {
        Label {
            owner,
            text: "x".into(),
            offset: Vec3::y() * 0.1,
            world_position: Vec3::zeros(),
            size: 0.1,
            width: 0.06,
            color: Color::WHITE,
            font: Arc::new(FontResource::placeholder("test")),
        }
    }

    #[test]
    fn test_traversal_order_and_lookup() {
        let mut scene = SceneGraph::new();
        let a = entity(&mut scene, "a", ObjectKind::Fireball);
        let b = entity(&mut scene, "b", ObjectKind::SmallBody);
        let c = entity(&mut scene, "c", ObjectKind::Fireball);

        assert_eq!(scene.handles(), [a, b, c]);
        assert_eq!(scene.find_by_name("b"), Some(b));
        assert_eq!(scene.find_by_name("zz"), None);
        assert_eq!(scene.count_of_kind(ObjectKind::Fireball), 2);
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn test_label_links_to_owner() {
        let mut scene = SceneGraph::new();
        let a = entity(&mut scene, "a", ObjectKind::Fireball);

        let first = scene.insert_label(label(a)).unwrap();
        let second = scene.insert_label(label(a)).unwrap();
        assert_eq!(scene.entity(a).unwrap().label(), Some(second));
        assert!(scene.label(first).is_none());
        assert_eq!(scene.labels().count(), 1);
    }

    #[test]
    fn test_label_for_missing_owner_rejected() {
        let mut scene = SceneGraph::new();
        let a = entity(&mut scene, "a", ObjectKind::Fireball);
        scene.clear_entities();
        assert!(scene.insert_label(label(a)).is_none());
    }

    #[test]
    fn test_clear_entities_keeps_static_bodies() {
        let mut scene = SceneGraph::new();
        let sun = scene.add_static_body("Sun", Visual::sphere(0.5, Color::SUN));
        let a = entity(&mut scene, "a", ObjectKind::Planet);
        scene.insert_label(label(a)).unwrap();

        scene.clear_entities();
        assert!(scene.is_empty());
        assert!(scene.handles().is_empty());
        assert_eq!(scene.labels().count(), 0);
        assert_eq!(scene.visuals().count(), 1);
        assert!(scene.visual(sun).is_some());

        scene.clear();
        assert!(scene.static_bodies().is_empty());
        assert_eq!(scene.visuals().count(), 0);
    }
}
