//! Picking and selection
//!
//! Picking is event-driven: a click or pointer move is turned into a ray
//! through the active camera and tested against every entity's bounding
//! sphere. The nearest hit along the ray wins.
//!
//! Selection survives a click on empty space. Only a new hit replaces it, and
//! [`PickingSystem::clear_selection`] drops it explicitly. Hover state and the
//! tooltip are transient and cleared on every miss.

use serde::Serialize;

use crate::feeds::ObjectDescriptor;
use crate::feeds::planets::AU;
use crate::input::PointerState;
use crate::physics::BoundingSphere;
use crate::render::Camera;
use crate::render::color::Color;
use crate::scene::{EntityHandle, SceneGraph};

/// Hover annotation for the entity under the pointer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    /// Entity name
    pub name: String,
    /// Distance from the scene origin in astronomical units
    pub distance_au: f32,
}

impl Tooltip {
    /// Tooltip text, e.g. `Mars: 1.52 AU`
    pub fn text(&self) -> String {
        format!("{}: {:.2} AU", self.name, self.distance_au)
    }
}

/// Nearest entity under the pointer at `ndc`
pub fn pick(scene: &SceneGraph, camera: &Camera, ndc: (f32, f32)) -> Option<EntityHandle> {
    pick_scaled(scene, camera, ndc, 1.0)
}

/// [`pick`] with every pick sphere scaled by `radius_scale`
///
/// Ties keep the entity found first in traversal order.
pub fn pick_scaled(scene: &SceneGraph, camera: &Camera, ndc: (f32, f32), radius_scale: f32) -> Option<EntityHandle> {
    let ray = camera.screen_to_world_ray(ndc.0, ndc.1);

    let mut nearest: Option<(EntityHandle, f32)> = None;
    for (handle, entity) in scene.entities() {
        let Some(visual) = scene.visual(entity.visual()) else {
            continue;
        };
        let sphere = BoundingSphere::new(entity.world_position(), visual.radius * radius_scale);
        let Some(hit) = sphere.intersect_ray(&ray) else {
            continue;
        };
        if nearest.map_or(true, |(_, best)| hit.distance < best) {
            nearest = Some((handle, hit.distance));
        }
    }

    if let Some((handle, distance)) = nearest {
        log::debug!("Picked {handle:?} at distance {distance:.3}");
    }
    nearest.map(|(handle, _)| handle)
}

/// Selection, hover and tooltip state
#[derive(Debug, Clone)]
pub struct PickingSystem {
    pointer: PointerState,
    pick_radius_scale: f32,
    selected: Option<EntityHandle>,
    hovered: Option<EntityHandle>,
    tooltip: Option<Tooltip>,
}

impl PickingSystem {
    /// Create a picking system for a viewport of the given size
    pub fn new(viewport_width: u32, viewport_height: u32, pick_radius_scale: f32) -> Self {
        Self {
            pointer: PointerState::new(viewport_width, viewport_height),
            pick_radius_scale,
            selected: None,
            hovered: None,
            tooltip: None,
        }
    }

    /// Handle a click at window pixel `(x, y)`
    ///
    /// On a hit the entity becomes the selection, is highlighted and gets the
    /// tooltip; every other entity returns to its base colour. On a miss hover
    /// and tooltip are cleared and the selection is kept. Returns the hit, if any.
    pub fn select_at(&mut self, scene: &mut SceneGraph, camera: &Camera, x: f64, y: f64) -> Option<EntityHandle> {
        self.pointer.update_position(x, y);
        let hit = pick_scaled(scene, camera, self.pointer.screen_to_ndc(), self.pick_radius_scale);

        match hit {
            Some(handle) => {
                self.selected = Some(handle);
                self.hovered = Some(handle);
                self.tooltip = tooltip_for(scene, handle);
                apply_highlight(scene, Some(handle));
                if let Some(entity) = scene.entity(handle) {
                    log::info!("Selected '{}'", entity.name());
                }
            }
            None => {
                self.hovered = None;
                self.tooltip = None;
            }
        }
        hit
    }

    /// Handle a pointer move to window pixel `(x, y)`
    pub fn hover_at(&mut self, scene: &SceneGraph, camera: &Camera, x: f64, y: f64) -> Option<&Tooltip> {
        self.pointer.update_position(x, y);
        let hit = pick_scaled(scene, camera, self.pointer.screen_to_ndc(), self.pick_radius_scale);

        self.hovered = hit;
        self.tooltip = hit.and_then(|handle| tooltip_for(scene, handle));
        self.tooltip.as_ref()
    }

    /// Drop the selection and restore base colours
    pub fn clear_selection(&mut self, scene: &mut SceneGraph) {
        if self.selected.take().is_some() {
            apply_highlight(scene, None);
        }
    }

    /// Forget all state; used when the scene is rebuilt
    pub fn reset(&mut self) {
        self.selected = None;
        self.hovered = None;
        self.tooltip = None;
    }

    /// Update the viewport after a resize
    pub fn resize(&mut self, width: u32, height: u32) {
        self.pointer.update_viewport(width, height);
    }

    /// Selected entity
    pub fn selected(&self) -> Option<EntityHandle> {
        self.selected
    }

    /// Entity under the pointer
    pub fn hovered(&self) -> Option<EntityHandle> {
        self.hovered
    }

    /// Tooltip for the hovered entity
    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Source record of the selected entity
    pub fn selected_descriptor<'a>(&self, scene: &'a SceneGraph) -> Option<&'a ObjectDescriptor> {
        self.selected
            .and_then(|handle| scene.entity(handle))
            .map(|entity| entity.descriptor().as_ref())
    }

    /// Selected entity's record as pretty JSON, for the info panel
    pub fn selection_info(&self, scene: &SceneGraph) -> Option<String> {
        let descriptor = self.selected_descriptor(scene)?;
        match serde_json::to_string_pretty(descriptor) {
            Ok(json) => Some(json),
            Err(e) => {
                log::warn!("Could not serialise '{}': {e}", descriptor.name);
                None
            }
        }
    }
}

fn tooltip_for(scene: &SceneGraph, handle: EntityHandle) -> Option<Tooltip> {
    scene.entity(handle).map(|entity| Tooltip {
        name: entity.name().to_string(),
        distance_au: entity.world_position().magnitude() / AU,
    })
}

/// Colour `selected` with the highlight and everything else with its base colour
fn apply_highlight(scene: &mut SceneGraph, selected: Option<EntityHandle>) {
    let count = scene.handles().len();
    for i in 0..count {
        let handle = scene.handles()[i];
        let Some((visual, base)) = scene.entity(handle).map(|e| (e.visual(), e.base_color())) else {
            continue;
        };
        let color = if Some(handle) == selected { Color::HIGHLIGHT } else { base };
        if let Some(visual) = scene.visual_mut(visual) {
            visual.color = color;
        }
    }
}
