use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use worldkit_common::EntityId;

use crate::components::{AudioSource, Camera, Light, Material};

/// Deterministic component storage for all component types.
///
/// Uses BTreeMap for canonical iteration order. Light and material mutations
/// latch per-frame change flags consumed by the renderer; the flags are
/// runtime state and are not serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentStore {
    lights: BTreeMap<EntityId, Light>,
    cameras: BTreeMap<EntityId, Camera>,
    materials: BTreeMap<EntityId, Material>,
    audio_sources: BTreeMap<EntityId, AudioSource>,
    #[serde(skip)]
    lights_changed: bool,
    #[serde(skip)]
    materials_changed: bool,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the per-frame change flags. Called at the start of every tick,
    /// before any mutation of that tick is processed.
    pub fn begin_frame(&mut self) {
        self.lights_changed = false;
        self.materials_changed = false;
    }

    /// Whether any light was added, modified, or removed this frame.
    pub fn lights_changed_this_frame(&self) -> bool {
        self.lights_changed
    }

    /// Whether any material was added, modified, or removed this frame.
    pub fn materials_changed_this_frame(&self) -> bool {
        self.materials_changed
    }

    /// Latch the light flag without a store mutation. Used when a structural
    /// change elsewhere (an entity commit) makes an existing light visible.
    pub fn mark_lights_changed(&mut self) {
        self.lights_changed = true;
    }

    pub fn mark_materials_changed(&mut self) {
        self.materials_changed = true;
    }

    // --- Light ---
    pub fn set_light(&mut self, entity: EntityId, light: Light) {
        self.lights.insert(entity, light);
        self.lights_changed = true;
    }

    pub fn remove_light(&mut self, entity: EntityId) -> Option<Light> {
        let removed = self.lights.remove(&entity);
        if removed.is_some() {
            self.lights_changed = true;
        }
        removed
    }

    pub fn light(&self, entity: EntityId) -> Option<&Light> {
        self.lights.get(&entity)
    }

    pub fn lights(&self) -> &BTreeMap<EntityId, Light> {
        &self.lights
    }

    // --- Camera ---
    pub fn set_camera(&mut self, entity: EntityId, camera: Camera) {
        self.cameras.insert(entity, camera);
    }

    pub fn remove_camera(&mut self, entity: EntityId) -> Option<Camera> {
        self.cameras.remove(&entity)
    }

    pub fn camera(&self, entity: EntityId) -> Option<&Camera> {
        self.cameras.get(&entity)
    }

    pub fn cameras(&self) -> &BTreeMap<EntityId, Camera> {
        &self.cameras
    }

    // --- Material ---
    pub fn set_material(&mut self, entity: EntityId, material: Material) {
        self.materials.insert(entity, material);
        self.materials_changed = true;
    }

    pub fn remove_material(&mut self, entity: EntityId) -> Option<Material> {
        let removed = self.materials.remove(&entity);
        if removed.is_some() {
            self.materials_changed = true;
        }
        removed
    }

    pub fn material(&self, entity: EntityId) -> Option<&Material> {
        self.materials.get(&entity)
    }

    pub fn materials(&self) -> &BTreeMap<EntityId, Material> {
        &self.materials
    }

    // --- AudioSource ---
    pub fn set_audio_source(&mut self, entity: EntityId, source: AudioSource) {
        self.audio_sources.insert(entity, source);
    }

    pub fn remove_audio_source(&mut self, entity: EntityId) -> Option<AudioSource> {
        self.audio_sources.remove(&entity)
    }

    pub fn audio_source(&self, entity: EntityId) -> Option<&AudioSource> {
        self.audio_sources.get(&entity)
    }

    pub fn audio_sources(&self) -> &BTreeMap<EntityId, AudioSource> {
        &self.audio_sources
    }

    /// Remove all components attached to an entity.
    pub fn remove_entity(&mut self, entity: EntityId) {
        self.remove_light(entity);
        self.remove_camera(entity);
        self.remove_material(entity);
        self.remove_audio_source(entity);
    }

    /// Drop every component of every entity.
    pub fn clear(&mut self) {
        self.lights.clear();
        self.cameras.clear();
        self.materials.clear();
        self.audio_sources.clear();
        self.lights_changed = false;
        self.materials_changed = false;
    }
}
