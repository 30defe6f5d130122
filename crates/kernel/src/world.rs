use glam::Mat4;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use worldkit_common::{BoundingBox, EntityId};
use worldkit_ecs::{AudioSource, Camera, ComponentStore, Light, LightKind, Material};

use crate::clock::WorldClock;
use crate::entity::Entity;

/// Errors from world graph operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("entity {0} not found")]
    EntityNotFound(EntityId),
    #[error("parenting {child} under {parent} would create a cycle")]
    HierarchyCycle { child: EntityId, parent: EntityId },
}

/// The scene world: entity registry, deferred mutation queues, change
/// tracking, clock, and world-level metadata.
///
/// Structural requests (`create_entity`, `remove_entity`) only enqueue; the
/// committed containers are mutated exclusively inside `tick`, in a fixed
/// order: removals drain first (post-order over each subtree), then
/// additions commit, then the index views and bounding box are rebuilt.
/// An entity queued for both addition and removal within one tick ends the
/// tick absent.
///
/// Pending-add entities are visible to `entity_exists` and `get_entity`
/// (handles are valid from the moment of creation) but excluded from
/// iteration-facing queries until committed.
#[derive(Debug, Clone)]
pub struct World {
    name: String,
    file_path: Option<PathBuf>,
    entities: BTreeMap<EntityId, Entity>,
    components: ComponentStore,
    pending_add: Vec<Entity>,
    pending_remove: BTreeSet<EntityId>,
    light_index: Vec<EntityId>,
    camera_index: Option<EntityId>,
    directional_light_index: Option<EntityId>,
    audio_source_count: usize,
    bounds: BoundingBox,
    clock: WorldClock,
    next_id: u64,
    tick_count: u64,
}

impl World {
    /// Create an empty world: no entities, reset clock, cleared flags.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            file_path: None,
            entities: BTreeMap::new(),
            components: ComponentStore::new(),
            pending_add: Vec::new(),
            pending_remove: BTreeSet::new(),
            light_index: Vec::new(),
            camera_index: None,
            directional_light_index: None,
            audio_source_count: 0,
            bounds: BoundingBox::EMPTY,
            clock: WorldClock::new(),
            next_id: 1,
            tick_count: 0,
        }
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::new()
        }
    }

    /// Drop all entities, components, queues, and metadata.
    ///
    /// The id counter is deliberately preserved: ids are never reused within
    /// a process lifetime, even across a clear or a reload.
    pub fn clear(&mut self) {
        self.name.clear();
        self.file_path = None;
        self.entities.clear();
        self.components.clear();
        self.pending_add.clear();
        self.pending_remove.clear();
        self.light_index.clear();
        self.camera_index = None;
        self.directional_light_index = None;
        self.audio_source_count = 0;
        self.bounds = BoundingBox::EMPTY;
        self.clock = WorldClock::new();
        self.tick_count = 0;
    }

    // --- metadata ---

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn set_file_path(&mut self, path: Option<PathBuf>) {
        self.file_path = path;
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Overwrite the tick counter. Used by the persistence restore path.
    pub fn set_tick_count(&mut self, tick: u64) {
        self.tick_count = tick;
    }

    pub fn clock(&self) -> &WorldClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut WorldClock {
        &mut self.clock
    }

    /// Normalized time-of-day in [0, 1); see `WorldClock::time_of_day`.
    pub fn time_of_day(&self, use_wall_clock: bool) -> f32 {
        self.clock.time_of_day(use_wall_clock)
    }

    // --- entity lifecycle ---

    /// Allocate a new entity and queue it for addition at the next tick.
    ///
    /// The returned id is a stable handle, immediately usable with
    /// `get_entity`/`get_entity_mut` and the component setters; the entity
    /// joins iteration-facing queries once the queue drains.
    pub fn create_entity(&mut self) -> EntityId {
        self.create_entity_named("Entity")
    }

    pub fn create_entity_named(&mut self, name: impl Into<String>) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.pending_add.push(Entity::new(id, name));
        tracing::trace!(%id, "entity queued for addition");
        id
    }

    /// Queue an entity (and, at drain time, its whole subtree) for removal.
    ///
    /// Idempotent: queuing an unknown or already-queued id is a no-op.
    pub fn remove_entity(&mut self, id: EntityId) {
        if self.pending_remove.insert(id) {
            tracing::trace!(%id, "entity queued for removal");
        }
    }

    /// Whether the id names a committed or pending-add entity.
    pub fn entity_exists(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id) || self.pending_add.iter().any(|e| e.id() == id)
    }

    /// Look up an entity by id, committed or still pending addition.
    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .get(&id)
            .or_else(|| self.pending_add.iter().find(|e| e.id() == id))
    }

    pub fn get_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        if self.entities.contains_key(&id) {
            return self.entities.get_mut(&id);
        }
        self.pending_add.iter_mut().find(|e| e.id() == id)
    }

    /// The committed entity set, in creation order (ids are monotonic).
    pub fn entities(&self) -> &BTreeMap<EntityId, Entity> {
        &self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Committed entities with no parent, in creation order.
    pub fn root_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(|e| e.is_root())
    }

    /// Reparent `child` under `parent`, or detach it to the root with `None`.
    ///
    /// Both ends may still be pending addition. Fails on unknown ids and on
    /// cycles (including self-parenting).
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> Result<(), WorldError> {
        if !self.entity_exists(child) {
            return Err(WorldError::EntityNotFound(child));
        }
        if let Some(parent_id) = parent {
            if !self.entity_exists(parent_id) {
                return Err(WorldError::EntityNotFound(parent_id));
            }
            // Walk up from the proposed parent; hitting `child` means a cycle.
            let mut cursor = Some(parent_id);
            while let Some(ancestor) = cursor {
                if ancestor == child {
                    return Err(WorldError::HierarchyCycle {
                        child,
                        parent: parent_id,
                    });
                }
                cursor = self.get_entity(ancestor).and_then(Entity::parent);
            }
        }

        let old_parent = self.get_entity(child).and_then(Entity::parent);
        if old_parent == parent {
            return Ok(());
        }
        if let Some(old_id) = old_parent
            && let Some(old) = self.get_entity_mut(old_id)
        {
            old.children.retain(|c| *c != child);
        }
        if let Some(parent_id) = parent
            && let Some(new) = self.get_entity_mut(parent_id)
        {
            new.children.push(child);
        }
        if let Some(entity) = self.get_entity_mut(child) {
            entity.parent = parent;
        }
        Ok(())
    }

    // --- components (routed through the world so flags and index views stay
    //     consistent; to change a property, set the component again) ---

    pub fn set_light(&mut self, id: EntityId, light: Light) -> Result<(), WorldError> {
        self.ensure_exists(id)?;
        self.components.set_light(id, light);
        self.rebuild_indices();
        Ok(())
    }

    pub fn remove_light(&mut self, id: EntityId) -> Option<Light> {
        let removed = self.components.remove_light(id);
        if removed.is_some() {
            self.rebuild_indices();
        }
        removed
    }

    pub fn light(&self, id: EntityId) -> Option<&Light> {
        self.components.light(id)
    }

    pub fn set_camera(&mut self, id: EntityId, camera: Camera) -> Result<(), WorldError> {
        self.ensure_exists(id)?;
        self.components.set_camera(id, camera);
        self.rebuild_indices();
        Ok(())
    }

    pub fn remove_camera(&mut self, id: EntityId) -> Option<Camera> {
        let removed = self.components.remove_camera(id);
        if removed.is_some() {
            self.rebuild_indices();
        }
        removed
    }

    pub fn camera(&self, id: EntityId) -> Option<&Camera> {
        self.components.camera(id)
    }

    pub fn set_material(&mut self, id: EntityId, material: Material) -> Result<(), WorldError> {
        self.ensure_exists(id)?;
        self.components.set_material(id, material);
        Ok(())
    }

    pub fn remove_material(&mut self, id: EntityId) -> Option<Material> {
        self.components.remove_material(id)
    }

    pub fn material(&self, id: EntityId) -> Option<&Material> {
        self.components.material(id)
    }

    pub fn set_audio_source(&mut self, id: EntityId, source: AudioSource) -> Result<(), WorldError> {
        self.ensure_exists(id)?;
        self.components.set_audio_source(id, source);
        self.rebuild_indices();
        Ok(())
    }

    pub fn remove_audio_source(&mut self, id: EntityId) -> Option<AudioSource> {
        let removed = self.components.remove_audio_source(id);
        if removed.is_some() {
            self.rebuild_indices();
        }
        removed
    }

    pub fn audio_source(&self, id: EntityId) -> Option<&AudioSource> {
        self.components.audio_source(id)
    }

    // --- index views (derived from the committed set) ---

    /// Committed light-bearing entities, in creation order.
    pub fn light_entities(&self) -> &[EntityId] {
        &self.light_index
    }

    pub fn light_count(&self) -> usize {
        self.light_index.len()
    }

    /// The active camera: first committed entity with a camera component.
    pub fn active_camera(&self) -> Option<EntityId> {
        self.camera_index
    }

    /// First committed directional light.
    pub fn directional_light(&self) -> Option<EntityId> {
        self.directional_light_index
    }

    pub fn audio_source_count(&self) -> usize {
        self.audio_source_count
    }

    // --- change tracking ---

    pub fn materials_changed_this_frame(&self) -> bool {
        self.components.materials_changed_this_frame()
    }

    pub fn lights_changed_this_frame(&self) -> bool {
        self.components.lights_changed_this_frame()
    }

    // --- frame tick ---

    /// Advance the world one frame.
    ///
    /// Fixed order: reset change flags, drain pending removals, commit
    /// pending additions (removal wins on conflict), rebuild index views,
    /// recompute the world bounding box, advance the clock.
    pub fn tick(&mut self, dt_seconds: f32) {
        let _span = tracing::info_span!("world_tick", tick = self.tick_count + 1).entered();
        self.tick_count += 1;
        self.components.begin_frame();
        self.condemn_descendants();
        self.process_pending_removals();
        self.process_pending_additions();
        self.rebuild_indices();
        self.update_bounds();
        self.clock.tick(f64::from(dt_seconds));
    }

    /// Grow the removal set transitively: any entity, committed or still
    /// pending, whose parent is queued for removal is queued too. Iterated
    /// to a fixpoint so chains resolve regardless of creation order.
    fn condemn_descendants(&mut self) {
        if self.pending_remove.is_empty() {
            return;
        }
        let mut grew = true;
        while grew {
            grew = false;
            let mut newly: Vec<EntityId> = Vec::new();
            for entity in self.entities.values().chain(self.pending_add.iter()) {
                if self.pending_remove.contains(&entity.id()) {
                    continue;
                }
                if let Some(parent) = entity.parent()
                    && self.pending_remove.contains(&parent)
                {
                    newly.push(entity.id());
                }
            }
            if !newly.is_empty() {
                grew = true;
                self.pending_remove.extend(newly);
            }
        }
    }

    fn process_pending_removals(&mut self) {
        if self.pending_remove.is_empty() {
            return;
        }
        let queued: Vec<EntityId> = self.pending_remove.iter().copied().collect();
        let mut removed = 0usize;
        for id in queued {
            // Duplicates and ids already removed as part of an earlier
            // subtree are no-ops; pending-only ids are handled by the
            // addition pass, which also sees the removal set.
            if !self.entities.contains_key(&id) {
                continue;
            }
            for node in self.collect_subtree(id) {
                self.components.remove_entity(node);
                let parent_of = self.entities.get(&node).and_then(Entity::parent);
                // The parent may itself still be pending addition.
                if let Some(parent_id) = parent_of
                    && let Some(parent) = self.get_entity_mut(parent_id)
                {
                    parent.children.retain(|c| *c != node);
                }
                self.entities.remove(&node);
                self.pending_remove.insert(node);
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::debug!(removed, "drained pending removals");
        }
        // The set is kept until additions are processed: removal wins.
    }

    /// Post-order subtree walk: descendants first, `root` last, so removal
    /// never leaves a child pointing at an already-removed parent.
    fn collect_subtree(&self, root: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        self.collect_subtree_into(root, &mut out);
        out
    }

    fn collect_subtree_into(&self, id: EntityId, out: &mut Vec<EntityId>) {
        if let Some(entity) = self.entities.get(&id) {
            for child in &entity.children {
                self.collect_subtree_into(*child, out);
            }
        }
        out.push(id);
    }

    fn process_pending_additions(&mut self) {
        let queued = std::mem::take(&mut self.pending_add);
        if queued.is_empty() {
            self.pending_remove.clear();
            return;
        }

        let mut committed = 0usize;
        let mut cancelled: Vec<(EntityId, Option<EntityId>)> = Vec::new();
        for entity in queued {
            let id = entity.id();
            if self.pending_remove.contains(&id) {
                // Removal wins: drop components attached while pending.
                self.components.remove_entity(id);
                cancelled.push((id, entity.parent()));
                tracing::debug!(%id, "addition cancelled by same-tick removal");
                continue;
            }
            // Components attached while pending become visible only now;
            // flag them as this frame's structural changes.
            if self.components.light(id).is_some() {
                self.components.mark_lights_changed();
            }
            if self.components.material(id).is_some() {
                self.components.mark_materials_changed();
            }
            self.entities.insert(id, entity);
            committed += 1;
        }

        // Scrub cancelled ids out of surviving parents' children lists; the
        // parent may have committed this tick or any earlier one.
        for (id, parent) in cancelled {
            if let Some(parent_id) = parent
                && let Some(parent_entity) = self.entities.get_mut(&parent_id)
            {
                parent_entity.children.retain(|c| *c != id);
            }
        }

        if committed > 0 {
            tracing::debug!(committed, "drained pending additions");
        }
        self.pending_remove.clear();
    }

    /// Rebuild the denormalized views over the committed set. The component
    /// store may also hold components of pending entities; those are
    /// excluded until commit.
    fn rebuild_indices(&mut self) {
        self.light_index = self
            .components
            .lights()
            .keys()
            .filter(|id| self.entities.contains_key(id))
            .copied()
            .collect();
        self.directional_light_index = self
            .light_index
            .iter()
            .find(|id| {
                self.components
                    .light(**id)
                    .is_some_and(|l| l.kind == LightKind::Directional)
            })
            .copied();
        self.camera_index = self
            .components
            .cameras()
            .keys()
            .find(|id| self.entities.contains_key(id))
            .copied();
        self.audio_source_count = self
            .components
            .audio_sources()
            .keys()
            .filter(|id| self.entities.contains_key(id))
            .count();
    }

    fn update_bounds(&mut self) {
        let mut bounds = BoundingBox::EMPTY;
        for entity in self.entities.values() {
            if !entity.active {
                continue;
            }
            let world_bounds = entity.local_bounds.transformed(&self.world_matrix(entity.id()));
            bounds.merge(&world_bounds);
        }
        self.bounds = bounds;
    }

    /// World-space matrix for an entity, resolving the parent chain through
    /// the registry.
    pub fn world_matrix(&self, id: EntityId) -> Mat4 {
        let Some(entity) = self.get_entity(id) else {
            return Mat4::IDENTITY;
        };
        let mut matrix = entity.transform.to_matrix();
        let mut cursor = entity.parent();
        while let Some(parent_id) = cursor {
            let Some(parent) = self.get_entity(parent_id) else {
                break;
            };
            matrix = parent.transform.to_matrix() * matrix;
            cursor = parent.parent();
        }
        matrix
    }

    // --- persistence restore path ---

    /// Insert an entity directly into the committed set, bypassing the
    /// pending queue, and advance the id watermark past it. Parent/children
    /// links are wired separately via `set_parent`; call
    /// `refresh_derived_state` when done.
    pub fn insert_committed(&mut self, entity: Entity) {
        self.next_id = self.next_id.max(entity.id().0 + 1);
        self.entities.insert(entity.id(), entity);
    }

    /// Rebuild index views and the bounding box after a bulk restore.
    pub fn refresh_derived_state(&mut self) {
        self.rebuild_indices();
        self.update_bounds();
    }

    fn ensure_exists(&self, id: EntityId) -> Result<(), WorldError> {
        if self.entity_exists(id) {
            Ok(())
        } else {
            Err(WorldError::EntityNotFound(id))
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
