use serde::{Deserialize, Serialize};
use worldkit_common::{BoundingBox, EntityId, Transform};
use worldkit_ecs::{AudioSource, Camera, Light, Material};
use worldkit_kernel::{Entity, World};

/// Persisted form of one entity together with its attached components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: EntityId,
    pub name: String,
    pub transform: Transform,
    pub parent: Option<EntityId>,
    pub active: bool,
    pub local_bounds: BoundingBox,
    pub light: Option<Light>,
    pub camera: Option<Camera>,
    pub material: Option<Material>,
    pub audio_source: Option<AudioSource>,
}

/// Whole-graph snapshot: world metadata plus every committed entity.
///
/// Pending queues are not captured; anything still queued has not yet
/// entered the world graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub name: String,
    pub elapsed_seconds: f64,
    pub day_length_seconds: f64,
    pub tick: u64,
    pub entities: Vec<EntityRecord>,
}

impl WorldSnapshot {
    /// Capture the committed state of a world, entities in id order.
    pub fn capture(world: &World) -> Self {
        let entities = world
            .entities()
            .values()
            .map(|entity| {
                let id = entity.id();
                EntityRecord {
                    id,
                    name: entity.name.clone(),
                    transform: entity.transform,
                    parent: entity.parent(),
                    active: entity.active,
                    local_bounds: entity.local_bounds,
                    light: world.light(id).copied(),
                    camera: world.camera(id).copied(),
                    material: world.material(id).cloned(),
                    audio_source: world.audio_source(id).cloned(),
                }
            })
            .collect();

        Self {
            name: world.name().to_string(),
            elapsed_seconds: world.clock().elapsed_seconds(),
            day_length_seconds: world.clock().day_length_seconds(),
            tick: world.tick_count(),
            entities,
        }
    }

    /// Reconstruct a fresh world from this snapshot.
    pub fn restore(&self) -> World {
        let mut world = World::new();
        self.restore_into(&mut world);
        world
    }

    /// Reconstruct this snapshot into `world`, which must already be empty.
    ///
    /// Two passes over the records: first every entity is inserted under its
    /// preserved id (which also advances the id watermark), then parent
    /// links are wired, so record order never matters. The change flags end
    /// up raised: after a load the whole graph is new to any consumer.
    pub fn restore_into(&self, world: &mut World) {
        world.set_name(self.name.clone());
        world.set_tick_count(self.tick);
        world.clock_mut().set_elapsed_seconds(self.elapsed_seconds);
        world.clock_mut().set_day_length_seconds(self.day_length_seconds);

        for record in &self.entities {
            let mut entity = Entity::new(record.id, record.name.clone());
            entity.transform = record.transform;
            entity.active = record.active;
            entity.local_bounds = record.local_bounds;
            world.insert_committed(entity);
        }

        for record in &self.entities {
            let id = record.id;
            if let Some(parent) = record.parent
                && world.set_parent(id, Some(parent)).is_err()
            {
                tracing::warn!(%id, %parent, "dropping dangling parent reference");
            }
            // The setters cannot fail here: every record was just inserted.
            if let Some(light) = record.light {
                let _ = world.set_light(id, light);
            }
            if let Some(camera) = record.camera {
                let _ = world.set_camera(id, camera);
            }
            if let Some(material) = &record.material {
                let _ = world.set_material(id, material.clone());
            }
            if let Some(source) = &record.audio_source {
                let _ = world.set_audio_source(id, source.clone());
            }
        }

        world.refresh_derived_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn sample_world() -> World {
        let mut world = World::with_name("sample");
        let root = world.create_entity_named("root");
        let child = world.create_entity_named("child");
        world.set_parent(child, Some(root)).unwrap();
        world
            .set_light(child, Light::directional(Vec3::ONE, 2.0))
            .unwrap();
        world.set_material(root, Material::default()).unwrap();
        world
            .set_audio_source(root, AudioSource::new("amb.ogg"))
            .unwrap();
        world.tick(0.25);
        world.tick(0.25);
        world
    }

    #[test]
    fn capture_restore_roundtrip() {
        let world = sample_world();
        let snap = WorldSnapshot::capture(&world);
        assert_eq!(snap.entities.len(), 2);
        assert_eq!(snap.tick, 2);

        let restored = snap.restore();
        assert_eq!(restored.name(), "sample");
        assert_eq!(restored.entity_count(), world.entity_count());
        assert_eq!(restored.tick_count(), world.tick_count());
        assert_eq!(
            restored.clock().elapsed_seconds(),
            world.clock().elapsed_seconds()
        );

        // Same ids, same hierarchy, same components.
        for (id, entity) in world.entities() {
            let r = restored.get_entity(*id).expect("entity survives");
            assert_eq!(r.name, entity.name);
            assert_eq!(r.parent(), entity.parent());
            assert_eq!(restored.light(*id), world.light(*id));
            assert_eq!(restored.material(*id), world.material(*id));
        }
        assert_eq!(restored.light_count(), world.light_count());
        assert_eq!(restored.directional_light(), world.directional_light());
        assert_eq!(restored.audio_source_count(), world.audio_source_count());
    }

    #[test]
    fn restore_preserves_id_watermark() {
        let world = sample_world();
        let max_id = world.entities().keys().max().copied().unwrap();

        let mut restored = WorldSnapshot::capture(&world).restore();
        let fresh = restored.create_entity();
        assert!(fresh > max_id);
    }

    #[test]
    fn pending_entities_are_not_captured() {
        let mut world = sample_world();
        world.create_entity_named("uncommitted");
        let snap = WorldSnapshot::capture(&world);
        assert_eq!(snap.entities.len(), 2);
    }

    #[test]
    fn restore_wires_children_regardless_of_record_order() {
        let world = sample_world();
        let mut snap = WorldSnapshot::capture(&world);
        snap.entities.reverse();

        let restored = snap.restore();
        let root = restored
            .entities()
            .values()
            .find(|e| e.name == "root")
            .unwrap();
        assert_eq!(root.children().len(), 1);
    }
}
