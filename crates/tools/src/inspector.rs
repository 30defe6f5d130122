use serde::Serialize;
use worldkit_common::EntityId;
use worldkit_kernel::{Entity, World};

/// World inspector for developer tooling.
///
/// Provides read-only queries against the world state for debugging and
/// the CLI's `inspect` command.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a summary of the world state.
    pub fn summary(world: &World) -> WorldSummary {
        WorldSummary {
            name: world.name().to_string(),
            tick: world.tick_count(),
            entity_count: world.entity_count(),
            light_count: world.light_count(),
            audio_source_count: world.audio_source_count(),
            has_camera: world.active_camera().is_some(),
            has_directional_light: world.directional_light().is_some(),
            time_of_day: world.time_of_day(false),
        }
    }

    /// Detailed info for a single entity, or `None` when the id is unknown.
    pub fn inspect_entity(world: &World, id: EntityId) -> Option<EntityInfo> {
        world.get_entity(id).map(|entity| {
            let p = entity.transform.position;
            let mut components = Vec::new();
            if world.light(id).is_some() {
                components.push("light");
            }
            if world.camera(id).is_some() {
                components.push("camera");
            }
            if world.material(id).is_some() {
                components.push("material");
            }
            if world.audio_source(id).is_some() {
                components.push("audio_source");
            }
            EntityInfo {
                id: id.raw(),
                name: entity.name.clone(),
                position: [p.x, p.y, p.z],
                active: entity.active,
                parent: entity.parent().map(EntityId::raw),
                child_count: entity.children().len(),
                components,
            }
        })
    }

    /// Indented hierarchy dump, roots in creation order.
    pub fn hierarchy(world: &World) -> String {
        let mut out = String::new();
        for root in world.root_entities() {
            Self::hierarchy_node(world, root, 0, &mut out);
        }
        out
    }

    fn hierarchy_node(world: &World, entity: &Entity, depth: usize, out: &mut String) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(&format!("{} {}\n", entity.id(), entity.name));
        for child in entity.children() {
            if let Some(child_entity) = world.get_entity(*child) {
                Self::hierarchy_node(world, child_entity, depth + 1, out);
            }
        }
    }
}

/// Summary of world state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct WorldSummary {
    pub name: String,
    pub tick: u64,
    pub entity_count: usize,
    pub light_count: usize,
    pub audio_source_count: usize,
    pub has_camera: bool,
    pub has_directional_light: bool,
    pub time_of_day: f32,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World '{}': tick={} entities={} lights={} audio={} camera={} time_of_day={:.3}",
            self.name,
            self.tick,
            self.entity_count,
            self.light_count,
            self.audio_source_count,
            if self.has_camera { "yes" } else { "no" },
            self.time_of_day,
        )
    }
}

/// Detailed info about a single entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntityInfo {
    pub id: u64,
    pub name: String,
    pub position: [f32; 3],
    pub active: bool,
    pub parent: Option<u64>,
    pub child_count: usize,
    pub components: Vec<&'static str>,
}

impl std::fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Entity #{} '{}' pos=({:.2}, {:.2}, {:.2}) children={} components=[{}]",
            self.id,
            self.name,
            self.position[0],
            self.position[1],
            self.position[2],
            self.child_count,
            self.components.join(", "),
        )
    }
}
