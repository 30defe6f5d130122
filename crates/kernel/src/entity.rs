use serde::{Deserialize, Serialize};
use worldkit_common::{BoundingBox, EntityId, Transform};

/// An addressable node in the world graph.
///
/// Entities are owned exclusively by the world registry; the parent/children
/// relation is kept as plain ids resolved through the registry, never as
/// owning references. The world maintains both sides of the relation through
/// `World::set_parent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    pub name: String,
    /// Local to the parent entity (world space for roots).
    pub transform: Transform,
    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Vec<EntityId>,
    pub active: bool,
    /// Local-space bounds, folded into the world bounding box each tick.
    pub local_bounds: BoundingBox,
}

impl Entity {
    /// Construct an entity with an explicit id. Regular creation goes through
    /// `World::create_entity`; this is for the persistence restore path.
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            transform: Transform::default(),
            parent: None,
            children: Vec::new(),
            active: true,
            local_bounds: BoundingBox::UNIT,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
