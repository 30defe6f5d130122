//! Shared types for the worldkit scene manager.
//!
//! # Invariants
//! - `EntityId` values are allocated by the world and never reused within a
//!   process lifetime.
//! - `BoundingBox` starts empty and only grows through `merge`/`merge_point`.

mod bounds;
mod types;

pub use bounds::BoundingBox;
pub use types::{EntityId, Transform};
