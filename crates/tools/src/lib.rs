//! Read-only inspection tooling for worldkit scenes.
//!
//! Everything here is a pure query over a `World`; nothing mutates.

mod inspector;

pub use inspector::{EntityInfo, WorldInspector, WorldSummary};
