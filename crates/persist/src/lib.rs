//! Whole-graph scene persistence.
//!
//! A scene file is a single self-describing artifact: a CBOR envelope
//! carrying a magic tag, a format version, a SHA-256 checksum, and the
//! zstd-compressed CBOR snapshot of the world graph.
//!
//! # Invariants
//! - A failed save never clobbers an existing valid file (temp write plus
//!   atomic rename).
//! - A failed load leaves the target world empty, never partially loaded.
//! - Version and checksum mismatches are fail-closed.

mod file;
mod snapshot;

pub use file::{SceneFileError, load_into, load_world, save_world};
pub use snapshot::{EntityRecord, WorldSnapshot};
