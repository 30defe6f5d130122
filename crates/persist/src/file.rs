use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use std::path::Path;

use worldkit_kernel::World;

use crate::snapshot::WorldSnapshot;

const SCENE_MAGIC: [u8; 4] = *b"WKSC";
const SCENE_FORMAT_VERSION: u32 = 1;

/// Errors from scene file operations.
#[derive(Debug, thiserror::Error)]
pub enum SceneFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CBOR serialization error: {0}")]
    Encode(String),
    #[error("CBOR deserialization error: {0}")]
    Decode(String),
    #[error("not a worldkit scene file")]
    BadMagic,
    #[error("unsupported scene format: file has v{found}, supported v{supported}")]
    SchemaMismatch { found: u32, supported: u32 },
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },
}

/// On-disk container. The payload is the zstd-compressed CBOR snapshot;
/// the checksum covers the compressed payload bytes.
#[derive(Serialize, Deserialize)]
struct SceneEnvelope {
    magic: [u8; 4],
    version: u32,
    sha256: String,
    payload: Vec<u8>,
}

/// Serialize the world graph to `path`.
///
/// The world's name is derived from the file stem and its backing path is
/// recorded. Bytes go to a `.tmp` sibling first and are renamed over the
/// target, so a failed save never destroys an existing valid file.
pub fn save_world(world: &mut World, path: impl AsRef<Path>) -> Result<(), SceneFileError> {
    let path = path.as_ref();
    let _span = tracing::info_span!("scene_save", path = %path.display()).entered();

    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
        world.set_name(stem.to_string());
    }
    world.set_file_path(Some(path.to_path_buf()));

    let snapshot = WorldSnapshot::capture(world);
    let payload = zstd_compress(&cbor_encode(&snapshot)?)?;
    let envelope = SceneEnvelope {
        magic: SCENE_MAGIC,
        version: SCENE_FORMAT_VERSION,
        sha256: sha256_hex(&payload),
        payload,
    };
    let bytes = cbor_encode(&envelope)?;

    let tmp = path.with_extension("scene.tmp");
    std::fs::write(&tmp, &bytes)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }

    tracing::info!(
        entities = snapshot.entities.len(),
        bytes = bytes.len(),
        "scene saved"
    );
    Ok(())
}

/// Load a scene file into `world`.
///
/// The world is cleared first; on any failure (missing file, foreign
/// format, unsupported version, checksum mismatch, decode error) it stays
/// empty rather than partially loaded. The id watermark is preserved across
/// the clear, so reloading never reissues old ids.
pub fn load_into(world: &mut World, path: impl AsRef<Path>) -> Result<(), SceneFileError> {
    let path = path.as_ref();
    let _span = tracing::info_span!("scene_load", path = %path.display()).entered();

    world.clear();
    let snapshot = read_snapshot(path)?;
    snapshot.restore_into(world);
    world.set_file_path(Some(path.to_path_buf()));

    tracing::info!(entities = world.entity_count(), "scene loaded");
    Ok(())
}

/// Load a scene file into a fresh world.
pub fn load_world(path: impl AsRef<Path>) -> Result<World, SceneFileError> {
    let mut world = World::new();
    load_into(&mut world, path)?;
    Ok(world)
}

fn read_snapshot(path: &Path) -> Result<WorldSnapshot, SceneFileError> {
    let bytes = std::fs::read(path)?;
    let envelope: SceneEnvelope = cbor_decode(&bytes)?;

    if envelope.magic != SCENE_MAGIC {
        return Err(SceneFileError::BadMagic);
    }
    if envelope.version != SCENE_FORMAT_VERSION {
        return Err(SceneFileError::SchemaMismatch {
            found: envelope.version,
            supported: SCENE_FORMAT_VERSION,
        });
    }
    let actual = sha256_hex(&envelope.payload);
    if actual != envelope.sha256 {
        return Err(SceneFileError::IntegrityMismatch {
            expected: envelope.sha256,
            actual,
        });
    }

    cbor_decode(&zstd_decompress(&envelope.payload)?)
}

fn cbor_encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, SceneFileError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| SceneFileError::Encode(e.to_string()))?;
    Ok(buf)
}

fn cbor_decode<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, SceneFileError> {
    ciborium::from_reader(data).map_err(|e| SceneFileError::Decode(e.to_string()))
}

fn zstd_compress(data: &[u8]) -> Result<Vec<u8>, SceneFileError> {
    let mut encoder = zstd::Encoder::new(Vec::new(), 3)?;
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn zstd_decompress(data: &[u8]) -> Result<Vec<u8>, SceneFileError> {
    let mut decoder = zstd::Decoder::new(data)?;
    let mut buf = Vec::new();
    decoder.read_to_end(&mut buf)?;
    Ok(buf)
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
