use glam::Vec3;
use serde::{Deserialize, Serialize};

/// The kind of light a `Light` component emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightKind {
    /// Parallel rays, direction taken from the owning entity's rotation.
    Directional,
    /// Radiates in all directions from the owning entity's position.
    Point,
    /// Cone of light along the owning entity's forward axis.
    Spot,
}

/// Light component. Position and orientation come from the owning entity's
/// transform; this holds only the photometric data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub kind: LightKind,
    /// RGB in [0,1].
    pub color: Vec3,
    pub intensity: f32,
    /// Falloff distance for point/spot lights; unused for directional.
    pub range: f32,
    pub cast_shadows: bool,
}

impl Light {
    pub fn directional(color: Vec3, intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional,
            color,
            intensity,
            range: 0.0,
            cast_shadows: true,
        }
    }

    pub fn point(color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            kind: LightKind::Point,
            color,
            intensity,
            range,
            cast_shadows: false,
        }
    }

    pub fn spot(color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            kind: LightKind::Spot,
            color,
            intensity,
            range,
            cast_shadows: false,
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::point(Vec3::ONE, 1.0, 10.0)
    }
}

/// Camera projection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    Perspective,
    Orthographic,
}

/// Camera component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub projection: Projection,
    /// Vertical field of view in degrees (perspective only).
    pub fov_degrees: f32,
    pub near_clip: f32,
    pub far_clip: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: Projection::Perspective,
            fov_degrees: 60.0,
            near_clip: 0.1,
            far_clip: 1000.0,
        }
    }
}

/// Surface material component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub base_color: [f32; 4],
    pub roughness: f32,
    pub metallic: f32,
    pub emissive: Vec3,
    /// Albedo texture path, resolved by the asset layer.
    pub texture: Option<String>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: [0.8, 0.8, 0.8, 1.0],
            roughness: 0.5,
            metallic: 0.0,
            emissive: Vec3::ZERO,
            texture: None,
        }
    }
}

/// Audio source component. Playback is driven by the audio system; this is
/// the authoring-side data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSource {
    /// Clip path, resolved by the asset layer.
    pub clip: String,
    pub volume: f32,
    pub looping: bool,
    pub play_on_load: bool,
}

impl AudioSource {
    pub fn new(clip: impl Into<String>) -> Self {
        Self {
            clip: clip.into(),
            volume: 1.0,
            looping: false,
            play_on_load: false,
        }
    }
}
