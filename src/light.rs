use std::fmt;

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::scene::ObjectId;

/// Light classes a shadow light can be built as. The two are not
/// interchangeable in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    #[default]
    Directional,
    Spot,
}

impl LightKind {
    pub const NAMES: &'static [&'static str] = &["directional", "spot"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "directional" => Some(Self::Directional),
            "spot" => Some(Self::Spot),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Directional => "directional",
            Self::Spot => "spot",
        }
    }
}

impl fmt::Display for LightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Orthographic frustum used to render the shadow depth map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowCamera {
    pub near: f32,
    pub far: f32,
    pub top: f32,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Default for ShadowCamera {
    fn default() -> Self {
        Self {
            near: 0.5,
            far: 500.0,
            top: 5.0,
            left: -5.0,
            right: 5.0,
            bottom: -5.0,
        }
    }
}

impl ShadowCamera {
    /// Assigns the frustum edges from a `(top, left, right, bottom)` vector.
    pub fn set_tlrb(&mut self, tlrb: Vec4) {
        self.top = tlrb.x;
        self.left = tlrb.y;
        self.right = tlrb.z;
        self.bottom = tlrb.w;
    }

    /// Frustum edges packed as `(top, left, right, bottom)`.
    pub fn tlrb(&self) -> Vec4 {
        Vec4::new(self.top, self.left, self.right, self.bottom)
    }
}

/// Shadow state of a light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightShadow {
    pub camera: ShadowCamera,
    pub map_size: Vec2,
    pub bias: f32,
}

impl Default for LightShadow {
    fn default() -> Self {
        Self {
            camera: ShadowCamera::default(),
            map_size: Vec2::splat(512.0),
            bias: 0.0,
        }
    }
}

/// Shadow-casting light living in the scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowLight {
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
    /// Cone half-angle in radians; only read for spot lights.
    pub angle: f32,
    /// Scene object the light points at.
    pub target: ObjectId,
    pub cast_shadow: bool,
    pub shadow: LightShadow,
}

impl ShadowLight {
    pub fn new(kind: LightKind, color: Vec3, intensity: f32, target: ObjectId) -> Self {
        Self {
            kind,
            color,
            intensity,
            angle: std::f32::consts::FRAC_PI_3,
            target,
            cast_shadow: false,
            shadow: LightShadow::default(),
        }
    }
}

/// Object a light is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LightTarget {
    pub position: Vec3,
}

impl LightTarget {
    pub fn at(position: Vec3) -> Self {
        Self { position }
    }

    pub fn set(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
    }
}

/// Debug visualization of a light's shadow camera frustum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraHelper {
    /// Light whose shadow camera is drawn.
    pub light: ObjectId,
}

impl CameraHelper {
    pub fn new(light: ObjectId) -> Self {
        Self { light }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tlrb_is_assigned_in_order() {
        let mut camera = ShadowCamera::default();
        camera.set_tlrb(Vec4::new(8.0, -6.0, 7.0, -9.0));
        assert_eq!(camera.top, 8.0);
        assert_eq!(camera.left, -6.0);
        assert_eq!(camera.right, 7.0);
        assert_eq!(camera.bottom, -9.0);
        assert_eq!(camera.tlrb(), Vec4::new(8.0, -6.0, 7.0, -9.0));
    }

    #[test]
    fn kind_names_round_trip() {
        for name in LightKind::NAMES {
            assert_eq!(LightKind::from_name(name).unwrap().name(), *name);
        }
        assert!(LightKind::from_name("point").is_none());
    }
}
