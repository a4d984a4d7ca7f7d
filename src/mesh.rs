use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Quat, Vec2, Vec3};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Flat ground plane, built in the XY plane and rotated to lie in XZ facing +Y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneGeometry {
    pub width: f32,
    pub depth: f32,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl PlaneGeometry {
    pub fn new(width: f32, depth: f32) -> Self {
        let half = Vec2::new(width, depth) / 2.0;
        let positions = vec![
            Vec3::new(-half.x, half.y, 0.0),
            Vec3::new(half.x, half.y, 0.0),
            Vec3::new(-half.x, -half.y, 0.0),
            Vec3::new(half.x, -half.y, 0.0),
        ];
        let mut geometry = Self {
            width,
            depth,
            positions,
            normals: vec![Vec3::Z; 4],
            indices: vec![0, 2, 1, 2, 3, 1],
        };
        geometry.rotate_x(-FRAC_PI_2);
        geometry
    }

    pub fn from_dimensions(dimensions: Vec2) -> Self {
        Self::new(dimensions.x, dimensions.y)
    }

    pub fn rotate_x(&mut self, angle: f32) {
        let rotation = Quat::from_rotation_x(angle);
        for position in &mut self.positions {
            *position = rotation * *position;
        }
        for normal in &mut self.normals {
            *normal = (rotation * *normal).normalize_or_zero();
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.depth)
    }
}

/// Transparent material that only renders received shadows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowMaterial {
    pub opacity: f32,
    pub transparent: bool,
}

impl ShadowMaterial {
    pub fn new(opacity: f32) -> Self {
        Self {
            opacity,
            transparent: true,
        }
    }
}

/// Material handle shared between a plane component and the mesh it built.
pub type SharedMaterial = Arc<RwLock<ShadowMaterial>>;

#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: PlaneGeometry,
    pub material: SharedMaterial,
    pub receive_shadow: bool,
    pub cast_shadow: bool,
}

impl Mesh {
    pub fn new(geometry: PlaneGeometry, material: SharedMaterial) -> Self {
        Self {
            geometry,
            material,
            receive_shadow: false,
            cast_shadow: false,
        }
    }

    pub fn opacity(&self) -> f32 {
        self.material.read().opacity
    }
}

impl PartialEq for Mesh {
    fn eq(&self, other: &Self) -> bool {
        self.geometry == other.geometry
            && *self.material.read() == *other.material.read()
            && self.receive_shadow == other.receive_shadow
            && self.cast_shadow == other.cast_shadow
    }
}
