use std::sync::Arc;

use glam::Vec2;
use log::{debug, info};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::Reconciler;
use crate::handle::SceneHandle;
use crate::mesh::{Mesh, PlaneGeometry, ShadowMaterial, SharedMaterial};
use crate::scene::{ObjectId, Scene};
use crate::schema::{parse_bounded_float, parse_vec2, SchemaError, SchemaResult};

pub const COMPONENT_NAME: &str = "shadow-plane";

/// Attribute snapshot of a `shadow-plane` component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneConfig {
    /// Width and depth of the plane.
    pub dimensions: Vec2,
    /// Shadow darkness, clamped to `0..=1`.
    pub opacity: f32,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self {
            dimensions: Vec2::new(10.0, 10.0),
            opacity: 0.2,
        }
    }
}

impl PlaneConfig {
    /// Builds a snapshot from defaults plus the given `(name, value)` pairs.
    pub fn from_attributes<'a, I>(attributes: I) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        attributes
            .into_iter()
            .try_fold(Self::default(), |config, (name, value)| {
                config.with_attribute(name, value)
            })
    }

    /// Returns a copy with one attribute parsed and applied.
    pub fn with_attribute(&self, name: &str, value: &str) -> SchemaResult<Self> {
        let mut next = self.clone();
        match PlaneField::from_name(name) {
            Some(PlaneField::Dimensions) => next.dimensions = parse_vec2(name, value)?,
            Some(PlaneField::Opacity) => {
                next.opacity = parse_bounded_float(name, value, Some(0.0), Some(1.0))?
            }
            None => {
                return Err(SchemaError::UnknownAttribute {
                    component: COMPONENT_NAME.to_string(),
                    attribute: name.to_string(),
                })
            }
        }
        Ok(next)
    }

    /// Fields whose values differ between `self` and `new`.
    pub fn changed_fields(&self, new: &Self) -> Vec<PlaneField> {
        PlaneField::ALL
            .into_iter()
            .filter(|field| field.differs(self, new))
            .collect()
    }
}

/// One attribute of a `shadow-plane`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneField {
    Dimensions,
    Opacity,
}

impl PlaneField {
    pub const ALL: [PlaneField; 2] = [PlaneField::Dimensions, PlaneField::Opacity];

    /// Attribute name as written in markup.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dimensions => "dimensions",
            Self::Opacity => "opacity",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    /// Structural fields force the mesh to be rebuilt.
    pub fn is_structural(self) -> bool {
        matches!(self, Self::Dimensions)
    }

    pub fn differs(self, old: &PlaneConfig, new: &PlaneConfig) -> bool {
        match self {
            Self::Dimensions => old.dimensions != new.dimensions,
            Self::Opacity => old.opacity != new.opacity,
        }
    }
}

/// Keeps one shadow-receiving ground mesh in sync with a [`PlaneConfig`].
///
/// The material outlives mesh rebuilds; only the geometry is replaced when
/// the dimensions change.
#[derive(Debug)]
pub struct ShadowPlaneComponent {
    scene: SceneHandle,
    element: String,
    material: Option<SharedMaterial>,
    mesh: Option<ObjectId>,
}

impl ShadowPlaneComponent {
    pub const SLOT: &'static str = "mesh";

    pub fn new(scene: SceneHandle, element: impl Into<String>) -> Self {
        Self {
            scene,
            element: element.into(),
            material: None,
            mesh: None,
        }
    }

    /// Id of the live mesh, if any.
    pub fn mesh_id(&self) -> Option<ObjectId> {
        self.mesh
    }

    /// Material shared by every mesh this component has built.
    pub fn material(&self) -> Option<&SharedMaterial> {
        self.material.as_ref()
    }

    fn create_plane(&mut self, scene: &mut Scene, material: &SharedMaterial, dimensions: Vec2) {
        let geometry = PlaneGeometry::from_dimensions(dimensions);
        let mut mesh = Mesh::new(geometry, Arc::clone(material));
        mesh.receive_shadow = true;
        self.mesh = Some(scene.set_object3d(&self.element, Self::SLOT, mesh));
        info!(
            "{}: created {}x{} shadow plane",
            self.element, dimensions.x, dimensions.y
        );
    }

    fn teardown(&mut self, scene: &mut Scene) {
        if let Some(mesh) = self.mesh.take() {
            scene.remove(mesh);
        }
    }
}

impl Reconciler for ShadowPlaneComponent {
    type Config = PlaneConfig;

    fn initialize(&mut self, config: &PlaneConfig) {
        let material = Arc::new(RwLock::new(ShadowMaterial::new(config.opacity)));
        let scene = self.scene.clone();
        let mut scene = scene.write();
        scene.renderer_mut().enable_shadow_map();
        self.teardown(&mut scene);
        self.create_plane(&mut scene, &material, config.dimensions);
        self.material = Some(material);
    }

    fn update(&mut self, old: &PlaneConfig, new: &PlaneConfig) {
        let Some(material) = self.material.clone() else {
            debug!("{}: no material yet, ignoring update", self.element);
            return;
        };
        let rebuild = old
            .changed_fields(new)
            .into_iter()
            .any(PlaneField::is_structural);
        if rebuild && self.mesh.is_some() {
            let scene = self.scene.clone();
            let mut scene = scene.write();
            self.teardown(&mut scene);
            self.create_plane(&mut scene, &material, new.dimensions);
        }
        material.write().opacity = new.opacity;
    }

    fn remove(&mut self) {
        let scene = self.scene.clone();
        let mut scene = scene.write();
        self.teardown(&mut scene);
    }

    fn is_live(&self) -> bool {
        self.mesh.is_some()
    }
}
