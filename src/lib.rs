//! Declarative shadow components for a 3D/AR scene runtime.
//!
//! A `shadow-light` keeps a directional or spot light, its target and an
//! optional frustum helper in sync with an attribute snapshot; a
//! `shadow-plane` does the same for a shadow-receiving ground mesh. Both patch
//! their scene object in place and only rebuild it when a structural
//! attribute changes. Drawing is left to the host engine so that the crate
//! stays testable headless.

pub mod app;
pub mod ar;
pub mod components;
pub mod document;
pub mod handle;
pub mod light;
pub mod mesh;
pub mod primitives;
pub mod render;
pub mod scene;
pub mod schema;

pub use app::{AttachedComponent, Entity, Runtime, RuntimeOptions};
pub use ar::{ActivatorOptions, ArSession, ArSystem, ReadySignal, ShadowMapActivator};
pub use components::{
    LightConfig, LightField, PlaneConfig, PlaneField, Reconciler, ShadowLightComponent,
    ShadowPlaneComponent, UpdatePolicy,
};
pub use document::{ElementDecl, SceneDocument};
pub use handle::SceneHandle;
pub use light::{CameraHelper, LightKind, LightShadow, LightTarget, ShadowCamera, ShadowLight};
pub use mesh::{Mesh, PlaneGeometry, ShadowMaterial, SharedMaterial};
pub use render::{Renderer, ShadowMapSettings};
pub use scene::{Attachment, ObjectId, Scene, SceneObject};
pub use schema::SchemaError;
