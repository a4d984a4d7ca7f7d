use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::light::{LightTarget, ShadowLight};
use crate::mesh::Mesh;
use crate::scene::{ObjectId, Scene};

/// Shared handle to a scene, passed to every component attached to it.
#[derive(Debug, Default)]
pub struct SceneHandle {
    scene: Arc<RwLock<Scene>>,
}

impl Clone for SceneHandle {
    fn clone(&self) -> Self {
        Self {
            scene: Arc::clone(&self.scene),
        }
    }
}

impl SceneHandle {
    /// Creates a handle to an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the scene for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, Scene> {
        self.scene.read()
    }

    /// Locks the scene for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, Scene> {
        self.scene.write()
    }

    /// Applies a mutation to the scene.
    pub fn update<F, R>(&self, updater: F) -> R
    where
        F: FnOnce(&mut Scene) -> R,
    {
        updater(&mut self.scene.write())
    }

    /// Returns a clone of the light stored under `id`.
    pub fn light(&self, id: ObjectId) -> Option<ShadowLight> {
        self.scene.read().light(id).cloned()
    }

    /// Returns a copy of the light target stored under `id`.
    pub fn target(&self, id: ObjectId) -> Option<LightTarget> {
        self.scene.read().target(id).copied()
    }

    /// Returns a clone of the mesh stored under `id`.
    pub fn mesh(&self, id: ObjectId) -> Option<Mesh> {
        self.scene.read().mesh(id).cloned()
    }

    /// Whether the scene's renderer has shadow mapping on.
    pub fn shadow_map_enabled(&self) -> bool {
        self.scene.read().renderer().shadow_map_enabled()
    }

    /// Turns on shadow mapping for the scene's renderer.
    pub fn enable_shadow_map(&self) -> bool {
        self.scene.write().renderer_mut().enable_shadow_map()
    }
}
