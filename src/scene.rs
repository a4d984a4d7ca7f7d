use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::light::{CameraHelper, LightTarget, ShadowLight};
use crate::mesh::Mesh;
use crate::render::Renderer;

/// Identifier of an object attached to a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Wraps a raw id. Ids are normally handed out by [`Scene::add`].
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything that can live in the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneObject {
    Light(ShadowLight),
    Target(LightTarget),
    Helper(CameraHelper),
    Mesh(Mesh),
}

impl SceneObject {
    /// Short kind name used by [`Scene::count`] and logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Light(_) => "light",
            Self::Target(_) => "target",
            Self::Helper(_) => "helper",
            Self::Mesh(_) => "mesh",
        }
    }
}

impl From<ShadowLight> for SceneObject {
    fn from(light: ShadowLight) -> Self {
        Self::Light(light)
    }
}

impl From<LightTarget> for SceneObject {
    fn from(target: LightTarget) -> Self {
        Self::Target(target)
    }
}

impl From<CameraHelper> for SceneObject {
    fn from(helper: CameraHelper) -> Self {
        Self::Helper(helper)
    }
}

impl From<Mesh> for SceneObject {
    fn from(mesh: Mesh) -> Self {
        Self::Mesh(mesh)
    }
}

/// Where an object hangs in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Attachment {
    /// Direct child of the scene root.
    Root,
    /// Named slot of a scene element, e.g. the `light` slot of `sun`.
    Element { element: String, slot: String },
}

#[derive(Debug, Clone, PartialEq)]
struct SceneNode {
    attachment: Attachment,
    object: SceneObject,
}

/// Scene graph container plus the renderer that draws it.
#[derive(Debug, Default)]
pub struct Scene {
    renderer: Renderer,
    next_id: u64,
    nodes: BTreeMap<ObjectId, SceneNode>,
    slots: BTreeMap<(String, String), ObjectId>,
}

impl Scene {
    /// Creates an empty scene with shadow mapping disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer state shared by everything in the scene.
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// Adds an object directly under the scene root.
    pub fn add(&mut self, object: impl Into<SceneObject>) -> ObjectId {
        self.insert(Attachment::Root, object.into())
    }

    /// Detaches any object by id, wherever it is attached.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let node = self.nodes.remove(&id)?;
        if let Attachment::Element { element, slot } = &node.attachment {
            self.slots.remove(&(element.clone(), slot.clone()));
        }
        Some(node.object)
    }

    /// Places `object` in the named slot of `element`, replacing whatever the
    /// slot held before.
    pub fn set_object3d(
        &mut self,
        element: &str,
        slot: &str,
        object: impl Into<SceneObject>,
    ) -> ObjectId {
        self.remove_object3d(element, slot);
        let id = self.insert(
            Attachment::Element {
                element: element.to_string(),
                slot: slot.to_string(),
            },
            object.into(),
        );
        self.slots.insert((element.to_string(), slot.to_string()), id);
        id
    }

    /// Detaches whatever the named slot of `element` holds.
    pub fn remove_object3d(&mut self, element: &str, slot: &str) -> Option<SceneObject> {
        let id = self.object3d(element, slot)?;
        self.remove(id)
    }

    /// Id currently stored in the named slot of `element`.
    pub fn object3d(&self, element: &str, slot: &str) -> Option<ObjectId> {
        self.slots
            .get(&(element.to_string(), slot.to_string()))
            .copied()
    }

    fn insert(&mut self, attachment: Attachment, object: SceneObject) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, SceneNode { attachment, object });
        id
    }

    /// Whether `id` is still attached.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of attached objects.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up an object of any kind.
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.nodes.get(&id).map(|node| &node.object)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.nodes.get_mut(&id).map(|node| &mut node.object)
    }

    /// Where `id` is attached, if it is.
    pub fn attachment(&self, id: ObjectId) -> Option<&Attachment> {
        self.nodes.get(&id).map(|node| &node.attachment)
    }

    /// Iterates objects in attachment order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.nodes.iter().map(|(id, node)| (*id, &node.object))
    }

    /// Returns the light stored under `id`, if that object is a light.
    pub fn light(&self, id: ObjectId) -> Option<&ShadowLight> {
        match self.get(id)? {
            SceneObject::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn light_mut(&mut self, id: ObjectId) -> Option<&mut ShadowLight> {
        match self.get_mut(id)? {
            SceneObject::Light(light) => Some(light),
            _ => None,
        }
    }

    /// Returns the light target stored under `id`.
    pub fn target(&self, id: ObjectId) -> Option<&LightTarget> {
        match self.get(id)? {
            SceneObject::Target(target) => Some(target),
            _ => None,
        }
    }

    pub fn target_mut(&mut self, id: ObjectId) -> Option<&mut LightTarget> {
        match self.get_mut(id)? {
            SceneObject::Target(target) => Some(target),
            _ => None,
        }
    }

    /// Returns the camera helper stored under `id`.
    pub fn helper(&self, id: ObjectId) -> Option<&CameraHelper> {
        match self.get(id)? {
            SceneObject::Helper(helper) => Some(helper),
            _ => None,
        }
    }

    /// Returns the mesh stored under `id`.
    pub fn mesh(&self, id: ObjectId) -> Option<&Mesh> {
        match self.get(id)? {
            SceneObject::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Counts attached objects of one kind (`light`, `target`, `helper`, `mesh`).
    pub fn count(&self, kind: &str) -> usize {
        self.nodes
            .values()
            .filter(|node| node.object.kind_name() == kind)
            .count()
    }
}
