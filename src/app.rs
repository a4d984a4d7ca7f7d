use anyhow::{anyhow, Context, Result};
use log::info;

use crate::components::shadow_light::{self, LightConfig, ShadowLightComponent, UpdatePolicy};
use crate::components::shadow_plane::{self, PlaneConfig, ShadowPlaneComponent};
use crate::components::Reconciler;
use crate::document::{ElementDecl, SceneDocument};
use crate::handle::SceneHandle;
use crate::primitives;
use crate::scene::SceneObject;

/// A component attached to an entity together with its current snapshot.
#[derive(Debug)]
pub enum AttachedComponent {
    Light {
        component: ShadowLightComponent,
        config: LightConfig,
    },
    Plane {
        component: ShadowPlaneComponent,
        config: PlaneConfig,
    },
}

impl AttachedComponent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Light { .. } => shadow_light::COMPONENT_NAME,
            Self::Plane { .. } => shadow_plane::COMPONENT_NAME,
        }
    }

    fn set_attribute(&mut self, field: &str, value: &str) -> Result<()> {
        match self {
            Self::Light { component, config } => {
                let next = config.with_attribute(field, value)?;
                component.update(config, &next);
                *config = next;
            }
            Self::Plane { component, config } => {
                let next = config.with_attribute(field, value)?;
                component.update(config, &next);
                *config = next;
            }
        }
        Ok(())
    }

    fn remove(&mut self) {
        match self {
            Self::Light { component, .. } => component.remove(),
            Self::Plane { component, .. } => component.remove(),
        }
    }
}

/// Scene element hosting shadow components.
#[derive(Debug)]
pub struct Entity {
    pub id: String,
    pub tag: String,
    pub components: Vec<AttachedComponent>,
}

impl Entity {
    pub fn component(&self, name: &str) -> Option<&AttachedComponent> {
        self.components.iter().find(|component| component.name() == name)
    }

    fn component_mut(&mut self, name: &str) -> Option<&mut AttachedComponent> {
        self.components
            .iter_mut()
            .find(|component| component.name() == name)
    }

    /// Resolves a tag attribute to `(component, field)`.
    ///
    /// Accepts a primitive attribute (`intensity` on `a-shadow-light`), an
    /// explicit `component.field` path, or a bare field when the entity has
    /// a single component.
    fn resolve(&self, attribute: &str) -> Option<(&'static str, String)> {
        if let Some((component, field)) = attribute.split_once('.') {
            let name = self.component(component)?.name();
            return Some((name, field.to_string()));
        }
        if let Some(primitive) = primitives::primitive(&self.tag) {
            if let Some(field) = primitive.field_for(attribute) {
                return Some((primitive.component, field.to_string()));
            }
        }
        match self.components.as_slice() {
            [only] => Some((only.name(), attribute.to_string())),
            _ => None,
        }
    }
}

enum PendingConfig {
    Light(LightConfig),
    Plane(PlaneConfig),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeOptions {
    pub light_policy: UpdatePolicy,
}

/// Hosts the entities of one scene and drives their component lifecycles.
#[derive(Debug)]
pub struct Runtime {
    scene: SceneHandle,
    options: RuntimeOptions,
    entities: Vec<Entity>,
}

impl Runtime {
    pub fn new(scene: SceneHandle, options: RuntimeOptions) -> Self {
        Self {
            scene,
            options,
            entities: Vec::new(),
        }
    }

    /// Builds a runtime and attaches every element of `document`.
    pub fn from_document(document: &SceneDocument, options: RuntimeOptions) -> Result<Self> {
        let mut runtime = Self::new(SceneHandle::new(), options);
        for element in &document.elements {
            runtime
                .attach(element)
                .with_context(|| format!("failed to attach `{}`", element.id))?;
        }
        Ok(runtime)
    }

    pub fn scene(&self) -> &SceneHandle {
        &self.scene
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    /// Parses the element's attributes and initializes its components.
    ///
    /// Every component config is parsed before any of them is initialized,
    /// so a bad attribute leaves the scene untouched.
    pub fn attach(&mut self, element: &ElementDecl) -> Result<()> {
        if self.entity(&element.id).is_some() {
            return Err(anyhow!("entity `{}` is already attached", element.id));
        }
        let mut configs = Vec::new();
        for (name, attributes) in &element.components {
            let pairs = attributes
                .iter()
                .map(|(field, value)| (field.as_str(), value.as_str()));
            let config = match name.as_str() {
                shadow_light::COMPONENT_NAME => {
                    PendingConfig::Light(LightConfig::from_attributes(pairs)?)
                }
                shadow_plane::COMPONENT_NAME => {
                    PendingConfig::Plane(PlaneConfig::from_attributes(pairs)?)
                }
                other => return Err(anyhow!("unknown component `{other}`")),
            };
            configs.push(config);
        }

        let components: Vec<AttachedComponent> = configs
            .into_iter()
            .map(|config| match config {
                PendingConfig::Light(config) => {
                    let mut component = ShadowLightComponent::new(self.scene.clone(), &element.id)
                        .with_policy(self.options.light_policy);
                    component.initialize(&config);
                    AttachedComponent::Light { component, config }
                }
                PendingConfig::Plane(config) => {
                    let mut component = ShadowPlaneComponent::new(self.scene.clone(), &element.id);
                    component.initialize(&config);
                    AttachedComponent::Plane { component, config }
                }
            })
            .collect();
        info!(
            "attached `{}` with {} component(s)",
            element.id,
            components.len()
        );
        self.entities.push(Entity {
            id: element.id.clone(),
            tag: element.tag.clone(),
            components,
        });
        Ok(())
    }

    /// Changes one attribute of an entity and reconciles the affected
    /// component.
    pub fn set_attribute(&mut self, entity_id: &str, attribute: &str, value: &str) -> Result<()> {
        let entity = self
            .entities
            .iter_mut()
            .find(|entity| entity.id == entity_id)
            .ok_or_else(|| anyhow!("no entity named `{entity_id}`"))?;
        let (component, field) = entity
            .resolve(attribute)
            .ok_or_else(|| anyhow!("`{entity_id}` has no attribute `{attribute}`"))?;
        entity
            .component_mut(component)
            .ok_or_else(|| anyhow!("`{entity_id}` has no `{component}` component"))?
            .set_attribute(&field, value)
            .with_context(|| format!("failed to set {entity_id}.{attribute}"))
    }

    /// Removes an entity and releases every scene object it owned.
    pub fn detach(&mut self, entity_id: &str) -> Result<()> {
        let index = self
            .entities
            .iter()
            .position(|entity| entity.id == entity_id)
            .ok_or_else(|| anyhow!("no entity named `{entity_id}`"))?;
        let mut entity = self.entities.remove(index);
        for component in &mut entity.components {
            component.remove();
        }
        info!("detached `{entity_id}`");
        Ok(())
    }

    /// One line per scene object describing its current state.
    pub fn final_state(&self) -> Vec<String> {
        let scene = self.scene.read();
        let mut lines = vec![format!(
            "shadow map: {}",
            if scene.renderer().shadow_map_enabled() {
                "enabled"
            } else {
                "disabled"
            }
        )];
        for (id, object) in scene.objects() {
            let line = match object {
                SceneObject::Light(light) => format!(
                    "{id} {} light intensity={:.2} color=({:.2}, {:.2}, {:.2}) near={:.2} far={:.2} map={}x{} bias={}",
                    light.kind,
                    light.intensity,
                    light.color.x,
                    light.color.y,
                    light.color.z,
                    light.shadow.camera.near,
                    light.shadow.camera.far,
                    light.shadow.map_size.x,
                    light.shadow.map_size.y,
                    light.shadow.bias
                ),
                SceneObject::Target(target) => format!(
                    "{id} target pos=({:.2}, {:.2}, {:.2})",
                    target.position.x, target.position.y, target.position.z
                ),
                SceneObject::Helper(helper) => format!("{id} helper for {}", helper.light),
                SceneObject::Mesh(mesh) => format!(
                    "{id} plane {}x{} opacity={:.2}",
                    mesh.geometry.width,
                    mesh.geometry.depth,
                    mesh.opacity()
                ),
            };
            lines.push(line);
        }
        lines
    }
}

pub fn print_final_state(runtime: &Runtime) {
    println!("Final scene state:");
    for line in runtime.final_state() {
        println!(" - {line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::LightKind;

    const SCENE: &str = r#"
    <a-scene>
        <a-shadow-light id="sun" intensity="0.5" helper="true"/>
        <a-shadow-plane id="ground" dimensions="10 10" opacity="0.2"/>
    </a-scene>
    "#;

    fn runtime() -> Runtime {
        let document = SceneDocument::from_xml(SCENE).unwrap();
        Runtime::from_document(&document, RuntimeOptions::default()).unwrap()
    }

    fn light_component(runtime: &Runtime) -> &ShadowLightComponent {
        match runtime.entity("sun").unwrap().component("shadow-light") {
            Some(AttachedComponent::Light { component, .. }) => component,
            other => panic!("unexpected component {other:?}"),
        }
    }

    #[test]
    fn document_elements_are_attached() {
        let runtime = runtime();
        let scene = runtime.scene().read();
        assert_eq!(scene.count("light"), 1);
        assert_eq!(scene.count("target"), 1);
        assert_eq!(scene.count("helper"), 1);
        assert_eq!(scene.count("mesh"), 1);
        assert!(scene.renderer().shadow_map_enabled());
    }

    #[test]
    fn primitive_attribute_updates_reach_the_light() {
        let mut runtime = runtime();
        runtime.set_attribute("sun", "intensity", "0.9").unwrap();
        let light = runtime
            .scene()
            .light(light_component(&runtime).light_id().unwrap())
            .unwrap();
        assert_eq!(light.intensity, 0.9);
        assert_eq!(light.kind, LightKind::Directional);
    }

    #[test]
    fn type_change_through_runtime_rebuilds() {
        let mut runtime = runtime();
        let before = light_component(&runtime).light_id();
        runtime.set_attribute("sun", "shadow-light.type", "spot").unwrap();
        let after = light_component(&runtime).light_id();
        assert_ne!(before, after);
        let light = runtime.scene().light(after.unwrap()).unwrap();
        assert_eq!(light.kind, LightKind::Spot);
        assert_eq!(runtime.scene().read().count("helper"), 1);
    }

    #[test]
    fn bad_updates_are_reported() {
        let mut runtime = runtime();
        assert!(runtime.set_attribute("moon", "intensity", "1").is_err());
        assert!(runtime.set_attribute("sun", "decay", "1").is_err());
        assert!(runtime.set_attribute("ground", "opacity", "lots").is_err());
        assert!(runtime.set_attribute("ground", "shadow-light.intensity", "1").is_err());
    }

    #[test]
    fn failed_attach_leaves_scene_untouched() {
        let document = SceneDocument::from_xml(
            r#"<a-scene><a-entity id="x" shadow-light="intensity: 0.5" shadow-plane="opacity: lots"/></a-scene>"#,
        )
        .unwrap();
        let mut runtime = Runtime::new(SceneHandle::new(), RuntimeOptions::default());
        assert!(runtime.attach(&document.elements[0]).is_err());
        assert!(runtime.entities().is_empty());
        assert!(runtime.scene().read().is_empty());
    }

    #[test]
    fn detach_releases_everything() {
        let mut runtime = runtime();
        runtime.detach("sun").unwrap();
        runtime.detach("ground").unwrap();
        assert!(runtime.scene().read().is_empty());
        assert!(runtime.entities().is_empty());
        assert!(runtime.detach("sun").is_err());
    }

    #[test]
    fn final_state_describes_objects() {
        let mut runtime = runtime();
        runtime.set_attribute("ground", "opacity", "0.5").unwrap();
        let lines = runtime.final_state();
        assert_eq!(lines[0], "shadow map: enabled");
        assert!(lines.iter().any(|line| line.ends_with("plane 10x10 opacity=0.50")));
        assert!(lines.iter().any(|line| line.contains("directional light intensity=0.50")));
    }

    #[test]
    fn legacy_policy_builds_once() {
        let document = SceneDocument::from_xml(SCENE).unwrap();
        let options = RuntimeOptions {
            light_policy: UpdatePolicy::BuildOnce,
        };
        let mut runtime = Runtime::from_document(&document, options).unwrap();
        runtime.set_attribute("sun", "intensity", "0.9").unwrap();
        let light = runtime
            .scene()
            .light(light_component(&runtime).light_id().unwrap())
            .unwrap();
        assert_eq!(light.intensity, 0.5);
    }
}
