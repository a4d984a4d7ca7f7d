use glam::{Vec2, Vec3, Vec4};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::Reconciler;
use crate::handle::SceneHandle;
use crate::light::{CameraHelper, LightKind, LightTarget, ShadowLight};
use crate::scene::{ObjectId, Scene};
use crate::schema::{
    parse_bool, parse_bounded_float, parse_color, parse_float, parse_vec2, parse_vec3,
    parse_vec4, SchemaError, SchemaResult,
};

pub const COMPONENT_NAME: &str = "shadow-light";

/// Attribute snapshot of a `shadow-light` component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LightConfig {
    #[serde(rename = "type")]
    pub kind: LightKind,
    pub intensity: f32,
    pub color: Vec3,
    pub target: Vec3,
    /// Spot cone angle in degrees.
    pub angle: f32,
    pub near: f32,
    pub far: f32,
    /// Shadow frustum as `(top, left, right, bottom)`.
    pub tlrb: Vec4,
    #[serde(alias = "mapsize")]
    pub map_size: Vec2,
    pub bias: f32,
    pub helper: bool,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            kind: LightKind::Directional,
            intensity: 0.5,
            color: Vec3::ONE,
            target: Vec3::ZERO,
            angle: 60.0,
            near: 1.0,
            far: 5.0,
            tlrb: Vec4::new(5.0, -5.0, 5.0, -5.0),
            map_size: Vec2::splat(1024.0),
            bias: -0.000222,
            helper: false,
        }
    }
}

impl LightConfig {
    /// Builds a snapshot from attribute pairs on top of the schema defaults.
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

    /// Returns a new snapshot with one attribute replaced.
    pub fn with_attribute(&self, name: &str, value: &str) -> SchemaResult<Self> {
        let field = LightField::from_name(name).ok_or_else(|| SchemaError::UnknownAttribute {
            component: COMPONENT_NAME.to_string(),
            attribute: name.to_string(),
        })?;
        let mut next = self.clone();
        field.parse_into(&mut next, value)?;
        Ok(next)
    }

    /// Fields whose values differ between `self` and `new`, `Type` first.
    pub fn changed_fields(&self, new: &Self) -> Vec<LightField> {
        LightField::ALL
            .into_iter()
            .filter(|field| field.differs(self, new))
            .collect()
    }
}

/// One top-level attribute of [`LightConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightField {
    Type,
    Intensity,
    Color,
    Target,
    Angle,
    Near,
    Far,
    Tlrb,
    MapSize,
    Bias,
    Helper,
}

impl LightField {
    pub const ALL: [LightField; 11] = [
        LightField::Type,
        LightField::Intensity,
        LightField::Color,
        LightField::Target,
        LightField::Angle,
        LightField::Near,
        LightField::Far,
        LightField::Tlrb,
        LightField::MapSize,
        LightField::Bias,
        LightField::Helper,
    ];

    /// Attribute name as written in markup.
    pub fn name(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Intensity => "intensity",
            Self::Color => "color",
            Self::Target => "target",
            Self::Angle => "angle",
            Self::Near => "near",
            Self::Far => "far",
            Self::Tlrb => "tlrb",
            Self::MapSize => "mapSize",
            Self::Bias => "bias",
            Self::Helper => "helper",
        }
    }

    /// Looks a field up by attribute name, accepting the legacy `mapsize`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "mapsize" => Some(Self::MapSize),
            _ => Self::ALL.into_iter().find(|field| field.name() == name),
        }
    }

    /// Whether a change to this field requires rebuilding the light.
    pub fn is_structural(self) -> bool {
        matches!(self, Self::Type)
    }

    /// Whether this field differs between two snapshots.
    pub fn differs(self, old: &LightConfig, new: &LightConfig) -> bool {
        match self {
            Self::Type => old.kind != new.kind,
            Self::Intensity => old.intensity != new.intensity,
            Self::Color => old.color != new.color,
            Self::Target => old.target != new.target,
            Self::Angle => old.angle != new.angle,
            Self::Near => old.near != new.near,
            Self::Far => old.far != new.far,
            Self::Tlrb => old.tlrb != new.tlrb,
            Self::MapSize => old.map_size != new.map_size,
            Self::Bias => old.bias != new.bias,
            Self::Helper => old.helper != new.helper,
        }
    }

    fn parse_into(self, config: &mut LightConfig, value: &str) -> SchemaResult<()> {
        let name = self.name();
        match self {
            Self::Type => {
                config.kind =
                    LightKind::from_name(value.trim()).ok_or_else(|| SchemaError::UnknownVariant {
                        attribute: name.to_string(),
                        value: value.to_string(),
                        allowed: LightKind::NAMES,
                    })?
            }
            Self::Intensity => config.intensity = parse_bounded_float(name, value, Some(0.0), None)?,
            Self::Color => config.color = parse_color(name, value)?,
            Self::Target => config.target = parse_vec3(name, value)?,
            Self::Angle => config.angle = parse_bounded_float(name, value, Some(0.0), Some(90.0))?,
            Self::Near => config.near = parse_float(name, value)?,
            Self::Far => config.far = parse_float(name, value)?,
            Self::Tlrb => config.tlrb = parse_vec4(name, value)?,
            Self::MapSize => config.map_size = parse_vec2(name, value)?,
            Self::Bias => config.bias = parse_float(name, value)?,
            Self::Helper => config.helper = parse_bool(name, value)?,
        }
        Ok(())
    }

    /// Copies this field from `config` onto `light`.
    ///
    /// `Type`, `Target` and `Helper` touch other scene objects and are
    /// handled by [`ShadowLightComponent`].
    pub fn apply(self, light: &mut ShadowLight, config: &LightConfig) {
        match self {
            Self::Type | Self::Target | Self::Helper => {}
            Self::Intensity => light.intensity = config.intensity,
            Self::Color => light.color = config.color,
            Self::Angle => light.angle = config.angle.to_radians(),
            Self::Near => light.shadow.camera.near = config.near,
            Self::Far => light.shadow.camera.far = config.far,
            Self::Tlrb => light.shadow.camera.set_tlrb(config.tlrb),
            Self::MapSize => {
                let Vec2 { x: width, y: height } = config.map_size;
                light.shadow.map_size = Vec2::new(width, height);
            }
            Self::Bias => light.shadow.bias = config.bias,
        }
    }
}

/// How a light reacts to attribute changes after it was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdatePolicy {
    /// Diff every update and patch or rebuild the light.
    #[default]
    Reconcile,
    /// Build on initialize and ignore later updates.
    BuildOnce,
}

/// Keeps one shadow-casting light, its target and an optional frustum helper
/// in sync with a [`LightConfig`].
#[derive(Debug)]
pub struct ShadowLightComponent {
    scene: SceneHandle,
    element: String,
    policy: UpdatePolicy,
    light: Option<ObjectId>,
    target: Option<ObjectId>,
    helper: Option<ObjectId>,
}

impl ShadowLightComponent {
    /// Element slot the light is stored in.
    pub const SLOT: &'static str = "light";

    pub fn new(scene: SceneHandle, element: impl Into<String>) -> Self {
        Self {
            scene,
            element: element.into(),
            policy: UpdatePolicy::default(),
            light: None,
            target: None,
            helper: None,
        }
    }

    pub fn with_policy(mut self, policy: UpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> UpdatePolicy {
        self.policy
    }

    /// Id of the live light, if one is built.
    pub fn light_id(&self) -> Option<ObjectId> {
        self.light
    }

    pub fn target_id(&self) -> Option<ObjectId> {
        self.target
    }

    pub fn helper_id(&self) -> Option<ObjectId> {
        self.helper
    }

    fn create_light(&mut self, scene: &mut Scene, config: &LightConfig) {
        let target = scene.add(LightTarget::at(config.target));
        let mut light = ShadowLight::new(config.kind, config.color, config.intensity, target);
        for field in LightField::ALL {
            field.apply(&mut light, config);
        }
        light.cast_shadow = true;

        let id = scene.set_object3d(&self.element, Self::SLOT, light);
        self.light = Some(id);
        self.target = Some(target);
        if config.helper {
            self.helper = Some(scene.add(CameraHelper::new(id)));
        }
        scene.renderer_mut().enable_shadow_map();
        info!("{}: created {} light {id}", self.element, config.kind);
    }

    fn teardown(&mut self, scene: &mut Scene) {
        if let Some(target) = self.target.take() {
            scene.remove(target);
        }
        if let Some(light) = self.light.take() {
            scene.remove(light);
        }
        if let Some(helper) = self.helper.take() {
            scene.remove(helper);
        }
    }

    fn sync_helper(&mut self, scene: &mut Scene, light: ObjectId, enabled: bool) {
        match (enabled, self.helper) {
            (true, None) => self.helper = Some(scene.add(CameraHelper::new(light))),
            (false, Some(helper)) => {
                scene.remove(helper);
                self.helper = None;
            }
            _ => {}
        }
    }
}

impl Reconciler for ShadowLightComponent {
    type Config = LightConfig;

    fn initialize(&mut self, config: &LightConfig) {
        let scene = self.scene.clone();
        let mut scene = scene.write();
        self.teardown(&mut scene);
        self.create_light(&mut scene, config);
    }

    fn update(&mut self, old: &LightConfig, new: &LightConfig) {
        if self.policy == UpdatePolicy::BuildOnce {
            debug!("{}: light is build-once, ignoring update", self.element);
            return;
        }
        let Some(light) = self.light else {
            debug!("{}: no live light to update", self.element);
            return;
        };
        let changes = old.changed_fields(new);
        if changes.is_empty() {
            return;
        }

        let scene = self.scene.clone();
        let mut scene = scene.write();
        if changes.iter().any(|field| field.is_structural()) {
            info!("{}: light type changed to {}, rebuilding", self.element, new.kind);
            self.teardown(&mut scene);
            self.create_light(&mut scene, new);
            return;
        }

        for field in changes {
            match field {
                LightField::Type => {}
                LightField::Target => {
                    let Vec3 { x, y, z } = new.target;
                    if let Some(target) = self.target {
                        if let Some(target) = scene.target_mut(target) {
                            target.set(x, y, z);
                        }
                    }
                }
                LightField::Helper => self.sync_helper(&mut scene, light, new.helper),
                LightField::Intensity
                | LightField::Color
                | LightField::Angle
                | LightField::Near
                | LightField::Far
                | LightField::Tlrb
                | LightField::MapSize
                | LightField::Bias => {
                    if let Some(live) = scene.light_mut(light) {
                        field.apply(live, new);
                    }
                }
            }
            debug!("{}: applied {}", self.element, field.name());
        }
    }

    fn remove(&mut self) {
        let scene = self.scene.clone();
        let mut scene = scene.write();
        self.teardown(&mut scene);
    }

    fn is_live(&self) -> bool {
        self.light.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attach(config: &LightConfig) -> (SceneHandle, ShadowLightComponent) {
        let scene = SceneHandle::new();
        let mut component = ShadowLightComponent::new(scene.clone(), "sun");
        component.initialize(config);
        (scene, component)
    }

    fn live_light(scene: &SceneHandle, component: &ShadowLightComponent) -> ShadowLight {
        scene.light(component.light_id().unwrap()).unwrap()
    }

    /// Light fields with the target id swapped for its position, so lights
    /// built in different scenes compare equal.
    fn resolved(scene: &SceneHandle, component: &ShadowLightComponent) -> (ShadowLight, Vec3, bool) {
        let mut light = live_light(scene, component);
        let target = scene.target(light.target).unwrap().position;
        light.target = ObjectId::new(0);
        (light, target, component.helper_id().is_some())
    }

    #[test]
    fn initialize_builds_light_from_config() {
        let config = LightConfig {
            target: Vec3::new(1.0, 0.0, -2.0),
            helper: true,
            ..LightConfig::default()
        };
        let (scene, component) = attach(&config);
        let light = live_light(&scene, &component);

        assert_eq!(light.kind, LightKind::Directional);
        assert_eq!(light.intensity, 0.5);
        assert!(light.cast_shadow);
        assert_eq!(light.shadow.bias, -0.000222);
        assert_eq!(light.shadow.map_size, Vec2::new(1024.0, 1024.0));
        assert_eq!(light.shadow.camera.near, 1.0);
        assert_eq!(light.shadow.camera.far, 5.0);
        assert_eq!(light.shadow.camera.tlrb(), Vec4::new(5.0, -5.0, 5.0, -5.0));
        assert_eq!(
            scene.target(component.target_id().unwrap()).unwrap().position,
            Vec3::new(1.0, 0.0, -2.0)
        );
        let read = scene.read();
        assert_eq!(read.object3d("sun", ShadowLightComponent::SLOT), component.light_id());
        assert!(read.helper(component.helper_id().unwrap()).is_some());
        assert!(read.renderer().shadow_map_enabled());
    }

    #[test]
    fn intensity_update_leaves_other_fields_alone() {
        let (scene, mut component) = attach(&LightConfig::default());
        let before = live_light(&scene, &component);
        let target_before = scene.target(component.target_id().unwrap());

        let old = LightConfig::default();
        let new = old.with_attribute("intensity", "0.9").unwrap();
        component.update(&old, &new);

        let after = live_light(&scene, &component);
        assert_eq!(after.intensity, 0.9);
        assert_eq!(after.kind, LightKind::Directional);
        assert_eq!(scene.target(component.target_id().unwrap()), target_before);
        assert_eq!(ShadowLight { intensity: before.intensity, ..after }, before);
    }

    #[test]
    fn every_in_place_field_is_isolated() {
        let base = LightConfig::default();
        let edits = [
            ("color", "#ff0000"),
            ("angle", "30"),
            ("near", "0.5"),
            ("far", "50"),
            ("tlrb", "8 -6 7 -9"),
            ("mapsize", "2048 512"),
            ("bias", "-0.001"),
        ];
        for (attribute, value) in edits {
            let (scene, mut component) = attach(&base);
            let before = live_light(&scene, &component);
            let new = base.with_attribute(attribute, value).unwrap();
            component.update(&base, &new);

            let after = live_light(&scene, &component);
            let mut expected = before.clone();
            LightField::from_name(attribute)
                .unwrap()
                .apply(&mut expected, &new);
            assert_eq!(after, expected, "updating {attribute}");
            assert_eq!(component.light_id().map(|id| scene.light(id).is_some()), Some(true));
        }
    }

    #[test]
    fn target_update_moves_existing_target() {
        let (scene, mut component) = attach(&LightConfig::default());
        let target = component.target_id();
        let old = LightConfig::default();
        let new = old.with_attribute("target", "0 -1 4").unwrap();
        component.update(&old, &new);

        assert_eq!(component.target_id(), target);
        assert_eq!(
            scene.target(target.unwrap()).unwrap().position,
            Vec3::new(0.0, -1.0, 4.0)
        );
    }

    #[test]
    fn type_change_rebuilds_from_new_config() {
        let old = LightConfig {
            helper: true,
            ..LightConfig::default()
        };
        let (scene, mut component) = attach(&old);
        let old_light = component.light_id().unwrap();
        let old_target = component.target_id().unwrap();
        let old_helper = component.helper_id().unwrap();

        let new = old
            .with_attribute("type", "spot")
            .and_then(|c| c.with_attribute("intensity", "0.9"))
            .and_then(|c| c.with_attribute("helper", "false"))
            .and_then(|c| c.with_attribute("target", "1 2 3"))
            .unwrap();
        component.update(&old, &new);

        {
            let read = scene.read();
            assert!(!read.contains(old_light));
            assert!(!read.contains(old_target));
            assert!(!read.contains(old_helper));
            assert_eq!(read.count("light"), 1);
            assert_eq!(read.count("target"), 1);
            assert_eq!(read.count("helper"), 0);
        }

        let (fresh_scene, fresh) = attach(&new);
        assert_eq!(resolved(&scene, &component), resolved(&fresh_scene, &fresh));
        assert_eq!(live_light(&scene, &component).kind, LightKind::Spot);
    }

    #[test]
    fn type_change_keeps_helper_on_new_light() {
        let old = LightConfig {
            helper: true,
            ..LightConfig::default()
        };
        let (scene, mut component) = attach(&old);
        let old_helper = component.helper_id().unwrap();

        let new = old.with_attribute("type", "spot").unwrap();
        component.update(&old, &new);

        let light = component.light_id().unwrap();
        let helper = component.helper_id().unwrap();
        assert_ne!(helper, old_helper);
        let read = scene.read();
        assert!(!read.contains(old_helper));
        assert_eq!(read.count("helper"), 1);
        assert_eq!(read.helper(helper).unwrap().light, light);
        assert_eq!(read.light(light).unwrap().kind, LightKind::Spot);
    }

    #[test]
    fn helper_toggle_is_idempotent() {
        let (scene, mut component) = attach(&LightConfig::default());
        let off = LightConfig::default();
        let on = off.with_attribute("helper", "true").unwrap();

        component.update(&off, &on);
        let helper = component.helper_id();
        assert!(helper.is_some());
        component.update(&on, &on);
        assert_eq!(component.helper_id(), helper);
        assert_eq!(scene.read().count("helper"), 1);

        component.update(&on, &off);
        assert!(component.helper_id().is_none());
        assert_eq!(scene.read().count("helper"), 0);
    }

    #[test]
    fn remove_is_idempotent() {
        let (scene, mut component) = attach(&LightConfig {
            helper: true,
            ..LightConfig::default()
        });
        component.remove();
        assert!(!component.is_live());
        assert!(scene.read().is_empty());
        component.remove();
        assert!(scene.read().is_empty());
    }

    #[test]
    fn update_without_live_light_is_a_no_op() {
        let scene = SceneHandle::new();
        let mut component = ShadowLightComponent::new(scene.clone(), "sun");
        let old = LightConfig::default();
        let new = old.with_attribute("type", "spot").unwrap();
        component.update(&old, &new);
        assert!(!component.is_live());
        assert!(scene.read().is_empty());
    }

    #[test]
    fn build_once_ignores_updates() {
        let scene = SceneHandle::new();
        let mut component =
            ShadowLightComponent::new(scene.clone(), "sun").with_policy(UpdatePolicy::BuildOnce);
        let old = LightConfig::default();
        component.initialize(&old);
        let new = old.with_attribute("intensity", "2").unwrap();
        component.update(&old, &new);
        assert_eq!(live_light(&scene, &component).intensity, 0.5);
    }

    #[test]
    fn schema_parses_attributes_and_rejects_bad_values() {
        let config = LightConfig::from_attributes([
            ("type", "spot"),
            ("intensity", "-3"),
            ("mapSize", "512 256"),
            ("helper", ""),
        ])
        .unwrap();
        assert_eq!(config.kind, LightKind::Spot);
        assert_eq!(config.intensity, 0.0);
        assert_eq!(config.map_size, Vec2::new(512.0, 256.0));
        assert!(config.helper);

        assert!(matches!(
            LightConfig::default().with_attribute("type", "point"),
            Err(SchemaError::UnknownVariant { .. })
        ));
        assert!(matches!(
            LightConfig::default().with_attribute("decay", "2"),
            Err(SchemaError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn changed_fields_lists_type_first() {
        let old = LightConfig::default();
        let new = LightConfig {
            kind: LightKind::Spot,
            bias: 0.1,
            ..old.clone()
        };
        assert_eq!(
            old.changed_fields(&new),
            vec![LightField::Type, LightField::Bias]
        );
        assert!(old.changed_fields(&old).is_empty());
    }

    #[test]
    fn config_deserializes_with_legacy_names() {
        let config: LightConfig =
            serde_json::from_str(r#"{"type": "spot", "mapsize": [256, 128], "near": 2}"#).unwrap();
        assert_eq!(config.kind, LightKind::Spot);
        assert_eq!(config.map_size, Vec2::new(256.0, 128.0));
        assert_eq!(config.near, 2.0);
        assert_eq!(config.far, 5.0);
    }
}
