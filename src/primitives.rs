//! Tag-to-component attribute tables for the declarative primitives.

use crate::components::{shadow_light, shadow_plane};

/// A primitive tag and the component attributes its own attributes map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Primitive {
    pub tag: &'static str,
    pub component: &'static str,
    /// `(tag attribute, component field)` pairs.
    pub mappings: &'static [(&'static str, &'static str)],
}

impl Primitive {
    /// Component field fed by `attribute`, if the tag maps it.
    pub fn field_for(&self, attribute: &str) -> Option<&'static str> {
        self.mappings
            .iter()
            .find(|(name, _)| *name == attribute)
            .map(|(_, field)| *field)
    }
}

pub const SHADOW_LIGHT: Primitive = Primitive {
    tag: "a-shadow-light",
    component: shadow_light::COMPONENT_NAME,
    mappings: &[
        ("type", "type"),
        ("intensity", "intensity"),
        ("color", "color"),
        ("target", "target"),
        ("angle", "angle"),
        ("near", "near"),
        ("far", "far"),
        ("tlrb", "tlrb"),
        ("mapsize", "mapSize"),
        ("mapSize", "mapSize"),
        ("bias", "bias"),
        ("helper", "helper"),
    ],
};

pub const SHADOW_PLANE: Primitive = Primitive {
    tag: "a-shadow-plane",
    component: shadow_plane::COMPONENT_NAME,
    mappings: &[("dimensions", "dimensions"), ("opacity", "opacity")],
};

pub const PRIMITIVES: &[Primitive] = &[SHADOW_LIGHT, SHADOW_PLANE];

/// Component names that may appear as attributes on any element.
pub const COMPONENTS: &[&str] = &[shadow_light::COMPONENT_NAME, shadow_plane::COMPONENT_NAME];

pub fn primitive(tag: &str) -> Option<&'static Primitive> {
    PRIMITIVES.iter().find(|primitive| primitive.tag == tag)
}

pub fn is_component(name: &str) -> bool {
    COMPONENTS.contains(&name)
}
