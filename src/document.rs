use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use log::debug;
use roxmltree::{Document as XmlDocument, Node};

use crate::primitives;
use crate::schema::parse_property_list;

/// Component attributes declared on one element, keyed by component name.
pub type ComponentAttributes = BTreeMap<String, Vec<(String, String)>>;

/// A scene element carrying at least one shadow component.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementDecl {
    pub id: String,
    pub tag: String,
    pub components: ComponentAttributes,
}

impl ElementDecl {
    pub fn attributes(&self, component: &str) -> Option<&[(String, String)]> {
        self.components.get(component).map(Vec::as_slice)
    }
}

/// Declarative scene description authored as markup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneDocument {
    pub elements: Vec<ElementDecl>,
}

impl SceneDocument {
    /// Parses markup such as `<a-scene><a-shadow-light .../></a-scene>`.
    ///
    /// Primitive tags contribute their default component and mapped
    /// attributes; any element may also carry a component attribute holding
    /// an inline `name: value; ...` list. Elements without a shadow
    /// component are skipped.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = XmlDocument::parse(xml).context("invalid scene markup")?;
        let mut elements = Vec::new();

        for (index, node) in document
            .root_element()
            .descendants()
            .filter(Node::is_element)
            .enumerate()
        {
            let tag = node.tag_name().name().to_string();
            let components = element_components(&node)
                .with_context(|| format!("invalid attributes on <{tag}>"))?;
            if components.is_empty() {
                continue;
            }
            let id = node
                .attribute("id")
                .map(str::to_string)
                .unwrap_or_else(|| format!("{tag}-{index}"));
            if elements.iter().any(|element: &ElementDecl| element.id == id) {
                return Err(anyhow!("duplicate element id `{id}`"));
            }
            elements.push(ElementDecl {
                id,
                tag,
                components,
            });
        }

        Ok(Self { elements })
    }

    pub fn element(&self, id: &str) -> Option<&ElementDecl> {
        self.elements.iter().find(|element| element.id == id)
    }
}

fn element_components(node: &Node<'_, '_>) -> Result<ComponentAttributes> {
    let mut components = ComponentAttributes::new();

    if let Some(primitive) = primitives::primitive(node.tag_name().name()) {
        let mapped = components
            .entry(primitive.component.to_string())
            .or_default();
        for attribute in node.attributes() {
            match primitive.field_for(attribute.name()) {
                Some(field) => mapped.push((field.to_string(), attribute.value().to_string())),
                None => debug!(
                    "<{}> attribute `{}` is not mapped, leaving it to the host",
                    primitive.tag,
                    attribute.name()
                ),
            }
        }
    }

    for attribute in node.attributes() {
        if !primitives::is_component(attribute.name()) {
            continue;
        }
        let properties = parse_property_list(attribute.value())?;
        components
            .entry(attribute.name().to_string())
            .or_default()
            .extend(properties);
    }

    Ok(components)
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    static SAMPLE: Lazy<SceneDocument> = Lazy::new(|| {
        SceneDocument::from_xml(
            r#"
            <a-scene>
                <a-shadow-light id="sun" type="spot" mapsize="512 512" position="0 4 0"/>
                <a-entity>
                    <a-shadow-plane dimensions="20 5"/>
                </a-entity>
                <a-entity id="ground" shadow-plane="opacity: 0.4; dimensions: 4 4"/>
                <a-box color="red"/>
            </a-scene>
            "#,
        )
        .unwrap()
    });

    #[test]
    fn primitives_map_attributes_to_component_fields() {
        let sun = SAMPLE.element("sun").unwrap();
        assert_eq!(sun.tag, "a-shadow-light");
        assert_eq!(
            sun.attributes("shadow-light").unwrap(),
            &[
                ("type".to_string(), "spot".to_string()),
                ("mapSize".to_string(), "512 512".to_string()),
            ]
        );
    }

    #[test]
    fn elements_without_components_are_skipped() {
        let ids: Vec<&str> = SAMPLE.elements.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["sun", "a-shadow-plane-3", "ground"]);
    }

    #[test]
    fn bare_primitive_still_gets_its_component() {
        let plane = SAMPLE.element("a-shadow-plane-3").unwrap();
        assert_eq!(
            plane.attributes("shadow-plane").unwrap(),
            &[("dimensions".to_string(), "20 5".to_string())]
        );
    }

    #[test]
    fn inline_component_properties_are_split() {
        let ground = SAMPLE.element("ground").unwrap();
        assert_eq!(
            ground.attributes("shadow-plane").unwrap(),
            &[
                ("opacity".to_string(), "0.4".to_string()),
                ("dimensions".to_string(), "4 4".to_string()),
            ]
        );
    }

    #[test]
    fn malformed_markup_is_an_error() {
        assert!(SceneDocument::from_xml("<a-scene>").is_err());
        assert!(SceneDocument::from_xml(r#"<a-scene><a-entity shadow-light="intensity"/></a-scene>"#).is_err());
        assert!(SceneDocument::from_xml(
            r#"<a-scene><a-shadow-plane id="x"/><a-shadow-plane id="x"/></a-scene>"#
        )
        .is_err());
    }
}
