//! Scene files.
//!
//! A scene is one JSON document holding the element tree, the style rules,
//! the viewport and optionally the layout constants:
//!
//! ```json
//! {
//!   "viewport": { "width": 800, "height": 600 },
//!   "root": { "kind": "div", "id": "app", "children": [] },
//!   "rules": [ { "selector": "#app", "declarations": { "display": "flex" } } ]
//! }
//! ```
//!
//! Declarations of a rule or an inline `style` apply in key order.

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use log::debug;
use serde::Deserialize;
use trellis_css::{LayoutConfig, RuleSetResolver, StyleProperties, Viewport};
use trellis_dom::{DomTree, ElementData, ElementKind, NodeId};

/// One element of the scene tree.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementSpec {
    /// Tag name, e.g. `div` or `td`.
    pub kind: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// Literal text content.
    #[serde(default)]
    pub text: Option<String>,
    /// Inline declarations, applied after every rule.
    #[serde(default)]
    pub style: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<ElementSpec>,
}

/// A style rule as written in the scene.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    pub selector: String,
    #[serde(default)]
    pub declarations: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneFile {
    viewport: Viewport,
    root: ElementSpec,
    #[serde(default)]
    rules: Vec<RuleSpec>,
    #[serde(default)]
    config: Option<LayoutConfig>,
}

/// A scene ready for layout.
pub struct Scene {
    pub tree: DomTree,
    pub resolver: RuleSetResolver,
    pub viewport: Viewport,
    pub config: LayoutConfig,
}

impl Scene {
    /// Parse a scene document and build its tree and rules.
    pub fn from_json(source: &str) -> Result<Self> {
        let file: SceneFile = serde_json::from_str(source).context("invalid scene document")?;

        let mut resolver = RuleSetResolver::new();
        for rule in &file.rules {
            resolver
                .add_rule_text(
                    &rule.selector,
                    rule.declarations
                        .iter()
                        .map(|(name, value)| (name.as_str(), value.as_str())),
                )
                .with_context(|| format!("in rule `{}`", rule.selector))?;
        }

        let mut tree = DomTree::new(element_data(&file.root));
        let root = tree.root();
        apply_element(&mut tree, &mut resolver, root, &file.root)?;
        debug!(
            "scene: {} elements, {} rules",
            tree.len(),
            resolver.rules().len()
        );

        Ok(Self {
            tree,
            resolver,
            viewport: file.viewport,
            config: file.config.unwrap_or_default(),
        })
    }

    /// The element whose `id` attribute is `id`.
    pub fn find(&self, id: &str) -> Result<NodeId> {
        match self.tree.find_by_element_id(id) {
            Some(node) => Ok(node),
            None => bail!("no element with id `{id}` in the scene"),
        }
    }
}

fn element_data(spec: &ElementSpec) -> ElementData {
    let mut data = ElementData::new(ElementKind::from_tag(&spec.kind));
    if let Some(id) = &spec.id {
        data = data.with_id(id);
    }
    for class in &spec.classes {
        data = data.with_class(class);
    }
    for (name, value) in &spec.attrs {
        data = data.with_attr(name, value);
    }
    data
}

/// Text, inline style and children of the already created `node`.
fn apply_element(
    tree: &mut DomTree,
    resolver: &mut RuleSetResolver,
    node: NodeId,
    spec: &ElementSpec,
) -> Result<()> {
    if spec.text.is_some() {
        tree.set_text(node, spec.text.clone());
    }
    if !spec.style.is_empty() {
        let mut inline = StyleProperties::default();
        for (name, value) in &spec.style {
            inline
                .set(name, value)
                .with_context(|| format!("in inline style of <{}> ({node})", spec.kind))?;
        }
        resolver.set_inline(node, inline);
    }
    for child in &spec.children {
        let child_node = tree.append_element(node, element_data(child));
        apply_element(tree, resolver, child_node, child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r##"{
        "viewport": { "width": 400, "height": 300 },
        "root": {
            "kind": "div",
            "id": "app",
            "children": [
                { "kind": "p", "id": "intro", "text": "hello", "style": { "height": "20px" } },
                { "kind": "td", "attrs": { "colspan": "2" } }
            ]
        },
        "rules": [ { "selector": "#app", "declarations": { "display": "flex" } } ],
        "config": { "default_leaf_height": 12 }
    }"##;

    #[test]
    fn test_scene_builds_tree_and_rules() {
        let scene = Scene::from_json(SCENE).unwrap();
        assert_eq!(scene.tree.len(), 3);
        assert_eq!(scene.resolver.rules().len(), 1);
        assert_eq!(scene.viewport.width, 400.0);
        assert_eq!(scene.config.default_leaf_height, 12.0);
        assert_eq!(scene.config.default_leaf_width, 100.0);

        let intro = scene.find("intro").unwrap();
        assert_eq!(scene.tree.text(intro), Some("hello"));
        let cell = scene.tree.children(scene.tree.root())[1];
        assert_eq!(scene.tree.element(cell).map(ElementData::colspan), Some(2));
    }

    #[test]
    fn test_unknown_id_is_an_error() {
        let scene = Scene::from_json(SCENE).unwrap();
        assert!(scene.find("missing").is_err());
    }

    #[test]
    fn test_malformed_declaration_is_reported() {
        let source = r#"{
            "viewport": { "width": 10, "height": 10 },
            "root": { "kind": "div", "style": { "width": "wide" } }
        }"#;
        let err = Scene::from_json(source).err().unwrap();
        assert!(format!("{err:#}").contains("inline style"));
    }
}
