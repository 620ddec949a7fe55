//! Element tree for the trellis layout engine.
//!
//! This crate provides an arena-based tree of styled, HTML-like elements.
//! Every node carries a stable [`NodeId`], an [`ElementKind`] (which drives
//! type-default styles and table/list semantics), an ordered list of
//! children, optional literal text, and kind-specific attributes.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. Layout
//! output refers back to elements through the same ids, never by name.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

/// Map of attribute names to values for an element.
pub type AttributesMap = HashMap<String, String>;

/// A type-safe index into the element tree.
///
/// `NodeId` provides O(1) access to any node in the tree without borrowing
/// issues, and is the stable key for every per-element cache in layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root element is always at index 0.
    pub const ROOT: Self = Self(0);
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of an element.
///
/// Kinds map onto HTML tag names. Table and list kinds carry structural
/// meaning for the table and list layout engines; every other kind lays out
/// as a generic box. Unknown tag names are kept verbatim in
/// [`ElementKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(from = "String", into = "String")]
pub enum ElementKind {
    /// Generic block container.
    Div,
    /// Generic inline-ish container (laid out as a box).
    Span,
    /// Sectioning container.
    Section,
    /// Paragraph.
    P,
    /// Button.
    Button,
    /// Image placeholder box.
    Img,
    /// Text-bearing leaf.
    Text,
    /// Document body.
    Body,
    /// `<table>`
    Table,
    /// `<thead>` row group.
    Thead,
    /// `<tbody>` row group.
    Tbody,
    /// `<tfoot>` row group.
    Tfoot,
    /// `<tr>` table row.
    Tr,
    /// `<td>` data cell.
    Td,
    /// `<th>` header cell.
    Th,
    /// `<col>` column definition.
    Col,
    /// `<colgroup>` column group.
    Colgroup,
    /// `<caption>` table caption.
    Caption,
    /// `<ul>` unordered list.
    Ul,
    /// `<ol>` ordered list.
    Ol,
    /// `<li>` list item.
    Li,
    /// Any other tag name, lowercased.
    #[strum(default)]
    Other(String),
}

impl ElementKind {
    /// Parse a tag name, case-insensitively. Never fails: unknown names
    /// become [`ElementKind::Other`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let lower = tag.to_ascii_lowercase();
        Self::from_str(&lower).unwrap_or(Self::Other(lower))
    }

    /// The lowercase tag name of this kind.
    #[must_use]
    pub fn tag_name(&self) -> &str {
        match self {
            Self::Div => "div",
            Self::Span => "span",
            Self::Section => "section",
            Self::P => "p",
            Self::Button => "button",
            Self::Img => "img",
            Self::Text => "text",
            Self::Body => "body",
            Self::Table => "table",
            Self::Thead => "thead",
            Self::Tbody => "tbody",
            Self::Tfoot => "tfoot",
            Self::Tr => "tr",
            Self::Td => "td",
            Self::Th => "th",
            Self::Col => "col",
            Self::Colgroup => "colgroup",
            Self::Caption => "caption",
            Self::Ul => "ul",
            Self::Ol => "ol",
            Self::Li => "li",
            Self::Other(name) => name,
        }
    }

    /// `<thead>`, `<tbody>` or `<tfoot>`.
    #[must_use]
    pub const fn is_row_group(&self) -> bool {
        matches!(self, Self::Thead | Self::Tbody | Self::Tfoot)
    }

    /// `<td>` or `<th>`.
    #[must_use]
    pub const fn is_table_cell(&self) -> bool {
        matches!(self, Self::Td | Self::Th)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_name())
    }
}

impl From<String> for ElementKind {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<ElementKind> for String {
    fn from(kind: ElementKind) -> Self {
        kind.tag_name().to_string()
    }
}

/// Element-specific data: kind, identity, classes, and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// The element kind (tag name).
    pub kind: ElementKind,
    /// The element's `id`, used by id selectors.
    pub id: Option<String>,
    /// The element's class list, used by class selectors.
    pub classes: Vec<String>,
    /// Kind-specific attributes (`colspan`, `rowspan`, `span`, `width`, ...).
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Create element data with no id, classes or attributes.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            id: None,
            classes: Vec::new(),
            attrs: AttributesMap::new(),
        }
    }

    /// Builder: set the id.
    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Builder: add a class.
    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Builder: set an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        let _ = self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// Returns true if the class list contains `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Read a positive integer attribute, defaulting to 1.
    ///
    /// Missing, unparseable, or zero values all read as 1, matching how HTML
    /// treats invalid span counts.
    fn span_attr(&self, name: &str) -> u32 {
        self.attrs
            .get(name)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(1)
    }

    /// The `colspan` of a table cell (default 1).
    #[must_use]
    pub fn colspan(&self) -> u32 {
        self.span_attr("colspan")
    }

    /// The `rowspan` of a table cell (default 1).
    #[must_use]
    pub fn rowspan(&self) -> u32 {
        self.span_attr("rowspan")
    }

    /// The `span` of a `<col>` or `<colgroup>` (default 1).
    #[must_use]
    pub fn span(&self) -> u32 {
        self.span_attr("span")
    }

    /// The declared pixel width of a column definition, if any.
    ///
    /// Accepts `"120"` and `"120px"`.
    #[must_use]
    pub fn col_width(&self) -> Option<f32> {
        let raw = self.attrs.get("width")?.trim();
        let number = raw.strip_suffix("px").unwrap_or(raw);
        number.parse::<f32>().ok().filter(|w| w.is_finite() && *w >= 0.0)
    }
}

/// A node in the element tree.
///
/// This node stores indices for parent/child relationships, enabling O(1)
/// traversal in any direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// The element's kind, identity and attributes.
    pub data: ElementData,
    /// Optional literal text carried by the element.
    pub text: Option<String>,
    /// The parent, or `None` for the root.
    pub parent: Option<NodeId>,
    /// Ordered children.
    pub children: Vec<NodeId>,
}

/// Arena-based element tree with O(1) node access and traversal.
///
/// This structure stores all nodes in a contiguous vector, using indices
/// for all relationships. The root element is always at
/// [`NodeId::ROOT`].
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new tree whose root element is `root`.
    #[must_use]
    pub fn new(root: ElementData) -> Self {
        Self {
            nodes: vec![Node {
                data: root,
                text: None,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Get the root element ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (it always holds at least the root).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, data: ElementData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            text: None,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Appends `child` as the last child of `parent`.
    ///
    /// A child that already has a parent is detached from it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old_parent) = self.parent(child) {
            self.nodes[old_parent.0].children.retain(|&c| c != child);
        }
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Allocate `data` and append it under `parent` in one step.
    pub fn append_element(&mut self, parent: NodeId, data: ElementData) -> NodeId {
        let id = self.alloc(data);
        self.append_child(parent, id);
        id
    }

    /// Allocate a text-bearing element under `parent`.
    pub fn append_text(&mut self, parent: NodeId, data: ElementData, text: &str) -> NodeId {
        let id = self.append_element(parent, data);
        self.set_text(id, Some(text.to_string()));
        id
    }

    /// Replace the literal text of a node.
    pub fn set_text(&mut self, id: NodeId, text: Option<String>) {
        if let Some(node) = self.get_mut(id) {
            node.text = text;
        }
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get element data for a node.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).map(|n| &n.data)
    }

    /// Get the literal text of a node, if it carries any.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| n.text.as_deref())
    }

    /// Find the first element whose `id` equals `element_id`.
    #[must_use]
    pub fn find_by_element_id(&self, element_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.data.id.as_deref() == Some(element_id))
            .map(NodeId)
    }

    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// All descendants of `id` in document (pre-order) order, excluding `id`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}
