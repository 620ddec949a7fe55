//! Tests for element tree construction, traversal and table attributes.

use trellis_dom::{DomTree, ElementData, ElementKind, NodeId};

fn element(tag: &str) -> ElementData {
    ElementData::new(ElementKind::from_tag(tag))
}

#[test]
fn test_root_is_node_zero() {
    let tree = DomTree::new(element("div"));
    assert_eq!(tree.root(), NodeId::ROOT);
    assert_eq!(tree.len(), 1);
    assert!(tree.parent(tree.root()).is_none());
}

#[test]
fn test_append_preserves_child_order() {
    let mut tree = DomTree::new(element("div"));
    let a = tree.append_element(NodeId::ROOT, element("span"));
    let b = tree.append_element(NodeId::ROOT, element("span"));
    let c = tree.append_element(NodeId::ROOT, element("span"));

    assert_eq!(tree.children(NodeId::ROOT), &[a, b, c]);
    assert_eq!(tree.parent(b), Some(NodeId::ROOT));
}

#[test]
fn test_append_child_reparents() {
    let mut tree = DomTree::new(element("div"));
    let first = tree.append_element(NodeId::ROOT, element("div"));
    let second = tree.append_element(NodeId::ROOT, element("div"));
    let leaf = tree.append_element(first, element("p"));

    tree.append_child(second, leaf);

    assert!(tree.children(first).is_empty());
    assert_eq!(tree.children(second), &[leaf]);
    assert_eq!(tree.parent(leaf), Some(second));
}

#[test]
fn test_descendants_are_pre_order() {
    let mut tree = DomTree::new(element("div"));
    let a = tree.append_element(NodeId::ROOT, element("div"));
    let a1 = tree.append_element(a, element("p"));
    let a2 = tree.append_element(a, element("p"));
    let b = tree.append_element(NodeId::ROOT, element("div"));

    assert_eq!(tree.descendants(NodeId::ROOT), vec![a, a1, a2, b]);
    assert_eq!(tree.descendants(a), vec![a1, a2]);
}

#[test]
fn test_ancestors_walk_to_root() {
    let mut tree = DomTree::new(element("div"));
    let a = tree.append_element(NodeId::ROOT, element("div"));
    let b = tree.append_element(a, element("div"));
    let c = tree.append_element(b, element("p"));

    let chain: Vec<NodeId> = tree.ancestors(c).collect();
    assert_eq!(chain, vec![b, a, NodeId::ROOT]);
    assert!(tree.is_descendant_of(c, a));
    assert!(!tree.is_descendant_of(a, c));
}

#[test]
fn test_text_is_attached_to_element() {
    let mut tree = DomTree::new(element("div"));
    let label = tree.append_text(NodeId::ROOT, element("text"), "hello");
    assert_eq!(tree.text(label), Some("hello"));

    tree.set_text(label, None);
    assert_eq!(tree.text(label), None);
}

#[test]
fn test_element_kind_parsing() {
    assert_eq!(ElementKind::from_tag("TD"), ElementKind::Td);
    assert_eq!(ElementKind::from_tag("thead"), ElementKind::Thead);
    assert_eq!(
        ElementKind::from_tag("Widget"),
        ElementKind::Other("widget".to_string())
    );
    assert_eq!(ElementKind::Colgroup.to_string(), "colgroup");
    assert!(ElementKind::Tfoot.is_row_group());
    assert!(ElementKind::Th.is_table_cell());
}

#[test]
fn test_span_attributes_default_to_one() {
    let cell = element("td");
    assert_eq!(cell.colspan(), 1);
    assert_eq!(cell.rowspan(), 1);

    let wide = element("td").with_attr("colspan", "3").with_attr("rowspan", "0");
    assert_eq!(wide.colspan(), 3);
    // Zero is not a valid span and reads as 1.
    assert_eq!(wide.rowspan(), 1);

    let junk = element("col").with_attr("span", "lots");
    assert_eq!(junk.span(), 1);
}

#[test]
fn test_col_width_accepts_px_suffix() {
    assert_eq!(element("col").with_attr("width", "120px").col_width(), Some(120.0));
    assert_eq!(element("col").with_attr("width", "80").col_width(), Some(80.0));
    assert_eq!(element("col").with_attr("width", "wide").col_width(), None);
    assert_eq!(element("col").col_width(), None);
}

#[test]
fn test_find_by_element_id() {
    let mut tree = DomTree::new(element("div").with_id("app"));
    let panel = tree.append_element(NodeId::ROOT, element("div").with_id("panel").with_class("card"));

    assert_eq!(tree.find_by_element_id("app"), Some(NodeId::ROOT));
    assert_eq!(tree.find_by_element_id("panel"), Some(panel));
    assert_eq!(tree.find_by_element_id("missing"), None);
    assert!(tree.element(panel).is_some_and(|e| e.has_class("card")));
}
