//! Tests for stacking contexts, paint order and depth.

use std::collections::HashMap;

use trellis_css::layout::{EstablishedBy, StackingContexts};
use trellis_css::{LayoutConfig, RuleSetResolver, StyleProperties, compute_styles};
use trellis_dom::{DomTree, ElementData, ElementKind, NodeId};

fn div(id: &str) -> ElementData {
    ElementData::new(ElementKind::Div).with_id(id)
}

fn styles(tree: &DomTree, rules: &[(&str, &[(&str, &str)])]) -> HashMap<NodeId, StyleProperties> {
    let mut resolver = RuleSetResolver::new();
    for (selector, declarations) in rules {
        resolver
            .add_rule_text(selector, declarations.iter().copied())
            .unwrap();
    }
    compute_styles(tree, &resolver)
}

fn build(tree: &DomTree, rules: &[(&str, &[(&str, &str)])]) -> StackingContexts {
    StackingContexts::build(tree, &styles(tree, rules), &LayoutConfig::default())
}

#[test]
fn test_higher_z_paints_later() {
    let mut tree = DomTree::new(div("root"));
    let low = tree.append_element(NodeId::ROOT, div("low"));
    let high = tree.append_element(NodeId::ROOT, div("high"));
    let plain = tree.append_element(NodeId::ROOT, div("plain"));

    let contexts = build(
        &tree,
        &[
            ("#low", &[("position", "relative"), ("z-index", "2")]),
            ("#high", &[("position", "relative"), ("z-index", "5")]),
        ],
    );

    assert_eq!(contexts.len(), 3);
    assert_eq!(
        contexts.get(high).unwrap().established_by,
        EstablishedBy::PositionedZIndex
    );
    assert_eq!(contexts.root().unwrap().children, vec![low, high]);
    // Plain members paint at level 0, before positive contexts.
    assert_eq!(contexts.paint_order(), vec![NodeId::ROOT, plain, low, high]);
    assert!(contexts.depth(high) > contexts.depth(low));
}

#[test]
fn test_equal_z_paints_in_document_order() {
    let mut tree = DomTree::new(div("root"));
    let first = tree.append_element(NodeId::ROOT, div("first").with_class("layer"));
    let second = tree.append_element(NodeId::ROOT, div("second").with_class("layer"));

    let contexts = build(
        &tree,
        &[(".layer", &[("position", "absolute"), ("z-index", "1")])],
    );
    assert_eq!(contexts.paint_order(), vec![NodeId::ROOT, first, second]);
    assert_eq!(contexts.depth(first), contexts.depth(second));
}

#[test]
fn test_negative_z_paints_below_members() {
    let mut tree = DomTree::new(div("root"));
    let plain = tree.append_element(NodeId::ROOT, div("plain"));
    let behind = tree.append_element(NodeId::ROOT, div("behind"));

    let contexts = build(
        &tree,
        &[("#behind", &[("position", "relative"), ("z-index", "-1")])],
    );
    assert_eq!(contexts.paint_order(), vec![NodeId::ROOT, behind, plain]);
    assert!(contexts.depth(behind) < contexts.depth(plain));
}

#[test]
fn test_outer_level_dominates_depth() {
    let mut tree = DomTree::new(div("root"));
    let a = tree.append_element(NodeId::ROOT, div("a"));
    let a_inner = tree.append_element(a, div("a-inner"));
    let a_member = tree.append_element(a, div("a-member"));
    let b = tree.append_element(NodeId::ROOT, div("b"));
    let b_inner = tree.append_element(b, div("b-inner"));

    let contexts = build(
        &tree,
        &[
            ("#a", &[("position", "relative"), ("z-index", "2")]),
            ("#a-inner", &[("position", "relative"), ("z-index", "400")]),
            ("#b", &[("position", "relative"), ("z-index", "3")]),
            ("#b-inner", &[("position", "relative"), ("z-index", "-400")]),
        ],
    );

    // Two nested levels, base 1000.
    assert_eq!(contexts.depth(NodeId::ROOT), 0.0);
    assert_eq!(contexts.depth(a), 2000.0);
    assert_eq!(contexts.depth(a_member), contexts.depth(a));
    assert_eq!(contexts.depth(a_inner), 2400.0);
    assert_eq!(contexts.depth(b_inner), 2600.0);
    assert!(contexts.depth(a_inner) < contexts.depth(b_inner));
    assert_eq!(contexts.owner_of(a_inner), Some(a));
    assert_eq!(contexts.owner_of(a), Some(NodeId::ROOT));

    // Nested contexts paint atomically inside their parent.
    assert_eq!(
        contexts.paint_order(),
        vec![NodeId::ROOT, a, a_member, a_inner, b, b_inner]
    );
}

#[test]
fn test_large_levels_raise_the_base() {
    let mut tree = DomTree::new(div("root"));
    let a = tree.append_element(NodeId::ROOT, div("a"));
    let huge = tree.append_element(a, div("huge"));
    let b = tree.append_element(NodeId::ROOT, div("b"));

    let contexts = build(
        &tree,
        &[
            ("#a", &[("position", "relative"), ("z-index", "1")]),
            ("#huge", &[("position", "relative"), ("z-index", "100000")]),
            ("#b", &[("position", "relative"), ("z-index", "2")]),
        ],
    );
    // Base becomes 2 * (100000 + 1).
    assert_eq!(contexts.depth(a), 200_002.0);
    assert_eq!(contexts.depth(huge), 300_002.0);
    assert_eq!(contexts.depth(b), 400_004.0);
}

#[test]
fn test_levels_above_half_the_base_stay_distinct() {
    let mut tree = DomTree::new(div("root"));
    let low = tree.append_element(NodeId::ROOT, div("low"));
    let high = tree.append_element(NodeId::ROOT, div("high"));

    let contexts = build(
        &tree,
        &[
            ("#low", &[("position", "relative"), ("z-index", "600")]),
            ("#high", &[("position", "relative"), ("z-index", "900")]),
        ],
    );
    assert_eq!(contexts.depth(low), 600.0);
    assert_eq!(contexts.depth(high), 900.0);
}

#[test]
fn test_deep_chains_keep_outer_order() {
    let mut tree = DomTree::new(div("root"));
    let l1 = tree.append_element(NodeId::ROOT, div("l1").with_class("level"));
    let l2 = tree.append_element(l1, div("l2").with_class("level"));
    let l3 = tree.append_element(l2, div("l3").with_class("level"));
    let b = tree.append_element(l3, div("b").with_class("level"));
    let b5 = tree.append_element(b, div("b5").with_class("top"));
    let b6 = tree.append_element(b5, div("b6").with_class("top"));
    let b7 = tree.append_element(b6, div("b7").with_class("top"));
    let a = tree.append_element(l3, div("a"));

    let contexts = build(
        &tree,
        &[
            (".level", &[("position", "relative"), ("z-index", "0")]),
            (".top", &[("position", "relative"), ("z-index", "499")]),
            ("#a", &[("position", "relative"), ("z-index", "1")]),
        ],
    );

    // Seven nested levels: `a` sits at level 4, `b7` at level 7.
    assert_eq!(contexts.depth(a), 1.0e9);
    assert_eq!(contexts.depth(b7), 499_499_499.0);
    assert!(contexts.depth(b7) < contexts.depth(a));

    let order = contexts.paint_order();
    assert_eq!(order, vec![NodeId::ROOT, l1, l2, l3, b, b5, b6, b7, a]);
    assert!(
        order
            .windows(2)
            .all(|pair| contexts.depth(pair[0]) <= contexts.depth(pair[1]))
    );
}

#[test]
fn test_other_triggers() {
    let mut tree = DomTree::new(div("root"));
    let faded = tree.append_element(NodeId::ROOT, div("faded"));
    let moved = tree.append_element(NodeId::ROOT, div("moved"));
    let row = tree.append_element(NodeId::ROOT, div("row"));
    let item = tree.append_element(row, div("item"));
    let static_z = tree.append_element(NodeId::ROOT, div("static-z"));

    let contexts = build(
        &tree,
        &[
            ("#faded", &[("opacity", "0.5")]),
            ("#moved", &[("transform", "translateX(4px)")]),
            ("#row", &[("display", "flex")]),
            ("#item", &[("z-index", "3")]),
            ("#static-z", &[("z-index", "3")]),
        ],
    );

    assert_eq!(contexts.get(faded).unwrap().established_by, EstablishedBy::Opacity);
    assert_eq!(contexts.get(moved).unwrap().established_by, EstablishedBy::Transform);
    assert_eq!(contexts.get(item).unwrap().established_by, EstablishedBy::BareZIndex);
    assert_eq!(contexts.get(item).unwrap().z_index, 3);
    assert!(contexts.get(static_z).is_none());
}

#[test]
fn test_hidden_subtrees_are_skipped() {
    let mut tree = DomTree::new(div("root"));
    let hidden = tree.append_element(NodeId::ROOT, div("hidden"));
    let _inside = tree.append_element(hidden, div("inside"));
    let shown = tree.append_element(NodeId::ROOT, div("shown"));

    let contexts = build(
        &tree,
        &[
            ("#hidden", &[("display", "none")]),
            ("#inside", &[("position", "relative"), ("z-index", "1")]),
        ],
    );
    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts.paint_order(), vec![NodeId::ROOT, shown]);
}

#[test]
fn test_remove_drops_nested_contexts() {
    let mut tree = DomTree::new(div("root"));
    let outer = tree.append_element(NodeId::ROOT, div("outer"));
    let inner = tree.append_element(outer, div("inner"));

    let mut contexts = build(
        &tree,
        &[
            ("#outer", &[("position", "relative"), ("z-index", "1")]),
            ("#inner", &[("position", "relative"), ("z-index", "1")]),
        ],
    );
    assert_eq!(contexts.len(), 3);
    contexts.remove(outer);
    assert_eq!(contexts.len(), 1);
    assert!(contexts.get(inner).is_none());
    assert!(contexts.root().unwrap().children.is_empty());
}
