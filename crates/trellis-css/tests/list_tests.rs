//! Tests for list packing.

use trellis_css::layout::{EdgeSizes, LayoutConfig, ListChild, layout_list_items};
use trellis_css::{
    Axis, DiagnosticKind, LayoutEngine, RuleSetResolver, Size, StyleProperties, Viewport,
};
use trellis_dom::{DomTree, ElementData, ElementKind, NodeId};

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

fn plain_items(count: usize) -> Vec<ListChild> {
    (0..count)
        .map(|i| ListChild {
            node: NodeId(i + 2),
            padding: EdgeSizes::default(),
            border: EdgeSizes::default(),
        })
        .collect()
}

#[test]
fn test_items_share_height() {
    let config = LayoutConfig::default();
    let layout = layout_list_items(
        NodeId(1),
        &plain_items(3),
        Size::new(200.0, 100.0),
        4.0,
        20.0,
        &config,
    );

    // (100 - 8) / 3 = 30.67, floored.
    assert!(approx_eq(layout.item_height, 30.0));
    let ys: Vec<f32> = layout.items.iter().map(|d| d.margin_box().y).collect();
    assert_eq!(ys, vec![0.0, 34.0, 68.0]);
    for item in &layout.items {
        assert!(approx_eq(item.content.x, 20.0));
        assert!(approx_eq(item.content.width, 180.0));
        assert!(approx_eq(item.border_box().width, 200.0));
    }
    assert!(approx_eq(layout.used_height, 98.0));
    assert!(layout.overflow.is_none());
}

#[test]
fn test_item_edges_are_kept_inside_the_slot() {
    let config = LayoutConfig::default();
    let items = [ListChild {
        node: NodeId(2),
        padding: EdgeSizes::uniform(5.0),
        border: EdgeSizes::uniform(1.0),
    }];
    let layout = layout_list_items(NodeId(1), &items, Size::new(100.0, 50.0), 4.0, 20.0, &config);
    let item = layout.items[0];
    assert!(approx_eq(item.padding.left, 25.0));
    assert!(approx_eq(item.content.x, 26.0));
    assert!(approx_eq(item.content.width, 68.0));
    assert!(approx_eq(item.content.height, 38.0));
}

#[test]
fn test_minimum_height_overflows() {
    let config = LayoutConfig::default();
    let layout = layout_list_items(
        NodeId(1),
        &plain_items(20),
        Size::new(100.0, 100.0),
        4.0,
        20.0,
        &config,
    );

    assert!(approx_eq(layout.item_height, 10.0));
    assert!(approx_eq(layout.used_height, 276.0));
    let overflow = layout.overflow.unwrap();
    assert_eq!(overflow.node, NodeId(1));
    assert_eq!(
        overflow.kind,
        DiagnosticKind::Overflow {
            axis: Axis::Vertical,
            amount: 176.0
        }
    );
}

#[test]
fn test_empty_list() {
    let layout = layout_list_items(
        NodeId(1),
        &[],
        Size::new(100.0, 100.0),
        4.0,
        20.0,
        &LayoutConfig::default(),
    );
    assert!(layout.items.is_empty());
    assert_eq!(layout.used_height, 0.0);
    assert!(layout.overflow.is_none());
}

#[test]
fn test_list_in_document() {
    let mut tree = DomTree::new(ElementData::new(ElementKind::Div));
    let list = tree.append_element(NodeId::ROOT, ElementData::new(ElementKind::Ol).with_id("steps"));
    let items: Vec<NodeId> = (0..2)
        .map(|_| tree.append_element(list, ElementData::new(ElementKind::Li)))
        .collect();

    let mut resolver = RuleSetResolver::new();
    resolver
        .add_rule_text("#steps", [("width", "300px"), ("height", "64px")])
        .unwrap();
    let mut inline = StyleProperties::default();
    inline.set("list-style-type", "upper-roman").unwrap();
    resolver.set_inline(items[1], inline);

    let mut engine = LayoutEngine::new();
    let output = engine
        .layout(&tree, &resolver, &Viewport::new(800.0, 600.0))
        .unwrap();

    let first = output.root.find(items[0]).unwrap();
    let second = output.root.find(items[1]).unwrap();
    assert_eq!(first.marker.as_deref(), Some("1."));
    assert_eq!(second.marker.as_deref(), Some("II."));
    // (64 - 4) / 2 = 30.
    assert!(approx_eq(first.dimensions.content.height, 30.0));
    assert!(approx_eq(second.dimensions.margin_box().y, 34.0));
    assert!(approx_eq(first.dimensions.content.x, 20.0));
    assert!(output.diagnostics.iter().all(|d| !d.is_overflow()));
}
