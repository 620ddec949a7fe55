//! Tests for relative, absolute and fixed positioning.

use trellis_css::layout::{
    BoxOffsets, ContainingBlock, ContainingBlockCache, LengthResolver, PositionedLayout,
};
use trellis_css::{
    BoxDimensions, LayoutEngine, Rect, RuleSetResolver, Size, StyleProperties, Viewport,
    ViewportTransform, compute_styles,
};
use trellis_dom::{DomTree, ElementData, ElementKind, NodeId};

fn style(declarations: &[(&str, &str)]) -> StyleProperties {
    let mut props = StyleProperties::default();
    for (name, value) in declarations {
        props.set(name, value).unwrap();
    }
    props
}

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

fn resolver() -> LengthResolver {
    LengthResolver::new(Size::new(800.0, 600.0))
}

fn div(id: &str) -> ElementData {
    ElementData::new(ElementKind::Div).with_id(id)
}

const BLOCK: Rect = Rect::new(100.0, 100.0, 400.0, 300.0);

#[test]
fn test_relative_shift_prefers_left_and_top() {
    let mut dims = BoxDimensions {
        content: Rect::new(50.0, 50.0, 10.0, 10.0),
        ..BoxDimensions::default()
    };
    let offsets = BoxOffsets {
        top: None,
        right: Some(99.0),
        bottom: Some(5.0),
        left: Some(10.0),
    };
    PositionedLayout::layout_relative(&mut dims, &offsets);
    assert!(approx_eq(dims.content.x, 60.0));
    assert!(approx_eq(dims.content.y, 45.0));
}

#[test]
fn test_offsets_resolve_against_reference() {
    let s = style(&[("left", "10%"), ("top", "50%"), ("right", "auto")]);
    let offsets = BoxOffsets::resolve(&s, Size::new(400.0, 300.0), &resolver()).unwrap();
    assert_eq!(offsets.left, Some(40.0));
    assert_eq!(offsets.top, Some(150.0));
    assert_eq!(offsets.right, None);
    assert_eq!(offsets.bottom, None);
}

#[test]
fn test_absolute_pinned_to_start() {
    let s = style(&[("left", "10px"), ("top", "20px"), ("width", "50px"), ("height", "40px")]);
    let dims =
        PositionedLayout::layout_absolute(&s, BLOCK, (0.0, 0.0), Size::default(), &resolver())
            .unwrap();
    assert_eq!(dims.content, Rect::new(110.0, 120.0, 50.0, 40.0));
}

#[test]
fn test_absolute_over_constrained_ignores_right() {
    let s = style(&[("left", "10px"), ("right", "10px"), ("width", "50px")]);
    let dims =
        PositionedLayout::layout_absolute(&s, BLOCK, (0.0, 0.0), Size::new(0.0, 30.0), &resolver())
            .unwrap();
    assert!(approx_eq(dims.content.x, 110.0));
    assert!(approx_eq(dims.content.width, 50.0));
    assert!(approx_eq(dims.content.height, 30.0));
}

#[test]
fn test_absolute_stretches_between_offsets() {
    let s = style(&[
        ("left", "10px"),
        ("right", "20px"),
        ("top", "0"),
        ("bottom", "0"),
        ("padding", "5px"),
    ]);
    let dims =
        PositionedLayout::layout_absolute(&s, BLOCK, (0.0, 0.0), Size::default(), &resolver())
            .unwrap();
    assert!(approx_eq(dims.content.width, 360.0));
    assert!(approx_eq(dims.content.height, 290.0));
    assert!(approx_eq(dims.border_box().x, 110.0));
}

#[test]
fn test_absolute_pinned_to_end() {
    let s = style(&[("right", "30px"), ("bottom", "10%"), ("width", "50px"), ("height", "20px")]);
    let dims =
        PositionedLayout::layout_absolute(&s, BLOCK, (0.0, 0.0), Size::default(), &resolver())
            .unwrap();
    assert!(approx_eq(dims.content.x, 420.0));
    assert!(approx_eq(dims.content.y, 350.0));
}

#[test]
fn test_absolute_without_offsets_keeps_static_position() {
    let s = style(&[("width", "50px"), ("height", "20px")]);
    let dims =
        PositionedLayout::layout_absolute(&s, BLOCK, (130.0, 140.0), Size::default(), &resolver())
            .unwrap();
    assert!(approx_eq(dims.content.x, 130.0));
    assert!(approx_eq(dims.content.y, 140.0));
}

#[test]
fn test_fixed_goes_through_viewport_transform() {
    let viewport = Viewport {
        width: 400.0,
        height: 300.0,
        transform: ViewportTransform {
            scroll_x: 100.0,
            scroll_y: 50.0,
            scale: 2.0,
        },
    };
    let s = style(&[
        ("left", "10px"),
        ("top", "10px"),
        ("width", "20px"),
        ("height", "20px"),
        ("border-width", "1px"),
    ]);
    let dims =
        PositionedLayout::layout_fixed(&s, &viewport, (0.0, 0.0), Size::default(), &resolver())
            .unwrap();
    assert_eq!(dims.content, Rect::new(122.0, 72.0, 40.0, 40.0));
    assert!(approx_eq(dims.border.left, 2.0));
}

#[test]
fn test_containing_block_chain_and_cache() {
    let mut tree = DomTree::new(div("root"));
    let outer = tree.append_element(NodeId::ROOT, div("outer"));
    let middle = tree.append_element(outer, div("middle"));
    let inner = tree.append_element(middle, div("inner"));

    let mut rules = RuleSetResolver::new();
    rules
        .add_rule_text("#outer", [("position", "relative")])
        .unwrap();
    rules
        .add_rule_text("#inner", [("position", "absolute")])
        .unwrap();
    let styles = compute_styles(&tree, &rules);

    assert_eq!(
        ContainingBlockCache::chain(&tree, inner, &styles),
        vec![Some(outer), None]
    );

    let mut cache = ContainingBlockCache::new();
    cache.insert(
        inner,
        ContainingBlock {
            node: Some(outer),
            rect: BLOCK,
        },
    );
    assert_eq!(cache.len(), 1);
    cache.invalidate(outer);
    assert!(cache.is_empty());
}

#[test]
fn test_absolute_in_document() {
    let mut tree = DomTree::new(div("root"));
    let card = tree.append_element(NodeId::ROOT, div("card"));
    let badge = tree.append_element(card, div("badge"));
    let lost = tree.append_element(NodeId::ROOT, div("lost"));

    let mut rules = RuleSetResolver::new();
    rules
        .add_rule_text(
            "#card",
            [("position", "relative"), ("width", "200px"), ("height", "100px")],
        )
        .unwrap();
    rules
        .add_rule_text(
            "#badge",
            [
                ("position", "absolute"),
                ("left", "10px"),
                ("top", "20px"),
                ("width", "50px"),
                ("height", "30px"),
            ],
        )
        .unwrap();
    rules
        .add_rule_text(
            "#lost",
            [
                ("position", "absolute"),
                ("right", "0"),
                ("bottom", "0"),
                ("width", "10px"),
                ("height", "10px"),
            ],
        )
        .unwrap();

    let mut engine = LayoutEngine::new();
    let output = engine
        .layout(&tree, &rules, &Viewport::new(800.0, 600.0))
        .unwrap();

    // The card is centred in the root.
    let badge_box = output.root.find(badge).unwrap();
    assert!(approx_eq(badge_box.absolute.x, 310.0));
    assert!(approx_eq(badge_box.absolute.y, 20.0));
    assert_eq!(engine.containing_block(badge).unwrap().node, Some(card));

    // Nothing positioned above: the viewport.
    let lost_box = output.root.find(lost).unwrap();
    assert!(engine.containing_block(lost).unwrap().is_viewport());
    assert!(approx_eq(lost_box.absolute.x, 790.0));
    assert!(approx_eq(lost_box.absolute.y, 590.0));
}
