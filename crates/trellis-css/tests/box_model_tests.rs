//! Tests for per-element box resolution.

use trellis_css::layout::{BoxDimensions, EdgeSizes, LengthResolver, Rect, resolve_box};
use trellis_css::{LayoutError, Size, StyleProperties};

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

#[test]
fn test_edges_nest_outward() {
    let dims = BoxDimensions {
        content: Rect::new(20.0, 20.0, 100.0, 50.0),
        padding: EdgeSizes::uniform(5.0),
        border: EdgeSizes::uniform(2.0),
        margin: EdgeSizes::uniform(3.0),
    };
    assert_eq!(dims.padding_box(), Rect::new(15.0, 15.0, 110.0, 60.0));
    assert_eq!(dims.border_box(), Rect::new(13.0, 13.0, 114.0, 64.0));
    assert_eq!(dims.margin_box(), Rect::new(10.0, 10.0, 120.0, 70.0));
    assert!(approx_eq(dims.extra_width(), 20.0));
}

#[test]
fn test_percent_size_and_centering() {
    let s = style(&[
        ("width", "50%"),
        ("height", "20%"),
        ("padding", "10px"),
        ("margin", "5px"),
        ("border-width", "2px"),
    ]);
    let resolved = resolve_box(&s, Some(Size::new(400.0, 300.0)), &resolver()).unwrap();
    let dims = resolved.dimensions;

    assert!(approx_eq(dims.content.width, 200.0));
    assert!(approx_eq(dims.content.height, 60.0));
    // Margin box is 234 wide: centred at (400 - 234) / 2.
    assert!(approx_eq(dims.margin_box().x, 83.0));
    assert!(approx_eq(dims.content.x, 100.0));
    assert!(!resolved.auto_width);
    assert!(!resolved.explicit_x);
}

#[test]
fn test_auto_takes_remaining_space() {
    let s = style(&[("padding", "10px"), ("border-width", "2px"), ("margin", "5px")]);
    let resolved = resolve_box(&s, Some(Size::new(400.0, 300.0)), &resolver()).unwrap();
    assert!(resolved.auto_width);
    assert!(resolved.auto_height);
    assert!(approx_eq(resolved.dimensions.content.width, 366.0));
    assert!(approx_eq(resolved.dimensions.content.height, 266.0));
    assert!(approx_eq(resolved.dimensions.margin_box().x, 0.0));
}

#[test]
fn test_sizes_clamp_at_zero() {
    let s = style(&[("padding", "300px")]);
    let resolved = resolve_box(&s, Some(Size::new(400.0, 300.0)), &resolver()).unwrap();
    assert_eq!(resolved.dimensions.content.width, 0.0);
    assert_eq!(resolved.dimensions.content.height, 0.0);

    let s = style(&[("width", "-20px")]);
    let resolved = resolve_box(&s, Some(Size::new(400.0, 300.0)), &resolver()).unwrap();
    assert_eq!(resolved.dimensions.content.width, 0.0);
}

#[test]
fn test_percent_edges_use_parent_width() {
    let s = style(&[("padding", "10%"), ("width", "10px"), ("height", "10px")]);
    let resolved = resolve_box(&s, Some(Size::new(400.0, 100.0)), &resolver()).unwrap();
    assert!(approx_eq(resolved.dimensions.padding.top, 40.0));
    assert!(approx_eq(resolved.dimensions.padding.left, 40.0));
}

#[test]
fn test_explicit_offsets_for_static_boxes() {
    let s = style(&[("width", "10px"), ("height", "10px"), ("left", "7px"), ("top", "25%")]);
    let resolved = resolve_box(&s, Some(Size::new(400.0, 100.0)), &resolver()).unwrap();
    assert!(resolved.explicit_x);
    assert!(resolved.explicit_y);
    assert!(approx_eq(resolved.dimensions.content.x, 7.0));
    assert!(approx_eq(resolved.dimensions.content.y, 25.0));

    // Offsets of positioned boxes belong to the positioning resolver.
    let s = style(&[("position", "relative"), ("width", "10px"), ("left", "7px")]);
    let resolved = resolve_box(&s, Some(Size::new(400.0, 100.0)), &resolver()).unwrap();
    assert!(!resolved.explicit_x);
    assert!(approx_eq(resolved.dimensions.content.x, 195.0));
}

#[test]
fn test_percent_without_parent_fails() {
    let s = style(&[("width", "50%")]);
    let err = resolve_box(&s, None, &resolver()).unwrap_err();
    assert!(matches!(err, LayoutError::UnresolvablePercentage { property: "width", .. }));

    let s = style(&[("width", "10vw"), ("height", "5em")]);
    let resolved = resolve_box(&s, None, &resolver()).unwrap();
    assert!(approx_eq(resolved.dimensions.content.width, 80.0));
    assert!(approx_eq(resolved.dimensions.content.height, 80.0));
}
