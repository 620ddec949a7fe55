//! Tests for table structure collection and the table sizing algorithm.

use std::collections::HashMap;

use trellis_css::layout::table::SectionKind;
use trellis_css::layout::{LayoutConfig, LengthResolver, TableLayout, TableStructure, layout_table};
use trellis_css::{Axis, DiagnosticKind, RuleSetResolver, Size, StyleProperties, compute_styles};
use trellis_dom::{DomTree, ElementData, ElementKind, NodeId};

fn element(tag: &str) -> ElementData {
    ElementData::new(ElementKind::from_tag(tag))
}

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

fn styles_of(tree: &DomTree) -> HashMap<NodeId, StyleProperties> {
    compute_styles(tree, &RuleSetResolver::new())
}

/// A `<table>` under the root with `rows` rows of `columns` cells each.
fn grid(rows: usize, columns: usize) -> (DomTree, NodeId, Vec<Vec<NodeId>>) {
    let mut tree = DomTree::new(element("div"));
    let table = tree.append_element(NodeId::ROOT, element("table"));
    let body = tree.append_element(table, element("tbody"));
    let mut cells = Vec::new();
    for _ in 0..rows {
        let row = tree.append_element(body, element("tr"));
        cells.push(
            (0..columns)
                .map(|_| tree.append_element(row, element("td")))
                .collect(),
        );
    }
    (tree, table, cells)
}

fn run(
    tree: &DomTree,
    table: NodeId,
    width: Option<f32>,
    height: Option<f32>,
    hints: &HashMap<NodeId, Size>,
) -> TableLayout {
    let styles = styles_of(tree);
    let structure = TableStructure::collect(tree, table, &styles);
    layout_table(
        &structure,
        width,
        height,
        hints,
        &LengthResolver::new(Size::new(800.0, 600.0)),
        &LayoutConfig::default(),
    )
    .unwrap()
}

#[test]
#[allow(clippy::cast_precision_loss)]
fn test_explicit_size_shared_evenly() {
    let (tree, table, cells) = grid(2, 3);
    let layout = run(&tree, table, Some(300.0), Some(100.0), &HashMap::new());

    assert_eq!(layout.column_widths.len(), 3);
    assert_eq!(layout.row_heights.len(), 2);
    for row in &cells {
        for (column, cell) in row.iter().enumerate() {
            let rect = layout.boxes[cell];
            assert!(approx_eq(rect.width, 100.0));
            assert!(approx_eq(rect.height, 50.0));
            assert!(approx_eq(rect.x, 100.0 * column as f32));
        }
    }
    let second_row = tree.parent(cells[1][0]).unwrap();
    assert!(approx_eq(layout.boxes[&second_row].y, 50.0));
    assert!(layout.diagnostics.is_empty());
}

#[test]
fn test_colspan_covers_grid() {
    let mut tree = DomTree::new(element("div"));
    let table = tree.append_element(NodeId::ROOT, element("table"));
    let first = tree.append_element(table, element("tr"));
    let wide = tree.append_element(first, element("td").with_attr("colspan", "2"));
    let _ = tree.append_element(first, element("td"));
    let second = tree.append_element(table, element("tr"));
    for _ in 0..3 {
        let _ = tree.append_element(second, element("td"));
    }

    let layout = run(&tree, table, Some(300.0), Some(100.0), &HashMap::new());
    let rect = layout.boxes[&wide];
    assert!(approx_eq(rect.width, 200.0));
    assert!(approx_eq(rect.height, 50.0));

    // Every grid slot is covered exactly once.
    let styles = styles_of(&tree);
    let structure = TableStructure::collect(&tree, table, &styles);
    let (placed, columns) = trellis_css::layout::table::place_cells(&structure);
    assert_eq!(columns, 3);
    let mut covered = vec![vec![0; columns]; 2];
    for cell in &placed {
        let rows = &mut covered[cell.row..cell.row + cell.rowspan];
        for slot in rows
            .iter_mut()
            .flat_map(|row| row[cell.column..cell.column + cell.colspan].iter_mut())
        {
            *slot += 1;
        }
    }
    assert!(covered.iter().flatten().all(|&count| count == 1));
}

/// Two rows; the first cell spans both.
fn spanning_table() -> (DomTree, NodeId, [NodeId; 3]) {
    let mut tree = DomTree::new(element("div"));
    let table = tree.append_element(NodeId::ROOT, element("table"));
    let first = tree.append_element(table, element("tr"));
    let tall = tree.append_element(first, element("td").with_attr("rowspan", "2"));
    let right_top = tree.append_element(first, element("td"));
    let second = tree.append_element(table, element("tr"));
    let right_bottom = tree.append_element(second, element("td"));
    (tree, table, [tall, right_top, right_bottom])
}

#[test]
fn test_rowspan_cell_covers_its_rows() {
    let (tree, table, [tall, right_top, right_bottom]) = spanning_table();
    let layout = run(&tree, table, Some(200.0), Some(100.0), &HashMap::new());

    assert!(approx_eq(layout.boxes[&tall].height, 100.0));
    assert!(approx_eq(layout.boxes[&right_top].height, 50.0));
    assert!(approx_eq(layout.boxes[&right_bottom].height, 50.0));
    assert!(approx_eq(layout.boxes[&right_bottom].x, 100.0));
}

#[test]
fn test_rowspan_cell_grows_last_row() {
    let (tree, table, [tall, right_top, right_bottom]) = spanning_table();
    let hints = HashMap::from([
        (tall, Size::new(10.0, 90.0)),
        (right_top, Size::new(10.0, 20.0)),
        (right_bottom, Size::new(10.0, 20.0)),
    ]);
    let layout = run(&tree, table, None, None, &hints);

    assert!(approx_eq(layout.row_heights[0], 20.0));
    assert!(approx_eq(layout.row_heights[1], 70.0));
    assert!(approx_eq(layout.boxes[&tall].height, 90.0));
    assert!(approx_eq(layout.boxes[&right_bottom].height, 70.0));
    assert!(approx_eq(layout.content_size.height, 90.0));
}

#[test]
fn test_bare_rows_form_anonymous_body() {
    let mut tree = DomTree::new(element("div"));
    let table = tree.append_element(NodeId::ROOT, element("table"));
    let row = tree.append_element(table, element("tr"));
    let _ = tree.append_element(row, element("td"));

    let structure = TableStructure::collect(&tree, table, &styles_of(&tree));
    assert_eq!(structure.sections.len(), 1);
    assert_eq!(structure.sections[0].node, None);
    assert_eq!(structure.sections[0].kind, SectionKind::Body);
}

#[test]
fn test_header_and_footer_groups_are_reordered() {
    let mut tree = DomTree::new(element("div"));
    let table = tree.append_element(NodeId::ROOT, element("table"));
    let foot = tree.append_element(table, element("tfoot"));
    let body = tree.append_element(table, element("tbody"));
    let head = tree.append_element(table, element("thead"));
    let mut rows = Vec::new();
    for group in [foot, body, head] {
        let row = tree.append_element(group, element("tr"));
        let _ = tree.append_element(row, element("td"));
        rows.push(row);
    }

    let structure = TableStructure::collect(&tree, table, &styles_of(&tree));
    let kinds: Vec<SectionKind> = structure.sections.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![SectionKind::Header, SectionKind::Body, SectionKind::Footer]
    );

    let layout = run(&tree, table, Some(90.0), Some(90.0), &HashMap::new());
    assert!(approx_eq(layout.boxes[&head].y, 0.0));
    assert!(approx_eq(layout.boxes[&body].y, 30.0));
    assert!(approx_eq(layout.boxes[&foot].y, 60.0));
    // Rows in a group are positioned against the group.
    assert!(approx_eq(layout.boxes[&rows[0]].y, 0.0));
}

#[test]
fn test_caption_sits_above_or_below() {
    let mut tree = DomTree::new(element("div"));
    let table = tree.append_element(NodeId::ROOT, element("table"));
    let caption = tree.append_element(table, element("caption"));
    let row = tree.append_element(table, element("tr"));
    let _ = tree.append_element(row, element("td"));

    let hints = HashMap::from([(caption, Size::new(50.0, 20.0))]);
    let layout = run(&tree, table, Some(100.0), Some(40.0), &hints);
    let rect = layout.boxes[&caption];
    assert!(approx_eq(rect.y, -20.0));
    assert!(approx_eq(rect.width, 100.0));

    let mut resolver = RuleSetResolver::new();
    resolver
        .add_rule_text("table", [("caption-side", "bottom")])
        .unwrap();
    let styles = compute_styles(&tree, &resolver);
    let structure = TableStructure::collect(&tree, table, &styles);
    let layout = layout_table(
        &structure,
        Some(100.0),
        Some(40.0),
        &hints,
        &LengthResolver::new(Size::new(800.0, 600.0)),
        &LayoutConfig::default(),
    )
    .unwrap();
    assert!(approx_eq(layout.boxes[&caption].y, 40.0));
}

#[test]
fn test_content_based_sizing() {
    let (tree, table, cells) = grid(2, 2);
    let hints = HashMap::from([
        (cells[0][0], Size::new(40.0, 10.0)),
        (cells[0][1], Size::new(60.0, 25.0)),
        (cells[1][0], Size::new(70.0, 15.0)),
        (cells[1][1], Size::new(20.0, 5.0)),
    ]);
    let layout = run(&tree, table, None, None, &hints);

    assert!(approx_eq(layout.column_widths[0], 70.0));
    assert!(approx_eq(layout.column_widths[1], 60.0));
    assert!(approx_eq(layout.row_heights[0], 25.0));
    assert!(approx_eq(layout.row_heights[1], 15.0));
    assert!(approx_eq(layout.content_size.width, 130.0));
    assert!(approx_eq(layout.content_size.height, 40.0));
    assert!(layout.diagnostics.is_empty());
}

#[test]
fn test_missing_hints_fall_back_and_report() {
    let (tree, table, cells) = grid(1, 2);
    let layout = run(&tree, table, None, None, &HashMap::new());
    let config = LayoutConfig::default();

    assert!(approx_eq(layout.column_widths[0], config.default_leaf_width));
    assert!(approx_eq(layout.row_heights[0], config.default_leaf_height));
    let reported: Vec<NodeId> = layout
        .diagnostics
        .iter()
        .filter(|d| d.is_sizing_fallback())
        .map(|d| d.node)
        .collect();
    assert_eq!(reported, cells[0]);
}

#[test]
fn test_declared_columns_and_overflow() {
    let mut tree = DomTree::new(element("div"));
    let table = tree.append_element(NodeId::ROOT, element("table"));
    let group = tree.append_element(table, element("colgroup"));
    let _ = tree.append_element(group, element("col").with_attr("width", "80"));
    let row = tree.append_element(table, element("tr"));
    let _ = tree.append_element(row, element("td"));
    let _ = tree.append_element(row, element("td"));
    let _ = tree.append_element(row, element("td"));

    let layout = run(&tree, table, Some(200.0), Some(30.0), &HashMap::new());
    assert!(approx_eq(layout.column_widths[0], 80.0));
    assert!(approx_eq(layout.column_widths[1], 60.0));
    assert!(approx_eq(layout.column_widths[2], 60.0));

    let layout = run(&tree, table, Some(50.0), Some(30.0), &HashMap::new());
    let overflow = layout
        .diagnostics
        .iter()
        .find(|d| d.node == table)
        .unwrap();
    assert_eq!(
        overflow.kind,
        DiagnosticKind::Overflow {
            axis: Axis::Horizontal,
            amount: 30.0
        }
    );
}

#[test]
fn test_out_of_flow_children_are_not_cells() {
    let mut resolver = RuleSetResolver::new();
    resolver
        .add_rule_text(".floating", [("position", "absolute")])
        .unwrap();
    let mut tree = DomTree::new(element("div"));
    let table = tree.append_element(NodeId::ROOT, element("table"));
    let row = tree.append_element(table, element("tr"));
    let _ = tree.append_element(row, element("td"));
    let floating = tree.append_element(row, element("td").with_class("floating"));

    let styles = compute_styles(&tree, &resolver);
    let structure = TableStructure::collect(&tree, table, &styles);
    assert_eq!(structure.cells().count(), 1);
    assert_eq!(structure.positioned, vec![floating]);
}
