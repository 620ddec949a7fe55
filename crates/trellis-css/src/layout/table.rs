//! CSS Table Layout.
//!
//! [§ 17 Tables](https://www.w3.org/TR/CSS2/tables.html)
//!
//! Supported:
//! - captions (`caption-side: top | bottom`)
//! - `<col>`/`<colgroup>` column definitions with `span` and declared widths
//! - `<thead>`, `<tbody>`, `<tfoot>` row groups and rows directly in the table
//! - `colspan` and `rowspan` on a slot-occupancy grid
//! - explicit table sizes divided across columns and rows, content-based
//!   sizing otherwise
//!
//! Not implemented: `border-spacing`, `border-collapse`, `table-layout:
//! fixed`, `vertical-align` within cells.
//!
//! The engine works on a [`TableStructure`] collected from the tree and
//! returns border-box rectangles. Each rectangle is relative to the content
//! origin of the element's parent in the table: cells to their row, rows to
//! their row group (or the table for bare rows), everything else to the
//! table.

use std::collections::HashMap;

use log::trace;
use trellis_dom::{DomTree, ElementData, NodeId};

use crate::error::{Axis, Diagnostic, DiagnosticKind, LayoutError};
use crate::style::{AutoLength, CaptionSide, Display, LengthValue, StyleProperties};

use super::box_model::{Rect, Size};
use super::config::LayoutConfig;
use super::values::LengthResolver;

/// [§ 17.2 The CSS table model](https://www.w3.org/TR/CSS2/tables.html#table-display)
///
/// "A row group element groups one or more rows." Header groups are placed
/// first and footer groups last, whatever their document position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// `table-header-group`
    Header,
    /// `table-row-group`, or rows placed directly in the table.
    Body,
    /// `table-footer-group`
    Footer,
}

/// A group of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSection {
    /// The row group element, `None` for rows placed directly in the table.
    pub node: Option<NodeId>,
    /// Placement class of the group.
    pub kind: SectionKind,
    /// Rows in document order.
    pub rows: Vec<TableRow>,
}

/// One row and its cells.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// The row element.
    pub node: NodeId,
    /// Cells in document order.
    pub cells: Vec<TableCell>,
}

/// One cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableCell {
    /// The cell element.
    pub node: NodeId,
    /// Number of columns spanned, at least 1.
    pub colspan: usize,
    /// Number of rows spanned, at least 1.
    pub rowspan: usize,
}

/// A `<col>` or `<colgroup>` element and the columns it covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnElement {
    /// The column element.
    pub node: NodeId,
    /// The enclosing column group, if any.
    pub group: Option<NodeId>,
    /// First column covered.
    pub first: usize,
    /// Number of columns covered.
    pub span: usize,
}

/// The structure of a table as the layout engine sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStructure {
    /// The table element.
    pub table: NodeId,
    /// The first caption child.
    pub caption: Option<NodeId>,
    /// Where the caption goes.
    pub caption_side: CaptionSide,
    /// Declared width of each defined column, `None` when undeclared.
    pub column_widths: Vec<Option<LengthValue>>,
    /// Column elements.
    pub column_elements: Vec<ColumnElement>,
    /// Row groups in placement order.
    pub sections: Vec<TableSection>,
    /// Children that take no part in the table grid.
    pub others: Vec<NodeId>,
    /// Absolute and fixed descendants skipped while collecting.
    pub positioned: Vec<NodeId>,
}

impl TableStructure {
    /// [§ 17.2.1 Anonymous table objects](https://www.w3.org/TR/CSS2/tables.html#anonymous-boxes)
    ///
    /// Classify the children of `table` by their `display`. Consecutive rows
    /// placed directly in the table form an anonymous body group. Any
    /// displayed child of a row counts as a cell.
    #[must_use]
    #[allow(clippy::implicit_hasher)]
    pub fn collect(
        tree: &DomTree,
        table: NodeId,
        styles: &HashMap<NodeId, StyleProperties>,
    ) -> Self {
        let display_of =
            |node: NodeId| styles.get(&node).map_or(Display::Block, StyleProperties::display);
        let out_of_flow = |node: NodeId| {
            styles
                .get(&node)
                .is_some_and(|s| s.display() != Display::None && s.position().is_out_of_flow())
        };
        let span_of = |node: NodeId, f: fn(&ElementData) -> u32| {
            tree.element(node).map_or(1, |data| f(data).max(1) as usize)
        };

        let mut structure = Self {
            table,
            caption: None,
            caption_side: styles
                .get(&table)
                .map(StyleProperties::caption_side)
                .unwrap_or_default(),
            column_widths: Vec::new(),
            column_elements: Vec::new(),
            sections: Vec::new(),
            others: Vec::new(),
            positioned: Vec::new(),
        };
        let mut headers = Vec::new();
        let mut bodies = Vec::new();
        let mut footers = Vec::new();
        let mut bare_rows: Vec<TableRow> = Vec::new();

        let collect_row = |row: NodeId| TableRow {
            node: row,
            cells: tree
                .children(row)
                .iter()
                .copied()
                .filter(|cell| display_of(*cell) != Display::None && !out_of_flow(*cell))
                .map(|cell| TableCell {
                    node: cell,
                    colspan: span_of(cell, ElementData::colspan),
                    rowspan: span_of(cell, ElementData::rowspan),
                })
                .collect(),
        };

        for &child in tree.children(table) {
            if out_of_flow(child) {
                structure.positioned.push(child);
                continue;
            }
            let display = display_of(child);
            if display != Display::TableRow && !bare_rows.is_empty() {
                bodies.push(TableSection {
                    node: None,
                    kind: SectionKind::Body,
                    rows: std::mem::take(&mut bare_rows),
                });
            }
            match display {
                Display::None => {}
                Display::TableCaption if structure.caption.is_none() => {
                    structure.caption = Some(child);
                }
                Display::TableColumnGroup => {
                    let mut cols = Vec::new();
                    for &col in tree.children(child) {
                        match display_of(col) {
                            Display::None => {}
                            Display::TableColumn => cols.push(col),
                            _ if out_of_flow(col) => structure.positioned.push(col),
                            _ => structure.others.push(col),
                        }
                    }
                    let first = structure.column_widths.len();
                    if cols.is_empty() {
                        let span = span_of(child, ElementData::span);
                        let width = column_width(tree, styles, child);
                        structure.column_widths.extend(std::iter::repeat_n(width, span));
                    } else {
                        for col in cols {
                            structure.push_column(tree, styles, col, Some(child));
                        }
                    }
                    let span = structure.column_widths.len() - first;
                    structure.column_elements.push(ColumnElement {
                        node: child,
                        group: None,
                        first,
                        span,
                    });
                }
                Display::TableColumn => structure.push_column(tree, styles, child, None),
                Display::TableHeaderGroup | Display::TableRowGroup | Display::TableFooterGroup => {
                    let mut rows = Vec::new();
                    for &row in tree.children(child) {
                        if out_of_flow(row) {
                            structure.positioned.push(row);
                            continue;
                        }
                        match display_of(row) {
                            Display::TableRow => rows.push(collect_row(row)),
                            Display::None => {}
                            _ => structure.others.push(row),
                        }
                    }
                    let (kind, list) = match display {
                        Display::TableHeaderGroup => (SectionKind::Header, &mut headers),
                        Display::TableFooterGroup => (SectionKind::Footer, &mut footers),
                        _ => (SectionKind::Body, &mut bodies),
                    };
                    list.push(TableSection {
                        node: Some(child),
                        kind,
                        rows,
                    });
                }
                Display::TableRow => bare_rows.push(collect_row(child)),
                _ => structure.others.push(child),
            }
        }
        if !bare_rows.is_empty() {
            bodies.push(TableSection {
                node: None,
                kind: SectionKind::Body,
                rows: bare_rows,
            });
        }

        structure.sections.extend(headers);
        structure.sections.extend(bodies);
        structure.sections.extend(footers);

        let rows: Vec<NodeId> = structure.rows().map(|row| row.node).collect();
        for row in rows {
            structure
                .positioned
                .extend(tree.children(row).iter().copied().filter(|&cell| out_of_flow(cell)));
        }
        structure
    }

    fn push_column(
        &mut self,
        tree: &DomTree,
        styles: &HashMap<NodeId, StyleProperties>,
        col: NodeId,
        group: Option<NodeId>,
    ) {
        let span = tree.element(col).map_or(1, |data| data.span().max(1) as usize);
        let width = column_width(tree, styles, col);
        self.column_elements.push(ColumnElement {
            node: col,
            group,
            first: self.column_widths.len(),
            span,
        });
        self.column_widths.extend(std::iter::repeat_n(width, span));
    }

    /// Rows of every section, in placement order.
    pub fn rows(&self) -> impl Iterator<Item = &TableRow> {
        self.sections.iter().flat_map(|section| section.rows.iter())
    }

    /// Every cell of the table.
    pub fn cells(&self) -> impl Iterator<Item = &TableCell> {
        self.rows().flat_map(|row| row.cells.iter())
    }
}

/// Declared width of a column element: the `width` style, else the
/// `width` attribute.
fn column_width(
    tree: &DomTree,
    styles: &HashMap<NodeId, StyleProperties>,
    col: NodeId,
) -> Option<LengthValue> {
    match styles.get(&col).and_then(|s| s.width) {
        Some(AutoLength::Length(len)) => Some(len),
        _ => tree
            .element(col)
            .and_then(ElementData::col_width)
            .map(LengthValue::Px),
    }
}

/// A cell placed on the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedCell {
    /// The cell element.
    pub node: NodeId,
    /// Row index across the whole table.
    pub row: usize,
    /// First column.
    pub column: usize,
    /// Columns spanned.
    pub colspan: usize,
    /// Rows spanned, clamped to the rows that exist.
    pub rowspan: usize,
}

/// [§ 17.5 Visual layout of table contents](https://www.w3.org/TR/CSS2/tables.html#table-layout)
///
/// "Each cell is thus a rectangular box, one or more grid cells wide and
/// high."
///
/// Walks rows in placement order; each cell takes the first column not
/// already occupied by a `rowspan` from an earlier row. Returns the placed
/// cells and the number of columns the grid needs.
#[must_use]
pub fn place_cells(structure: &TableStructure) -> (Vec<PlacedCell>, usize) {
    let rows: Vec<&TableRow> = structure.rows().collect();
    let total_rows = rows.len();
    let mut occupied: Vec<Vec<bool>> = vec![Vec::new(); total_rows];
    let mut placed = Vec::new();
    let mut columns = structure.column_widths.len();

    for (row_index, row) in rows.iter().enumerate() {
        let mut column = 0_usize;
        for cell in &row.cells {
            while occupied[row_index].get(column).copied().unwrap_or(false) {
                column += 1;
            }
            let rowspan = cell.rowspan.clamp(1, total_rows - row_index);
            let colspan = cell.colspan.max(1);
            for slots in &mut occupied[row_index..row_index + rowspan] {
                if slots.len() < column + colspan {
                    slots.resize(column + colspan, false);
                }
                for slot in &mut slots[column..column + colspan] {
                    *slot = true;
                }
            }
            placed.push(PlacedCell {
                node: cell.node,
                row: row_index,
                column,
                colspan,
                rowspan,
            });
            column += colspan;
            columns = columns.max(column);
        }
    }
    (placed, columns)
}

/// Result of [`layout_table`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    /// Used width of every column.
    pub column_widths: Vec<f32>,
    /// Used height of every row, in placement order.
    pub row_heights: Vec<f32>,
    /// Border-box rectangle of every table part.
    pub boxes: HashMap<NodeId, Rect>,
    /// Used content size of the table. The caption sits outside it.
    pub content_size: Size,
    /// Recovered conditions found while sizing.
    pub diagnostics: Vec<Diagnostic>,
}

/// Main entry point for table layout.
///
/// [§ 17.5.2 Table width algorithms](https://www.w3.org/TR/CSS2/tables.html#width-layout)
///
/// - `width`/`height` are the table's content size when explicit. An
///   explicit width is shared evenly by the columns without a declared
///   width; an explicit height is shared evenly by the rows.
/// - Otherwise each column is as wide as its widest single-column cell and
///   each row as tall as its tallest single-row cell, from `hints` (border
///   box sizes of cells with declared content). Cells without a hint use
///   the configured default leaf size and are reported.
/// - A cell is as wide as its spanned columns and as tall as its spanned
///   rows.
///
/// # Errors
///
/// A percentage column width with no table width.
#[allow(clippy::cast_precision_loss, clippy::implicit_hasher)]
pub fn layout_table(
    structure: &TableStructure,
    width: Option<f32>,
    height: Option<f32>,
    hints: &HashMap<NodeId, Size>,
    resolver: &LengthResolver,
    config: &LayoutConfig,
) -> Result<TableLayout, LayoutError> {
    let table = structure.table;
    let mut diagnostics = Vec::new();

    // STEP 1: Grid.
    let (cells, column_count) = place_cells(structure);
    let row_count: usize = structure.sections.iter().map(|s| s.rows.len()).sum();
    let mut fallback_reported: Vec<NodeId> = Vec::new();
    let mut hint_or_default = |node: NodeId, diagnostics: &mut Vec<Diagnostic>| -> Size {
        hints.get(&node).copied().unwrap_or_else(|| {
            if !fallback_reported.contains(&node) {
                fallback_reported.push(node);
                diagnostics.push(Diagnostic {
                    node,
                    kind: DiagnosticKind::ContentSizingFallback {
                        width: config.default_leaf_width,
                        height: config.default_leaf_height,
                    },
                });
            }
            Size::new(config.default_leaf_width, config.default_leaf_height)
        })
    };

    // STEP 2: Column widths.
    //
    // [§ 17.5.2.1 Fixed table layout](https://www.w3.org/TR/CSS2/tables.html#fixed-table-layout)
    //
    // "A column element with a value other than 'auto' for the 'width'
    // property sets the width for that column."
    let declared: Vec<Option<f32>> = (0..column_count)
        .map(|index| {
            let value = structure.column_widths.get(index).copied().flatten();
            Ok(value
                .map(|len| resolver.length("width", len, width))
                .transpose()?
                .map(|w| w.max(0.0)))
        })
        .collect::<Result<_, LayoutError>>()?;

    let mut column_widths: Vec<f32> = match width {
        Some(table_width) => {
            let fixed: f32 = declared.iter().flatten().sum();
            let free_columns = declared.iter().filter(|d| d.is_none()).count();
            let remaining = table_width - fixed;
            if remaining < 0.0 {
                diagnostics.push(Diagnostic {
                    node: table,
                    kind: DiagnosticKind::Overflow {
                        axis: Axis::Horizontal,
                        amount: -remaining,
                    },
                });
            }
            if free_columns > 0 {
                let share = (remaining / free_columns as f32).max(0.0);
                declared.iter().map(|d| d.unwrap_or(share)).collect()
            } else if remaining > 0.0 && column_count > 0 {
                let extra = remaining / column_count as f32;
                declared.iter().map(|d| d.unwrap_or(0.0) + extra).collect()
            } else {
                declared.iter().map(|d| d.unwrap_or(0.0)).collect()
            }
        }
        None => {
            // [§ 17.5.2.2 Automatic table layout](https://www.w3.org/TR/CSS2/tables.html#auto-table-layout)
            //
            // "Calculate the minimum content width (MCW) of each cell ...
            // For each column, determine a maximum and minimum column width
            // from the cells that span only that column."
            let mut widths: Vec<Option<f32>> = declared.clone();
            for cell in cells.iter().filter(|c| c.colspan == 1) {
                if declared[cell.column].is_some() {
                    continue;
                }
                let hint = hint_or_default(cell.node, &mut diagnostics);
                let slot = &mut widths[cell.column];
                *slot = Some(slot.map_or(hint.width, |w| w.max(hint.width)));
            }
            let mut widths: Vec<f32> = widths
                .into_iter()
                .map(|w| w.unwrap_or(config.default_leaf_width))
                .collect();
            // Spanning cells widen their columns evenly when they do not fit.
            for cell in cells.iter().filter(|c| c.colspan > 1) {
                let hint = hint_or_default(cell.node, &mut diagnostics);
                let span = &mut widths[cell.column..cell.column + cell.colspan];
                let current: f32 = span.iter().sum();
                if hint.width > current {
                    let extra = (hint.width - current) / cell.colspan as f32;
                    for w in span.iter_mut() {
                        *w += extra;
                    }
                }
            }
            widths
        }
    };
    if column_widths.len() < column_count {
        column_widths.resize(column_count, 0.0);
    }

    // STEP 3: Row heights.
    //
    // [§ 17.5.3 Table height algorithms](https://www.w3.org/TR/CSS2/tables.html#height-layout)
    let row_heights: Vec<f32> = match height {
        Some(table_height) if row_count > 0 => {
            let shared = (table_height / row_count as f32).max(0.0);
            for cell in &cells {
                if let Some(hint) = hints.get(&cell.node) {
                    let available = shared * cell.rowspan as f32;
                    if hint.height > available {
                        diagnostics.push(Diagnostic {
                            node: cell.node,
                            kind: DiagnosticKind::Overflow {
                                axis: Axis::Vertical,
                                amount: hint.height - available,
                            },
                        });
                    }
                }
            }
            vec![shared; row_count]
        }
        _ => {
            let mut heights: Vec<Option<f32>> = vec![None; row_count];
            for cell in cells.iter().filter(|c| c.rowspan == 1) {
                let hint = hint_or_default(cell.node, &mut diagnostics);
                let slot = &mut heights[cell.row];
                *slot = Some(slot.map_or(hint.height, |h| h.max(hint.height)));
            }
            let mut heights: Vec<f32> = heights
                .into_iter()
                .map(|h| h.unwrap_or(config.default_leaf_height))
                .collect();
            // A spanning cell that does not fit grows its last row.
            for cell in cells.iter().filter(|c| c.rowspan > 1) {
                let hint = hint_or_default(cell.node, &mut diagnostics);
                let last = cell.row + cell.rowspan - 1;
                let current: f32 = heights[cell.row..=last].iter().sum();
                if hint.height > current {
                    heights[last] += hint.height - current;
                }
            }
            heights
        }
    };

    // STEP 4: Offsets.
    let column_x: Vec<f32> = column_widths
        .iter()
        .scan(0.0_f32, |x, w| {
            let start = *x;
            *x += w;
            Some(start)
        })
        .collect();
    let row_y: Vec<f32> = row_heights
        .iter()
        .scan(0.0_f32, |y, h| {
            let start = *y;
            *y += h;
            Some(start)
        })
        .collect();
    let grid_width: f32 = column_widths.iter().sum();
    let grid_height: f32 = row_heights.iter().sum();
    let used_width = width.unwrap_or(grid_width);
    let used_height = height.unwrap_or(grid_height);

    // STEP 5: Rectangles for sections, rows and cells.
    let mut boxes: HashMap<NodeId, Rect> = HashMap::new();
    let mut row_index = 0_usize;
    let mut row_of_cell: HashMap<NodeId, usize> = HashMap::new();
    for section in &structure.sections {
        let section_top = row_y.get(row_index).copied().unwrap_or(grid_height);
        let section_rows = row_index..row_index + section.rows.len();
        let section_height: f32 = row_heights[section_rows].iter().sum();
        if let Some(node) = section.node {
            let _ = boxes.insert(node, Rect::new(0.0, section_top, grid_width, section_height));
        }
        // Bare rows are positioned against the table itself.
        let origin_y = if section.node.is_some() { section_top } else { 0.0 };
        for row in &section.rows {
            let rect = Rect::new(
                0.0,
                row_y[row_index] - origin_y,
                grid_width,
                row_heights[row_index],
            );
            trace!("table {table} row {}: {rect:?}", row.node);
            let _ = boxes.insert(row.node, rect);
            for cell in &row.cells {
                let _ = row_of_cell.insert(cell.node, row_index);
            }
            row_index += 1;
        }
    }

    for cell in &cells {
        let row = row_of_cell
            .get(&cell.node)
            .copied()
            .ok_or(LayoutError::MissingDimensions {
                node: cell.node,
                context: "table cell row",
            })?;
        let x = column_x.get(cell.column).copied().unwrap_or(grid_width);
        let cell_width: f32 = column_widths[cell.column..cell.column + cell.colspan]
            .iter()
            .sum();
        let cell_height: f32 = row_heights[row..row + cell.rowspan].iter().sum();
        let _ = boxes.insert(cell.node, Rect::new(x, 0.0, cell_width, cell_height));
    }

    // STEP 6: Column elements.
    for element in &structure.column_elements {
        let end = (element.first + element.span).min(column_count);
        let first = element.first.min(end);
        let x = column_x.get(first).copied().unwrap_or(grid_width);
        let span_width: f32 = column_widths[first..end].iter().sum();
        let group_x = element
            .group
            .and_then(|group| structure.column_elements.iter().find(|e| e.node == group))
            .and_then(|group| column_x.get(group.first).copied())
            .unwrap_or(0.0);
        let _ = boxes.insert(
            element.node,
            Rect::new(x - group_x, 0.0, span_width, grid_height),
        );
    }

    // STEP 7: Caption.
    //
    // [§ 17.4.1 Caption position and alignment](https://www.w3.org/TR/CSS2/tables.html#caption-position)
    //
    // "top: Positions the caption box above the table box. bottom:
    // Positions the caption box below the table box."
    if let Some(caption) = structure.caption {
        let caption_height = hint_or_default(caption, &mut diagnostics).height;
        let y = match structure.caption_side {
            CaptionSide::Top => -caption_height,
            CaptionSide::Bottom => used_height,
        };
        let _ = boxes.insert(caption, Rect::new(0.0, y, used_width, caption_height));
    }

    for &other in &structure.others {
        let _ = boxes.insert(other, Rect::default());
    }

    Ok(TableLayout {
        column_widths,
        row_heights,
        boxes,
        content_size: Size::new(used_width, used_height),
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structure(rows: Vec<Vec<(usize, usize)>>) -> TableStructure {
        let mut next = 1;
        let mut alloc = || {
            next += 1;
            NodeId(next)
        };
        TableStructure {
            table: NodeId(0),
            caption: None,
            caption_side: CaptionSide::Top,
            column_widths: Vec::new(),
            column_elements: Vec::new(),
            sections: vec![TableSection {
                node: None,
                kind: SectionKind::Body,
                rows: rows
                    .into_iter()
                    .map(|cells| TableRow {
                        node: alloc(),
                        cells: cells
                            .into_iter()
                            .map(|(colspan, rowspan)| TableCell {
                                node: alloc(),
                                colspan,
                                rowspan,
                            })
                            .collect(),
                    })
                    .collect(),
            }],
            others: Vec::new(),
            positioned: Vec::new(),
        }
    }

    #[test]
    fn test_rowspan_pushes_later_cells_right() {
        let table = structure(vec![vec![(1, 2), (1, 1)], vec![(1, 1)]]);
        let (cells, columns) = place_cells(&table);
        assert_eq!(columns, 2);
        assert_eq!(cells[2].row, 1);
        assert_eq!(cells[2].column, 1);
    }

    #[test]
    fn test_rowspan_is_clamped_to_remaining_rows() {
        let table = structure(vec![vec![(1, 5)], vec![(1, 1)]]);
        let (cells, _) = place_cells(&table);
        assert_eq!(cells[0].rowspan, 2);
    }
}
