//! CSS Flexbox Layout Algorithm.
//!
//! [§ 9 Flex Layout Algorithm](https://www.w3.org/TR/css-flexbox-1/#layout-algorithm)
//!
//! Supported:
//! - `flex-direction` (all four values; `-reverse` reverses the item sequence)
//! - `flex-wrap` (`nowrap`, `wrap`, `wrap-reverse`)
//! - `order` (stable sort)
//! - `flex-grow` / `flex-shrink` / `flex-basis` (§ 9.7 freeze loop)
//! - `justify-content`, `align-items`, `align-self`, `align-content`
//! - `row-gap` / `column-gap`
//!
//! Not implemented: baseline alignment (treated as `flex-start`), min/max
//! main sizes, and auto margins.
//!
//! The engine is a pure function of the container and its children's
//! styles. It returns one box per input child, in input order; callers map
//! the results back by index.

use log::trace;
use trellis_common::warning::warn_once;
use trellis_dom::NodeId;

use crate::error::LayoutError;
use crate::style::{
    AlignItems, AutoLength, FlexWrap, JustifyContent, LengthValue, StyleProperties,
};

use super::box_model::{BoxDimensions, EdgeSizes, Size};
use super::config::LayoutConfig;
use super::values::LengthResolver;

/// One child of a flex container, as seen by the flex engine.
#[derive(Debug, Clone, Copy)]
pub struct FlexChild<'a> {
    /// The child element.
    pub node: NodeId,
    /// The child's resolved style.
    pub style: &'a StyleProperties,
    /// The child's content size when its width/height are `auto`
    /// (measured text, or the size of its own content).
    pub intrinsic: Size,
}

/// The flex container, as seen by the flex engine.
#[derive(Debug, Clone, Copy)]
pub struct FlexContainer<'a> {
    /// The container element.
    pub node: NodeId,
    /// The container's resolved style.
    pub style: &'a StyleProperties,
    /// Content-box width. Always definite.
    pub width: f32,
    /// Content-box height, or `None` when it depends on the flex lines.
    pub height: Option<f32>,
}

/// A flex line: items sharing one main-axis run and one cross extent.
#[derive(Debug, Clone, PartialEq)]
pub struct FlexLine {
    /// Input indices of the items on the line, in placement order.
    pub items: Vec<usize>,
    /// Cross-axis offset of the line from the container's content edge.
    pub cross_start: f32,
    /// Cross size of the line.
    pub cross_size: f32,
}

/// Result of [`layout_flex_children`].
#[derive(Debug, Clone, PartialEq)]
pub struct FlexLayout {
    /// One entry per input child. `None` for children that do not take part
    /// in flex layout (absolutely or fixed positioned). Content rectangles
    /// are relative to the container's content origin.
    pub items: Vec<Option<BoxDimensions>>,
    /// The lines in cross-axis order.
    pub lines: Vec<FlexLine>,
    /// Used content size of the container: the given size on definite
    /// axes, the extent of the lines on indefinite ones.
    pub content_size: Size,
}

/// Per-item data collected during flex layout.
///
/// [§ 9.2 Line Length Determination](https://www.w3.org/TR/css-flexbox-1/#algo-main-item)
#[derive(Debug, Clone)]
struct FlexItem {
    /// Index into the input children.
    index: usize,
    /// The `order` value.
    order: f32,
    /// [§ 9.2 step 3](https://www.w3.org/TR/css-flexbox-1/#algo-main-item)
    /// The flex base size, on the content box.
    base_size: f32,
    /// flex-grow factor.
    grow: f32,
    /// flex-shrink factor.
    shrink: f32,
    /// The resolved target main size after § 9.7.
    target_size: f32,
    /// Whether this item is frozen during the § 9.7 loop.
    frozen: bool,
    /// Margin+border+padding on the main axis.
    outer_main: f32,
    /// Margin+border+padding on the cross axis.
    outer_cross: f32,
    /// Definite cross size from the style, if any.
    explicit_cross: Option<f32>,
    /// Cross size before stretching.
    cross_size: f32,
    /// Resolved `align-self`.
    align: AlignItems,
    padding: EdgeSizes,
    border: EdgeSizes,
    margin: EdgeSizes,
}

impl FlexItem {
    fn outer_hypothetical(&self) -> f32 {
        self.base_size + self.outer_main
    }

    fn outer_target(&self) -> f32 {
        self.target_size + self.outer_main
    }
}

/// Main entry point for flex layout.
///
/// [§ 9 Flex Layout Algorithm](https://www.w3.org/TR/css-flexbox-1/#layout-algorithm)
///
/// # Errors
///
/// A non-finite `order` or flex factor, or a percentage (gap, basis, size,
/// edge) on an axis with no definite reference.
#[allow(clippy::cast_precision_loss)]
pub fn layout_flex_children(
    children: &[FlexChild<'_>],
    container: &FlexContainer<'_>,
    resolver: &LengthResolver,
    config: &LayoutConfig,
) -> Result<FlexLayout, LayoutError> {
    let style = container.style;
    let direction = style.flex_direction();
    let is_row = direction.is_row();

    // Main and cross sizes of the container, `None` where indefinite.
    let (main_size, cross_size) = if is_row {
        (Some(container.width), container.height)
    } else {
        (container.height, Some(container.width))
    };

    // [§ 10.1 'row-gap' and 'column-gap'](https://www.w3.org/TR/css-align-3/#column-row-gap)
    //
    // Percentages resolve against the content box on the gap's own axis.
    let column_gap = resolve_gap(resolver, "column-gap", style.column_gap, Some(container.width))?;
    let row_gap = resolve_gap(resolver, "row-gap", style.row_gap, container.height)?;
    let (main_gap, cross_gap) = if is_row {
        (column_gap, row_gap)
    } else {
        (row_gap, column_gap)
    };

    // STEP 1: Collect flex items and determine flex base sizes.
    //
    // [§ 4.1 Absolutely-Positioned Flex Children](https://www.w3.org/TR/css-flexbox-1/#abspos-items)
    //
    // "An absolutely-positioned child of a flex container does not
    // participate in flex layout."
    let mut items: Vec<FlexItem> = Vec::with_capacity(children.len());
    for (index, child) in children.iter().enumerate() {
        if child.style.position().is_out_of_flow() {
            continue;
        }
        items.push(collect_item(
            index,
            child,
            container,
            is_row,
            main_size,
            cross_size,
            resolver,
        )?);
    }

    // STEP 2: Ordering.
    //
    // [§ 5.4 Display Order: the order property](https://www.w3.org/TR/css-flexbox-1/#order-property)
    //
    // "Flex items are, by default, displayed and laid out in the same order
    // as they appear in the source document. The order property can be used
    // to change this ordering." `sort_by` is stable, so equal orders keep
    // their source order.
    items.sort_by(|a, b| a.order.total_cmp(&b.order));
    if direction.is_reverse() {
        items.reverse();
    }

    // STEP 3: Collect items into flex lines.
    //
    // [§ 9.3 step 5](https://www.w3.org/TR/css-flexbox-1/#algo-line-break)
    let mut lines = collect_lines(
        items,
        style.flex_wrap(),
        main_size,
        main_gap,
        config.flex_wrap_epsilon,
    );

    // STEP 4: Resolve flexible lengths per line.
    for line in &mut lines {
        let gaps = main_gap * line.len().saturating_sub(1) as f32;
        match main_size {
            Some(main) => resolve_flexible_lengths(line, main - gaps),
            None => {
                for item in line.iter_mut() {
                    item.target_size = item.base_size;
                }
            }
        }
    }

    // STEP 5: Cross sizes of lines.
    //
    // [§ 9.4 step 8](https://www.w3.org/TR/css-flexbox-1/#algo-cross-line)
    //
    // "If the flex container is single-line and has a definite cross size,
    // the cross size of the flex line is the flex container's inner cross
    // size. Otherwise, for each flex line: ... the largest outer
    // hypothetical cross size."
    let mut line_cross: Vec<f32> = lines
        .iter()
        .map(|line| {
            line.iter()
                .map(|item| item.cross_size + item.outer_cross)
                .fold(0.0_f32, f32::max)
        })
        .collect();
    let single_line = style.flex_wrap() == FlexWrap::Nowrap;
    if let (true, Some(cross), Some(first)) = (single_line, cross_size, line_cross.first_mut()) {
        *first = cross;
    }

    // STEP 6: Cross placement of lines.
    //
    // [§ 8.4 Packing Flex Lines: the align-content property](https://www.w3.org/TR/css-flexbox-1/#align-content-property)
    let line_gaps = cross_gap * lines.len().saturating_sub(1) as f32;
    let lines_total: f32 = line_cross.iter().sum::<f32>() + line_gaps;
    let container_cross = cross_size.unwrap_or(lines_total);
    let (mut cross_cursor, line_spacing) = if lines.len() >= 2 {
        let free = container_cross - lines_total;
        match style.align_content().as_distribution() {
            Some(distribution) => compute_justify_offsets(distribution, free, lines.len()),
            None => {
                // "Lines stretch to take up the remaining space."
                if free > 0.0 {
                    let extra = free / lines.len() as f32;
                    for cross in &mut line_cross {
                        *cross += extra;
                    }
                }
                (0.0, 0.0)
            }
        }
    } else {
        (0.0, 0.0)
    };

    // STEP 7: Main-axis placement and in-line cross alignment.
    let mut results: Vec<Option<BoxDimensions>> = vec![None; children.len()];
    let mut placed_lines = Vec::with_capacity(lines.len());
    let mut main_extent = 0.0_f32;

    for (line, line_cross_size) in lines.iter().zip(line_cross.iter().copied()) {
        let used_main: f32 = line.iter().map(FlexItem::outer_target).sum::<f32>()
            + main_gap * line.len().saturating_sub(1) as f32;
        main_extent = main_extent.max(used_main);

        // [§ 8.2 'justify-content'](https://www.w3.org/TR/css-flexbox-1/#justify-content-property)
        let free_space = main_size.map_or(0.0, |main| (main - used_main).max(0.0));
        let (initial_offset, spacing) =
            compute_justify_offsets(style.justify_content(), free_space, line.len());

        let mut main_cursor = initial_offset;
        for item in line {
            let (item_cross, cross_offset) = align_in_line(item, line_cross_size);
            let mut dims = BoxDimensions {
                padding: item.padding,
                border: item.border,
                margin: item.margin,
                ..BoxDimensions::default()
            };
            if is_row {
                dims.content.width = item.target_size;
                dims.content.height = item_cross;
                dims.set_margin_origin(main_cursor, cross_cursor + cross_offset);
            } else {
                dims.content.width = item_cross;
                dims.content.height = item.target_size;
                dims.set_margin_origin(cross_cursor + cross_offset, main_cursor);
            }
            trace!(
                "flex item {} of {}: {:?}",
                children[item.index].node, container.node, dims.content
            );
            results[item.index] = Some(dims);
            main_cursor += item.outer_target() + spacing + main_gap;
        }

        placed_lines.push(FlexLine {
            items: line.iter().map(|item| item.index).collect(),
            cross_start: cross_cursor,
            cross_size: line_cross_size,
        });
        cross_cursor += line_cross_size + line_spacing + cross_gap;
    }

    let used_main = main_size.unwrap_or(main_extent);
    let content_size = if is_row {
        Size::new(used_main, container_cross)
    } else {
        Size::new(container_cross, used_main)
    };

    Ok(FlexLayout {
        items: results,
        lines: placed_lines,
        content_size,
    })
}

/// Resolve one item's edges, base size and cross size.
///
/// [§ 9.2 step 3](https://www.w3.org/TR/css-flexbox-1/#algo-main-item)
fn collect_item(
    index: usize,
    child: &FlexChild<'_>,
    container: &FlexContainer<'_>,
    is_row: bool,
    main_size: Option<f32>,
    cross_size: Option<f32>,
    resolver: &LengthResolver,
) -> Result<FlexItem, LayoutError> {
    let style = child.style;

    let order = style.order();
    if !order.is_finite() {
        return Err(LayoutError::NonFinite {
            property: "order",
            node: child.node,
        });
    }
    let grow = style.flex_grow();
    let shrink = style.flex_shrink();
    if !grow.is_finite() {
        return Err(LayoutError::NonFinite {
            property: "flex-grow",
            node: child.node,
        });
    }
    if !shrink.is_finite() {
        return Err(LayoutError::NonFinite {
            property: "flex-shrink",
            node: child.node,
        });
    }

    // Edges resolve against the container's width on every side.
    let reference = Some(container.width);
    let padding = resolver.edges("padding", style.padding_edges(), reference)?;
    let border = resolver.edges("border-width", style.border_edges(), reference)?;
    let margin = resolver
        .auto_edges("margin", style.margin_edges(), reference)?
        .or_zero();

    let (main_prop, cross_prop, main_name, cross_name) = if is_row {
        (style.width, style.height, "width", "height")
    } else {
        (style.height, style.width, "height", "width")
    };
    let (intrinsic_main, intrinsic_cross) = if is_row {
        (child.intrinsic.width, child.intrinsic.height)
    } else {
        (child.intrinsic.height, child.intrinsic.width)
    };
    let (outer_main, outer_cross) = if is_row {
        (
            padding.horizontal() + border.horizontal() + margin.horizontal(),
            padding.vertical() + border.vertical() + margin.vertical(),
        )
    } else {
        (
            padding.vertical() + border.vertical() + margin.vertical(),
            padding.horizontal() + border.horizontal() + margin.horizontal(),
        )
    };

    // "Determine the flex base size":
    //   A. a definite flex-basis is used as-is (percentages of the
    //      container's main size);
    //   B. `auto` uses the item's main size property when definite;
    //   C. otherwise the item's intrinsic main size.
    let base_size = match style.flex_basis() {
        AutoLength::Length(len) => resolver.length("flex-basis", len, main_size)?,
        AutoLength::Auto => resolver
            .auto_length(main_name, main_prop, main_size)?
            .to_px_or(intrinsic_main),
    }
    .max(0.0);

    let explicit_cross = resolver
        .auto_length(cross_name, cross_prop, cross_size)?
        .length()
        .map(|c| c.max(0.0));

    let mut align = style.align_self().resolve(container.style.align_items());
    if align == AlignItems::Baseline {
        warn_once("flex", "align baseline is not supported, using flex-start");
        align = AlignItems::FlexStart;
    }

    Ok(FlexItem {
        index,
        order,
        base_size,
        grow,
        shrink,
        target_size: 0.0,
        frozen: false,
        outer_main,
        outer_cross,
        explicit_cross,
        cross_size: explicit_cross.unwrap_or(intrinsic_cross),
        align,
        padding,
        border,
        margin,
    })
}

fn resolve_gap(
    resolver: &LengthResolver,
    property: &'static str,
    gap: Option<LengthValue>,
    reference: Option<f32>,
) -> Result<f32, LayoutError> {
    gap.map_or(Ok(0.0), |len| {
        resolver.length(property, len, reference).map(|g| g.max(0.0))
    })
}

/// [§ 9.3 step 5 Collect flex items into flex lines](https://www.w3.org/TR/css-flexbox-1/#algo-line-break)
///
/// "If the flex container is single-line, collect all the flex items into
/// a single flex line. Otherwise, starting from the first uncollected item,
/// collect consecutive items one by one until the first time that the next
/// collected item would not fit into the flex container's inner main size."
fn collect_lines(
    items: Vec<FlexItem>,
    wrap: FlexWrap,
    main_size: Option<f32>,
    gap: f32,
    epsilon: f32,
) -> Vec<Vec<FlexItem>> {
    let Some(available) = main_size.filter(|_| wrap != FlexWrap::Nowrap) else {
        return vec![items];
    };

    let mut lines: Vec<Vec<FlexItem>> = Vec::new();
    let mut current: Vec<FlexItem> = Vec::new();
    let mut running = 0.0_f32;
    for item in items {
        let size = item.outer_hypothetical();
        let needed = if current.is_empty() { size } else { running + gap + size };
        if current.is_empty() || needed <= available + epsilon {
            running = needed;
            current.push(item);
        } else {
            lines.push(std::mem::take(&mut current));
            running = size;
            current.push(item);
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }

    if wrap == FlexWrap::WrapReverse {
        lines.reverse();
    }
    lines
}

/// [§ 9.7 Resolving Flexible Lengths](https://www.w3.org/TR/css-flexbox-1/#resolve-flexible-lengths)
///
/// Iterative freeze loop. The whole remaining free space is distributed:
/// growing shares are `free × grow / Σgrow`, shrinking shares are weighted
/// by `shrink × base`. Items that would go below zero are clamped and
/// frozen, and the rest is redistributed.
fn resolve_flexible_lengths(items: &mut [FlexItem], available_main: f32) {
    if items.is_empty() {
        return;
    }

    // STEP 1: "Determine the used flex factor."
    //
    // "If the sum of the outer hypothetical main sizes of all items on the
    // line is less than the flex container's inner main size, use the flex
    // grow factor for the rest of this algorithm; otherwise, use the flex
    // shrink factor."
    let sum_outer_hypo: f32 = items.iter().map(FlexItem::outer_hypothetical).sum();
    let growing = sum_outer_hypo < available_main;

    // STEP 2: "Size inflexible items."
    //
    // "Freeze, setting its target main size to its hypothetical main size…
    //   - any item that has a flex factor of zero"
    for item in items.iter_mut() {
        item.frozen = false;
        item.target_size = item.base_size;
        let factor = if growing { item.grow } else { item.shrink };
        if factor == 0.0 {
            item.frozen = true;
        }
    }

    // STEP 3: Loop until all items are frozen.
    loop {
        // 3a. Check for all frozen.
        if items.iter().all(|item| item.frozen) {
            break;
        }

        // 3b. Calculate remaining free space.
        let remaining_free = available_main
            - items
                .iter()
                .map(|item| {
                    if item.frozen {
                        item.outer_target()
                    } else {
                        item.outer_hypothetical()
                    }
                })
                .sum::<f32>();

        // 3c. Distribute free space.
        if growing {
            // "Find the ratio of the item's flex grow factor to the sum of
            // the flex grow factors of all unfrozen items on the line. Set
            // the item's target main size to its flex base size plus a
            // fraction of the remaining free space proportional to the ratio."
            let grow_sum: f32 = items
                .iter()
                .filter(|item| !item.frozen)
                .map(|item| item.grow)
                .sum();
            if grow_sum > 0.0 {
                for item in items.iter_mut().filter(|item| !item.frozen) {
                    let ratio = item.grow / grow_sum;
                    item.target_size = remaining_free.mul_add(ratio, item.base_size);
                }
            }
        } else {
            // "For every unfrozen item on the line, multiply its flex shrink
            // factor by its inner flex base size, and note this as its scaled
            // flex shrink factor. ... Set the item's target main size to its
            // flex base size minus a fraction of the absolute value of the
            // remaining free space proportional to the ratio."
            let scaled_shrink_sum: f32 = items
                .iter()
                .filter(|item| !item.frozen)
                .map(|item| item.shrink * item.base_size)
                .sum();
            if scaled_shrink_sum > 0.0 {
                for item in items.iter_mut().filter(|item| !item.frozen) {
                    let ratio = item.shrink * item.base_size / scaled_shrink_sum;
                    item.target_size = remaining_free.abs().mul_add(-ratio, item.base_size);
                }
            }
        }

        // 3d. Fix min violations. Content boxes cannot be negative.
        let mut total_violation = 0.0_f32;
        for item in items.iter_mut().filter(|item| !item.frozen) {
            let clamped = item.target_size.max(0.0);
            total_violation += clamped - item.target_size;
            item.target_size = clamped;
        }

        // 3e. "If the total violation is zero, freeze all items. If
        // positive, freeze all the items with min violations."
        if total_violation.abs() < 0.01 {
            for item in items.iter_mut() {
                item.frozen = true;
            }
        } else {
            for item in items.iter_mut().filter(|item| !item.frozen) {
                if item.target_size <= 0.0 {
                    item.frozen = true;
                }
            }
        }
    }
}

/// Cross size and cross offset of an item within its line.
///
/// [§ 8.3 Cross-axis Alignment](https://www.w3.org/TR/css-flexbox-1/#align-items-property)
fn align_in_line(item: &FlexItem, line_cross: f32) -> (f32, f32) {
    match item.align {
        // "If the cross size property of the flex item computes to auto ...
        // the used outer cross size is the used cross size of its flex line."
        AlignItems::Stretch if item.explicit_cross.is_none() => {
            ((line_cross - item.outer_cross).max(0.0), 0.0)
        }
        AlignItems::FlexEnd => (
            item.cross_size,
            line_cross - item.cross_size - item.outer_cross,
        ),
        AlignItems::Center => (
            item.cross_size,
            (line_cross - item.cross_size - item.outer_cross) / 2.0,
        ),
        AlignItems::Stretch | AlignItems::FlexStart | AlignItems::Baseline => {
            (item.cross_size, 0.0)
        }
    }
}

/// Compute distribution offsets for `count` boxes sharing `free_space`.
///
/// [§ 8.2 Axis Alignment: the justify-content property](https://www.w3.org/TR/css-flexbox-1/#justify-content-property)
///
/// Returns `(initial_offset, spacing_between_boxes)`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_justify_offsets(
    keyword: JustifyContent,
    free_space: f32,
    count: usize,
) -> (f32, f32) {
    if count == 0 {
        return (0.0, 0.0);
    }

    match keyword {
        // "Flex items are packed toward the start of the line."
        JustifyContent::FlexStart => (0.0, 0.0),

        // "Flex items are packed toward the end of the line."
        JustifyContent::FlexEnd => (free_space, 0.0),

        // "Flex items are packed toward the center of the line."
        JustifyContent::Center => (free_space / 2.0, 0.0),

        // "If the leftover free-space is negative or there is only a single
        // flex item on the line, this value is identical to flex-start."
        JustifyContent::SpaceBetween => {
            if count <= 1 || free_space <= 0.0 {
                (0.0, 0.0)
            } else {
                (0.0, free_space / (count - 1) as f32)
            }
        }

        // "Flex items are evenly distributed in the line, with half-size
        // spaces on either end."
        JustifyContent::SpaceAround => {
            if free_space <= 0.0 {
                (0.0, 0.0)
            } else {
                let spacing = free_space / count as f32;
                (spacing / 2.0, spacing)
            }
        }

        // Equal spacing everywhere, ends included.
        JustifyContent::SpaceEvenly => {
            if free_space <= 0.0 {
                (0.0, 0.0)
            } else {
                let spacing = free_space / (count + 1) as f32;
                (spacing, spacing)
            }
        }
    }
}
