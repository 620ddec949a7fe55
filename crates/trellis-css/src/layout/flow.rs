//! Top-down layout walk.
//!
//! [§ 9.4 Normal flow](https://www.w3.org/TR/CSS2/visuren.html#normal-flow)
//!
//! Every container is classified from its resolved `display` and handed to
//! the matching engine: block flow here, [`flex`](super::flex),
//! [`table`](super::table) or [`list`](super::list). Each engine places the
//! container's children; the walk then recurses into each child's own
//! content. Absolute and fixed children are skipped during the walk and
//! queued. [`LayoutContext::layout_out_of_flow`] resolves them once every
//! containing block has its final geometry.

use std::collections::HashMap;

use log::{debug, trace};
use trellis_dom::NodeId;

use crate::error::{Diagnostic, DiagnosticKind, LayoutError};
use crate::style::{Display, ListStyleType, StyleProperties};

use super::box_model::{BoxDimensions, Rect, Size, resolve_box};
use super::context::{AutoAxes, LayoutContext};
use super::flex::{FlexChild, FlexContainer, layout_flex_children};
use super::list::{ListChild, layout_list_items, marker_label};
use super::positioned::{
    BoxOffsets, ContainingBlock, PositionType, PositionedLayout, containing_block_ancestor,
};
use super::table::{TableStructure, layout_table};

impl LayoutContext<'_> {
    /// Lay out the whole tree from the root.
    ///
    /// [§ 10.1](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
    ///
    /// "The containing block in which the root element lives is a rectangle
    /// called the initial containing block." The root resolves against the
    /// viewport and keeps that size even when its height is `auto`.
    ///
    /// # Errors
    ///
    /// Any structural failure below the root.
    pub fn layout_root(&mut self) -> Result<(), LayoutError> {
        let root = self.tree.root();
        let style = self.style(root)?;
        if style.display() == Display::None {
            self.store(root, BoxDimensions::default());
            return Ok(());
        }

        let resolved = resolve_box(style, Some(self.viewport.size()), &self.resolver)?;
        let mut dims = resolved.dimensions;
        if style.position() == PositionType::Relative {
            let offsets = BoxOffsets::resolve(style, self.viewport.size(), &self.resolver)?;
            PositionedLayout::layout_relative(&mut dims, &offsets);
        }
        debug!("root {root}: {:?}", dims.content);
        self.store(root, dims);
        self.store_axes(root, AutoAxes::DEFINITE);
        self.layout_subtree(root, false)
    }

    /// Lay out the content of `node`, whose own box is already stored.
    ///
    /// With `shrink_wrap`, an `auto` height is replaced by the height of the
    /// laid-out content; an element with no content at all gets the default
    /// leaf height and a [`DiagnosticKind::ContentSizingFallback`]. Lists
    /// keep the height they were given.
    ///
    /// # Errors
    ///
    /// [`LayoutError::MissingDimensions`] when `node` has no stored box, and
    /// any failure from laying out its children.
    pub fn layout_subtree(&mut self, node: NodeId, shrink_wrap: bool) -> Result<(), LayoutError> {
        let extent = self.layout_children(node)?;
        let style = self.style(node)?;
        if !shrink_wrap || !self.axes(node).height || style.display() == Display::List {
            return Ok(());
        }

        let mut dims = self.dimension(node, "shrink-wrap")?;
        let height = match self.intrinsic.get(&node).copied().or(extent) {
            Some(extent) => extent.height,
            None => {
                self.record(Diagnostic {
                    node,
                    kind: DiagnosticKind::ContentSizingFallback {
                        width: dims.content.width,
                        height: self.config.default_leaf_height,
                    },
                });
                self.config.default_leaf_height
            }
        };
        dims.content.height = height.max(0.0);
        self.store(node, dims);
        Ok(())
    }

    /// Dispatch on the container's `display`. Returns the extent of the
    /// placed content, or `None` when `node` has neither text nor in-flow
    /// children.
    fn layout_children(&mut self, node: NodeId) -> Result<Option<Size>, LayoutError> {
        let style = self.style(node)?;
        let content = self.dimension(node, "container content box")?.content;
        match style.display() {
            Display::None => Ok(None),
            Display::Flex => self.layout_flex(node, style, content),
            Display::Table => self.layout_table(node, content),
            Display::List => self.layout_list(node, style, content),
            _ => self.layout_block(node, content),
        }
    }

    /// Displayed children of `node`, with absolute and fixed ones queued
    /// for the out-of-flow pass.
    fn in_flow_children(&mut self, node: NodeId) -> Result<Vec<NodeId>, LayoutError> {
        let tree = self.tree;
        let mut children = Vec::with_capacity(tree.children(node).len());
        for &child in tree.children(node) {
            let style = self.style(child)?;
            if style.display() == Display::None {
                continue;
            }
            if style.position().is_out_of_flow() {
                self.out_of_flow.push_back(child);
                continue;
            }
            children.push(child);
        }
        Ok(children)
    }

    /// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
    ///
    /// Shift a placed box by its offsets. Percentages resolve against the
    /// parent's content box.
    fn apply_relative(
        &self,
        style: &StyleProperties,
        dims: &mut BoxDimensions,
        parent: Size,
    ) -> Result<(), LayoutError> {
        if style.position() == PositionType::Relative {
            let offsets = BoxOffsets::resolve(style, parent, &self.resolver)?;
            PositionedLayout::layout_relative(dims, &offsets);
        }
        Ok(())
    }

    /// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    ///
    /// "In a block formatting context, boxes are laid out one after the
    /// other, vertically, beginning at the top of a containing block."
    ///
    /// The element's own text comes first, then each in-flow child below the
    /// previous one. A child with an explicit `top` keeps it and does not
    /// advance the flow.
    ///
    /// An `auto` height takes a host-supplied size when there is one, and
    /// otherwise the parent's remaining content height. Flex containers and
    /// tables are the exception: their lines and rows decide an `auto`
    /// height. So does every child of a parent whose own height is still
    /// content-sized.
    fn layout_block(&mut self, node: NodeId, content: Rect) -> Result<Option<Size>, LayoutError> {
        let parent = content.size();
        let parent_definite = !self.axes(node).height;
        let mut cursor = 0.0_f32;
        let mut extent: Option<Size> = None;

        if let Some(metrics) = self.measure_text(node, Some(content.width))? {
            cursor = metrics.height;
            extent = Some(Size::new(metrics.width, metrics.height));
        }

        for child in self.in_flow_children(node)? {
            let style = self.style(child)?;
            let resolved = resolve_box(style, Some(parent), &self.resolver)?;
            let mut dims = resolved.dimensions;
            let content_sized = !parent_definite
                || matches!(style.display(), Display::Flex | Display::Table);
            let mut axes = AutoAxes::from_style(style);

            if resolved.auto_height {
                dims.content.height = match self.intrinsic.get(&child) {
                    Some(size) => size.height,
                    None => (parent.height - cursor - dims.extra_height()).max(0.0),
                };
                axes.height = content_sized;
            }
            if let Some(size) = self.intrinsic.get(&child).filter(|_| resolved.auto_width) {
                dims.content.width = size.width;
            }
            if !resolved.explicit_y {
                let x = dims.margin_box().x;
                dims.set_margin_origin(x, cursor);
            }
            self.store(child, dims);
            self.store_axes(child, axes);

            // STEP 1: The child's own content, which sizes a content-sized
            // height.
            self.layout_subtree(child, content_sized)?;
            let mut dims = self.dimension(child, "block flow")?;
            let outer = dims.margin_box();
            if !resolved.explicit_y {
                cursor = outer.bottom();
            }
            let current = extent.unwrap_or_default();
            extent = Some(Size::new(
                current.width.max(outer.right()),
                current.height.max(outer.bottom()),
            ));

            // STEP 2: Relative offsets never move later siblings.
            self.apply_relative(style, &mut dims, parent)?;
            trace!("block child {child} of {node}: {:?}", dims.content);
            self.store(child, dims);
        }
        Ok(extent)
    }

    /// [CSS Flexbox § 9](https://www.w3.org/TR/css-flexbox-1/#layout-algorithm)
    ///
    /// An `auto` container height is indefinite: the flex lines decide it.
    fn layout_flex(
        &mut self,
        node: NodeId,
        style: &StyleProperties,
        content: Rect,
    ) -> Result<Option<Size>, LayoutError> {
        let children = self.in_flow_children(node)?;
        if children.is_empty() {
            return Ok(self
                .measure_text(node, Some(content.width))?
                .map(|m| Size::new(m.width, m.height)));
        }

        let mut flex_children = Vec::with_capacity(children.len());
        for &child in &children {
            let intrinsic = self.intrinsic_size(child, content.size())?;
            flex_children.push(FlexChild {
                node: child,
                style: self.style(child)?,
                intrinsic,
            });
        }
        let container = FlexContainer {
            node,
            style,
            width: content.width,
            height: (!self.axes(node).height).then_some(content.height),
        };
        let layout = layout_flex_children(&flex_children, &container, &self.resolver, self.config)?;

        for (&child, dims) in children.iter().zip(layout.items) {
            let Some(mut dims) = dims else {
                continue;
            };
            self.apply_relative(self.style(child)?, &mut dims, content.size())?;
            self.store(child, dims);
            self.store_axes(child, AutoAxes::DEFINITE);
            self.layout_subtree(child, false)?;
        }
        Ok(Some(layout.content_size))
    }

    /// [§ 17 Tables](https://www.w3.org/TR/CSS2/tables.html)
    ///
    /// Explicit table sizes are divided across the grid; `auto` ones come
    /// from cell content. An `auto` width is replaced by the grid width.
    fn layout_table(&mut self, node: NodeId, content: Rect) -> Result<Option<Size>, LayoutError> {
        let structure = TableStructure::collect(self.tree, node, self.styles);
        self.out_of_flow.extend(structure.positioned.iter().copied());
        let axes = self.axes(node);

        // STEP 1: Content hints for cells and the caption.
        let mut hints: HashMap<NodeId, Size> = HashMap::new();
        let hinted: Vec<NodeId> = structure
            .cells()
            .map(|cell| cell.node)
            .chain(structure.caption)
            .collect();
        for part in hinted {
            if let Some(size) = self.declared_border_box(part, content.size())? {
                let _ = hints.insert(part, size);
            }
        }

        // STEP 2: Grid.
        let table = layout_table(
            &structure,
            (!axes.width).then_some(content.width),
            (!axes.height).then_some(content.height),
            &hints,
            &self.resolver,
            self.config,
        )?;
        for diagnostic in table.diagnostics {
            self.record(diagnostic);
        }
        if axes.width {
            let mut dims = self.dimension(node, "table")?;
            dims.content.width = table.content_size.width;
            self.store(node, dims);
        }

        // STEP 3: Boxes. Only cells and captions carry padding and borders.
        let reference = Some(table.content_size.width);
        let mut laid_out = Vec::new();
        for (&part, rect) in &table.boxes {
            let style = self.style(part)?;
            let mut dims = BoxDimensions::default();
            if matches!(style.display(), Display::TableCell | Display::TableCaption)
                || structure.others.contains(&part)
            {
                dims.padding = self.resolver.edges("padding", style.padding_edges(), reference)?;
                dims.border = self
                    .resolver
                    .edges("border-width", style.border_edges(), reference)?;
                laid_out.push(part);
            }
            if style.display() == Display::TableColumn {
                laid_out.push(part);
            }
            dims.set_outer_size(rect.width, rect.height);
            dims.set_margin_origin(rect.x, rect.y);
            self.store(part, dims);
            self.store_axes(part, AutoAxes::DEFINITE);
        }

        // STEP 4: Cell content, in document order.
        laid_out.sort_unstable();
        for part in laid_out {
            self.layout_subtree(part, false)?;
        }
        Ok(Some(table.content_size))
    }

    /// Stack the list's in-flow children, reserving room for markers.
    fn layout_list(
        &mut self,
        node: NodeId,
        style: &StyleProperties,
        content: Rect,
    ) -> Result<Option<Size>, LayoutError> {
        let children = self.in_flow_children(node)?;
        let list_type = style.list_style_type();
        let spacing = match style.row_gap {
            Some(gap) => self
                .resolver
                .length("row-gap", gap, Some(content.height))?
                .max(0.0),
            None => self.config.list_item_spacing,
        };
        let inset = if list_type == ListStyleType::None {
            0.0
        } else {
            self.config.list_marker_inset
        };

        let reference = Some(content.width);
        let mut items = Vec::with_capacity(children.len());
        for &child in &children {
            let child_style = self.style(child)?;
            items.push(ListChild {
                node: child,
                padding: self
                    .resolver
                    .edges("padding", child_style.padding_edges(), reference)?,
                border: self
                    .resolver
                    .edges("border-width", child_style.border_edges(), reference)?,
            });
        }

        let list = layout_list_items(node, &items, content.size(), spacing, inset, self.config);
        if let Some(overflow) = list.overflow {
            self.record(overflow);
        }

        for (index, (&child, mut dims)) in children.iter().zip(list.items).enumerate() {
            let child_style = self.style(child)?;
            let item_type = child_style.list_style_type.unwrap_or(list_type);
            if let Some(label) = marker_label(item_type, index) {
                let _ = self.caches.markers.insert(child, label);
            }
            self.apply_relative(child_style, &mut dims, content.size())?;
            self.store(child, dims);
            self.store_axes(child, AutoAxes::DEFINITE);
            self.layout_subtree(child, false)?;
        }

        if children.is_empty() {
            return Ok(None);
        }
        Ok(Some(Size::new(content.width, list.used_height)))
    }

    /// [§ 10.3.7](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
    ///
    /// Resolve queued absolute and fixed elements in the order they were
    /// found. Laying one out may queue its own out-of-flow descendants.
    ///
    /// # Errors
    ///
    /// A queued element whose containing block or static position cannot be
    /// resolved.
    pub fn layout_out_of_flow(&mut self) -> Result<(), LayoutError> {
        while let Some(node) = self.out_of_flow.pop_front() {
            let style = self.style(node)?;
            let parent = self.tree.parent(node).ok_or(LayoutError::MissingDimensions {
                node,
                context: "out-of-flow parent",
            })?;
            let parent_origin = self.absolute_content_origin(parent)?;

            // STEP 1: Containing block.
            let block = match style.position() {
                PositionType::Fixed => ContainingBlock::viewport(&self.viewport),
                _ => match containing_block_ancestor(self.tree, node, self.styles) {
                    Some(ancestor) => {
                        let origin = self.absolute_content_origin(ancestor)?;
                        let dims = self.dimension(ancestor, "containing block")?;
                        ContainingBlock {
                            node: Some(ancestor),
                            rect: Rect::new(
                                origin.0,
                                origin.1,
                                dims.content.width,
                                dims.content.height,
                            ),
                        }
                    }
                    None => ContainingBlock::viewport(&self.viewport),
                },
            };
            self.caches.containing_blocks.insert(node, block);

            // STEP 2: Resolve in scene space.
            let intrinsic = self.intrinsic_size(node, block.rect.size())?;
            let mut dims = match style.position() {
                PositionType::Fixed => PositionedLayout::layout_fixed(
                    style,
                    &self.viewport,
                    parent_origin,
                    intrinsic,
                    &self.resolver,
                )?,
                _ => PositionedLayout::layout_absolute(
                    style,
                    block.rect,
                    parent_origin,
                    intrinsic,
                    &self.resolver,
                )?,
            };

            // STEP 3: Back to parent-relative coordinates.
            dims.content.x -= parent_origin.0;
            dims.content.y -= parent_origin.1;
            trace!("out-of-flow {node} against {:?}: {:?}", block.node, dims.content);
            self.store(node, dims);
            self.store_axes(node, AutoAxes::DEFINITE);
            self.layout_subtree(node, false)?;
        }
        Ok(())
    }
}
