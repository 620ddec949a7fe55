//! The layout tree handed to renderers.
//!
//! One [`LayoutBox`] per displayed element, in the shape of the element
//! tree. Elements with `display: none` and their subtrees have no box.

use std::collections::HashMap;

use serde::Serialize;
use trellis_dom::{DomTree, NodeId};

use crate::error::LayoutError;
use crate::style::{Display, StyleProperties};

use super::box_model::{BoxDimensions, Rect};
use super::context::LayoutCaches;
use super::positioned::PositionType;
use super::stacking::StackingContexts;

/// A laid-out element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutBox {
    /// The element this box was generated for.
    pub node: NodeId,
    /// Element kind (tag name).
    pub kind: String,
    /// Resolved `display`.
    pub display: Display,
    /// Resolved `position`.
    pub position: PositionType,
    /// Resolved geometry. `content.x`/`content.y` are relative to the
    /// parent's content origin; the root's are relative to the viewport.
    pub dimensions: BoxDimensions,
    /// The content box in scene coordinates.
    pub absolute: Rect,
    /// Paint depth from the stacking tree. Larger paints in front. Distinct
    /// stack levels give distinct depths; boxes sharing a depth are ordered
    /// by `paint_order`.
    pub depth: f64,
    /// Position in the back-to-front paint order.
    pub paint_order: usize,
    /// List marker label, for list items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    /// Wrapped lines of the element's literal text.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub text_lines: Vec<String>,
    /// Boxes of displayed children, in document order.
    pub children: Vec<LayoutBox>,
}

impl LayoutBox {
    /// The box for `node` in this subtree.
    #[must_use]
    pub fn find(&self, node: NodeId) -> Option<&Self> {
        self.iter().find(|b| b.node == node)
    }

    /// Pre-order iterator over this box and its descendants.
    #[must_use]
    pub fn iter(&self) -> LayoutBoxIter<'_> {
        LayoutBoxIter { stack: vec![self] }
    }

    /// The border box in scene coordinates.
    #[must_use]
    pub fn absolute_border_box(&self) -> Rect {
        let border = self.dimensions.border_box();
        border.translate(
            self.absolute.x - self.dimensions.content.x,
            self.absolute.y - self.dimensions.content.y,
        )
    }

    /// A copy of this box without its children.
    #[must_use]
    pub fn without_children(&self) -> Self {
        Self {
            children: Vec::new(),
            marker: self.marker.clone(),
            text_lines: self.text_lines.clone(),
            kind: self.kind.clone(),
            ..*self
        }
    }
}

/// Iterator returned by [`LayoutBox::iter`].
#[derive(Debug)]
pub struct LayoutBoxIter<'a> {
    stack: Vec<&'a LayoutBox>,
}

impl<'a> Iterator for LayoutBoxIter<'a> {
    type Item = &'a LayoutBox;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.stack.extend(current.children.iter().rev());
        Some(current)
    }
}

/// Builds [`LayoutBox`]es from the results of a pass.
pub(crate) struct BoxAssembler<'a> {
    tree: &'a DomTree,
    styles: &'a HashMap<NodeId, StyleProperties>,
    caches: &'a LayoutCaches,
    stacking: &'a StackingContexts,
    paint_index: HashMap<NodeId, usize>,
}

impl<'a> BoxAssembler<'a> {
    pub(crate) fn new(
        tree: &'a DomTree,
        styles: &'a HashMap<NodeId, StyleProperties>,
        caches: &'a LayoutCaches,
        stacking: &'a StackingContexts,
    ) -> Self {
        let paint_index = stacking
            .paint_order()
            .into_iter()
            .enumerate()
            .map(|(index, node)| (node, index))
            .collect();
        Self {
            tree,
            styles,
            caches,
            stacking,
            paint_index,
        }
    }

    /// The whole tree under `node`. `parent_origin` is the scene position
    /// of the parent's content box.
    pub(crate) fn tree(
        &self,
        node: NodeId,
        parent_origin: (f32, f32),
    ) -> Result<LayoutBox, LayoutError> {
        let mut layout_box = self.single(node, parent_origin)?;
        if !self.is_displayed(node) {
            // Only a hidden root gets here.
            return Ok(layout_box);
        }
        let origin = (layout_box.absolute.x, layout_box.absolute.y);
        for &child in self.tree.children(node) {
            if self.is_displayed(child) {
                layout_box.children.push(self.tree(child, origin)?);
            }
        }
        Ok(layout_box)
    }

    /// The box of `node` alone, with its scene position computed from its
    /// ancestors.
    pub(crate) fn detached(&self, node: NodeId) -> Result<LayoutBox, LayoutError> {
        let mut origin = (0.0, 0.0);
        for ancestor in self.tree.ancestors(node) {
            let dims = self.dimensions(ancestor)?;
            origin.0 += dims.content.x;
            origin.1 += dims.content.y;
        }
        self.single(node, origin)
    }

    fn single(&self, node: NodeId, parent_origin: (f32, f32)) -> Result<LayoutBox, LayoutError> {
        let style = self.styles.get(&node).ok_or(LayoutError::UnknownNode(node))?;
        let dimensions = self.dimensions(node)?;
        let content = dimensions.content;
        Ok(LayoutBox {
            node,
            kind: self
                .tree
                .element(node)
                .map(|e| e.kind.tag_name().to_string())
                .unwrap_or_default(),
            display: style.display(),
            position: style.position(),
            dimensions,
            absolute: content.translate(parent_origin.0, parent_origin.1),
            depth: self.stacking.depth(node),
            paint_order: self.paint_index.get(&node).copied().unwrap_or(usize::MAX),
            marker: self.caches.markers.get(&node).cloned(),
            text_lines: self.caches.text_lines.get(&node).cloned().unwrap_or_default(),
            children: Vec::new(),
        })
    }

    fn dimensions(&self, node: NodeId) -> Result<BoxDimensions, LayoutError> {
        self.caches
            .dimensions
            .get(&node)
            .copied()
            .ok_or(LayoutError::MissingDimensions {
                node,
                context: "layout tree",
            })
    }

    fn is_displayed(&self, node: NodeId) -> bool {
        self.styles
            .get(&node)
            .is_some_and(|s| s.display() != Display::None)
    }
}
