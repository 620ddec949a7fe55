//! CSS Positioned Layout.
//!
//! [§ 9.3 Positioning schemes](https://www.w3.org/TR/CSS2/visuren.html#positioning-scheme)
//!
//! "In the absolute positioning model, a box is removed from the normal flow
//! entirely and assigned a position with respect to a containing block."
//!
//! Relative offsets are applied to a box that normal flow already placed.
//! Absolute and fixed boxes are resolved here against their containing
//! block, in scene coordinates (the viewport's origin is the scene origin
//! under the identity transform); the orchestrator converts the result back
//! to parent-relative coordinates.

use std::collections::HashMap;

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};
use trellis_dom::{DomTree, NodeId};

use crate::error::LayoutError;
use crate::style::StyleProperties;

use super::box_model::{BoxDimensions, EdgeSizes, Rect, Size};
use super::values::{AutoOr, LengthResolver};
use super::viewport::Viewport;

/// [§ 9.3.1 Choosing a positioning scheme: 'position' property](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
///
/// "The 'position' and 'float' properties determine which of the CSS 2
/// positioning algorithms is used to calculate the position of a box."
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, AsRefStr, Serialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PositionType {
    /// "The box is a normal box, laid out according to the normal flow."
    #[default]
    Static,
    /// "The box's position is calculated according to the normal flow.
    /// Then the box is offset relative to its normal position."
    Relative,
    /// "The box's position (and possibly size) is specified with the
    /// 'top', 'right', 'bottom', and 'left' properties."
    Absolute,
    /// "The box's position is calculated according to the 'absolute' model,
    /// but the box is fixed with respect to some reference."
    Fixed,
}

impl PositionType {
    /// `position: static`.
    #[must_use]
    pub const fn is_static(self) -> bool {
        matches!(self, Self::Static)
    }

    /// "An element is said to be positioned if its 'position' property has
    /// a value other than 'static'."
    #[must_use]
    pub const fn is_positioned(self) -> bool {
        !self.is_static()
    }

    /// Absolute and fixed boxes are taken out of normal flow.
    #[must_use]
    pub const fn is_out_of_flow(self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }
}

/// [§ 9.3.2 Box offsets: 'top', 'right', 'bottom', 'left'](https://www.w3.org/TR/CSS2/visuren.html#position-props)
///
/// Resolved offsets in pixels. `None` is `auto`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxOffsets {
    /// Offset of the top margin edge below the reference top edge.
    pub top: Option<f32>,
    /// Offset of the right margin edge left of the reference right edge.
    pub right: Option<f32>,
    /// Offset of the bottom margin edge above the reference bottom edge.
    pub bottom: Option<f32>,
    /// Offset of the left margin edge right of the reference left edge.
    pub left: Option<f32>,
}

impl BoxOffsets {
    /// "`<percentage>` The offset is a percentage of the containing block's
    /// width (for 'left' or 'right') or height (for 'top' or 'bottom')."
    ///
    /// # Errors
    ///
    /// A percentage offset with no containing-block size on its axis.
    pub fn resolve(
        style: &StyleProperties,
        reference: Size,
        resolver: &LengthResolver,
    ) -> Result<Self, LayoutError> {
        let width = Some(reference.width);
        let height = Some(reference.height);
        Ok(Self {
            top: resolver.auto_length("top", style.top, height)?.length(),
            right: resolver.auto_length("right", style.right, width)?.length(),
            bottom: resolver.auto_length("bottom", style.bottom, height)?.length(),
            left: resolver.auto_length("left", style.left, width)?.length(),
        })
    }
}

/// [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
///
/// "If the element has 'position: absolute', the containing block is
/// established by the nearest ancestor with a 'position' of 'absolute',
/// 'relative' or 'fixed'." A `transform` or `perspective` also establishes
/// one ([CSS Transforms § 2](https://www.w3.org/TR/css-transforms-1/#containing-block-for-all-descendants)).
#[must_use]
pub fn establishes_containing_block(style: &StyleProperties) -> bool {
    style.position().is_positioned() || style.has_transform() || style.has_perspective()
}

/// The nearest ancestor of `node` that establishes a containing block for
/// absolutely positioned descendants, or `None` for the viewport.
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn containing_block_ancestor(
    tree: &DomTree,
    node: NodeId,
    styles: &HashMap<NodeId, StyleProperties>,
) -> Option<NodeId> {
    tree.ancestors(node)
        .find(|ancestor| styles.get(ancestor).is_some_and(establishes_containing_block))
}

/// A resolved containing block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContainingBlock {
    /// The establishing element, `None` for the viewport.
    pub node: Option<NodeId>,
    /// Its content rectangle in scene coordinates.
    pub rect: Rect,
}

impl ContainingBlock {
    /// The initial containing block.
    #[must_use]
    pub const fn viewport(viewport: &Viewport) -> Self {
        Self {
            node: None,
            rect: viewport.rect(),
        }
    }

    /// Returns true when the viewport is the containing block.
    #[must_use]
    pub const fn is_viewport(&self) -> bool {
        self.node.is_none()
    }
}

/// Containing blocks of out-of-flow elements, keyed by the positioned
/// element.
///
/// Entries persist across passes until invalidated. Invalidating an element
/// drops its own entry and every entry whose containing block it
/// establishes.
#[derive(Debug, Clone, Default)]
pub struct ContainingBlockCache {
    entries: HashMap<NodeId, ContainingBlock>,
}

impl ContainingBlockCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached containing block of `node`.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&ContainingBlock> {
        self.entries.get(&node)
    }

    /// Record the containing block of `node`, replacing any previous entry.
    pub fn insert(&mut self, node: NodeId, block: ContainingBlock) {
        let _ = self.entries.insert(node, block);
    }

    /// Drop `node`'s entry and all entries established by `node`.
    pub fn invalidate(&mut self, node: NodeId) {
        let _ = self.entries.remove(&node);
        self.entries.retain(|_, block| block.node != Some(node));
    }

    /// Invalidate `root` and every descendant.
    pub fn invalidate_subtree(&mut self, tree: &DomTree, root: NodeId) {
        self.invalidate(root);
        for node in tree.descendants(root) {
            self.invalidate(node);
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The chain of containing blocks above `node`, nearest first, ending
    /// at the viewport (`None`).
    ///
    /// Each step is the containing block an absolutely positioned element
    /// at that level would use.
    #[must_use]
    #[allow(clippy::implicit_hasher)]
    pub fn chain(
        tree: &DomTree,
        node: NodeId,
        styles: &HashMap<NodeId, StyleProperties>,
    ) -> Vec<Option<NodeId>> {
        let mut chain = Vec::new();
        let mut current = node;
        while let Some(ancestor) = containing_block_ancestor(tree, current, styles) {
            chain.push(Some(ancestor));
            current = ancestor;
        }
        chain.push(None);
        chain
    }
}

/// Layout engine for positioned elements.
///
/// [§ 9.3 Positioning schemes](https://www.w3.org/TR/CSS2/visuren.html#positioning-scheme)
pub struct PositionedLayout;

impl PositionedLayout {
    /// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
    ///
    /// "Once a box has been laid out according to the normal flow, it may be
    /// shifted relative to its normal position."
    ///
    /// "Offsetting a box (B1) in this way has no effect on the box (B2) that
    /// follows." The caller has already advanced past the unshifted box.
    pub fn layout_relative(box_dims: &mut BoxDimensions, offsets: &BoxOffsets) {
        // STEP 1: Horizontal.
        //
        // "If neither 'left' nor 'right' is 'auto', the position is
        //  over-constrained, and one of them has to be ignored. If the
        //  'direction' property of the containing block is 'ltr', the value
        //  of 'left' wins."
        let offset_x = match (offsets.left, offsets.right) {
            (None, None) => 0.0,
            (Some(left), _) => left,
            (None, Some(right)) => -right,
        };

        // STEP 2: Vertical.
        //
        // "If neither is 'auto', 'bottom' is ignored."
        let offset_y = match (offsets.top, offsets.bottom) {
            (None, None) => 0.0,
            (Some(top), _) => top,
            (None, Some(bottom)) => -bottom,
        };

        box_dims.content.x += offset_x;
        box_dims.content.y += offset_y;
    }

    /// [§ 10.3.7 Absolutely positioned, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
    ///
    /// "'left' + 'margin-left' + 'border-left-width' + 'padding-left' + 'width' +
    /// 'padding-right' + 'border-right-width' + 'margin-right' + 'right'
    /// = width of containing block"
    ///
    /// Resolution per axis:
    /// - both offsets and an `auto` size: the size is whatever is left
    ///   between the offsets;
    /// - both offsets and a definite size: over-constrained, `right`
    ///   (`bottom`) is ignored;
    /// - one offset: the box is pinned to that edge;
    /// - no offsets: the box keeps its static position.
    ///
    /// `auto` sizes that are not derived from offsets use `intrinsic`.
    /// Percentages, including those in padding, border and margin, resolve
    /// against the containing block. The returned rectangles are in the
    /// same coordinate space as `containing_block`.
    ///
    /// # Errors
    ///
    /// Fails when an offset or edge cannot be resolved.
    pub fn layout_absolute(
        style: &StyleProperties,
        containing_block: Rect,
        static_origin: (f32, f32),
        intrinsic: Size,
        resolver: &LengthResolver,
    ) -> Result<BoxDimensions, LayoutError> {
        let cb_width = Some(containing_block.width);
        let cb_height = Some(containing_block.height);

        // STEP 1: Edges and sizes against the containing block.
        let mut dims = BoxDimensions {
            content: Rect::default(),
            padding: resolver.edges("padding", style.padding_edges(), cb_width)?,
            border: resolver.edges("border-width", style.border_edges(), cb_width)?,
            margin: resolver
                .auto_edges("margin", style.margin_edges(), cb_width)?
                .or_zero(),
        };
        let width = resolver.auto_length("width", style.width, cb_width)?;
        let height = resolver.auto_length("height", style.height, cb_height)?;
        let offsets = BoxOffsets::resolve(style, containing_block.size(), resolver)?;

        // STEP 2: Horizontal constraint.
        let (content_width, x) = solve_axis(
            offsets.left,
            offsets.right,
            width,
            intrinsic.width,
            dims.extra_width(),
            containing_block.x,
            containing_block.width,
            static_origin.0,
        );

        // STEP 3: Vertical constraint.
        //
        // [§ 10.6.4](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-height)
        let (content_height, y) = solve_axis(
            offsets.top,
            offsets.bottom,
            height,
            intrinsic.height,
            dims.extra_height(),
            containing_block.y,
            containing_block.height,
            static_origin.1,
        );

        // STEP 4: Place the margin box.
        dims.content.width = content_width;
        dims.content.height = content_height;
        dims.set_margin_origin(x, y);
        Ok(dims)
    }

    /// [§ 9.3.1 Fixed positioning](https://www.w3.org/TR/CSS2/visuren.html#fixed-positioning)
    ///
    /// "Fixed positioning is a subcategory of absolute positioning. The only
    /// difference is that for a fixed positioned box, the containing block is
    /// established by the viewport."
    ///
    /// The box is resolved in viewport space, then carried into scene space
    /// through the viewport transform. `static_origin` is in scene space.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::layout_absolute`].
    pub fn layout_fixed(
        style: &StyleProperties,
        viewport: &Viewport,
        static_origin: (f32, f32),
        intrinsic: Size,
        resolver: &LengthResolver,
    ) -> Result<BoxDimensions, LayoutError> {
        let transform = viewport.transform;
        let scale = if transform.scale > 0.0 { transform.scale } else { 1.0 };
        let static_in_viewport = (
            (static_origin.0 - transform.scroll_x) / scale,
            (static_origin.1 - transform.scroll_y) / scale,
        );

        let dims = Self::layout_absolute(
            style,
            viewport.rect(),
            static_in_viewport,
            intrinsic,
            resolver,
        )?;

        let scale_edges = |edges: EdgeSizes| EdgeSizes {
            top: edges.top * scale,
            right: edges.right * scale,
            bottom: edges.bottom * scale,
            left: edges.left * scale,
        };
        Ok(BoxDimensions {
            content: transform.viewport_to_scene(dims.content),
            padding: scale_edges(dims.padding),
            border: scale_edges(dims.border),
            margin: scale_edges(dims.margin),
        })
    }
}

/// Solve one axis of the absolute-positioning constraint.
///
/// Returns `(content_size, margin_box_start)`.
#[allow(clippy::too_many_arguments)]
fn solve_axis(
    start: Option<f32>,
    end: Option<f32>,
    size: AutoOr,
    intrinsic: f32,
    extra: f32,
    cb_start: f32,
    cb_size: f32,
    static_start: f32,
) -> (f32, f32) {
    match (start, end, size) {
        // "'left' and 'right' are not 'auto': solve for 'width'."
        (Some(start), Some(end), AutoOr::Auto) => {
            ((cb_size - start - end - extra).max(0.0), cb_start + start)
        }
        // Over-constrained or pinned to the start edge.
        (Some(start), _, size) => (size.to_px_or(intrinsic).max(0.0), cb_start + start),
        // Pinned to the end edge.
        (None, Some(end), size) => {
            let content = size.to_px_or(intrinsic).max(0.0);
            (content, cb_start + cb_size - end - content - extra)
        }
        // "set 'left' to the static position"
        (None, None, size) => (size.to_px_or(intrinsic).max(0.0), static_start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_keywords_parse() {
        assert_eq!("absolute".parse::<PositionType>(), Ok(PositionType::Absolute));
        assert!("sticky".parse::<PositionType>().is_err());
        assert!(PositionType::Fixed.is_out_of_flow());
        assert!(!PositionType::Relative.is_out_of_flow());
    }

    #[test]
    fn test_solve_axis_derives_size_between_offsets() {
        let (size, start) = solve_axis(Some(10.0), Some(20.0), AutoOr::Auto, 0.0, 4.0, 0.0, 200.0, 0.0);
        assert_eq!(size, 166.0);
        assert_eq!(start, 10.0);
    }

    #[test]
    fn test_solve_axis_ignores_end_when_over_constrained() {
        let (size, start) =
            solve_axis(Some(10.0), Some(20.0), AutoOr::Length(50.0), 0.0, 0.0, 5.0, 200.0, 0.0);
        assert_eq!(size, 50.0);
        assert_eq!(start, 15.0);
    }
}
