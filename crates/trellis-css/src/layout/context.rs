//! Per-pass layout state.
//!
//! A [`LayoutContext`] is created for every layout pass and handed by
//! reference to each step of it. It borrows the inputs (tree, resolved
//! styles, viewport, collaborators) and the engine's [`LayoutCaches`],
//! and owns what only lives for the pass: diagnostics and the queue of
//! out-of-flow elements.

use std::collections::{HashMap, VecDeque};

use log::warn;
use trellis_dom::{DomTree, NodeId};

use crate::error::{Diagnostic, DiagnosticKind, LayoutError};
use crate::style::{AutoLength, Display, StyleProperties};

use super::box_model::{BoxDimensions, Size};
use super::config::LayoutConfig;
use super::positioned::ContainingBlockCache;
use super::text::{FontProperties, TextMeasurer, TextMetrics};
use super::values::LengthResolver;
use super::viewport::Viewport;

/// Which axes of an element's size are `auto` for the purposes of
/// content-based sizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutoAxes {
    /// Width depends on content.
    pub width: bool,
    /// Height depends on content.
    pub height: bool,
}

impl AutoAxes {
    /// Both axes definite.
    pub const DEFINITE: Self = Self {
        width: false,
        height: false,
    };

    /// Read from `width`/`height`; unset reads as `auto`.
    #[must_use]
    pub fn from_style(style: &StyleProperties) -> Self {
        let is_auto = |value: Option<AutoLength>| value.is_none_or(|v| v.is_auto());
        Self {
            width: is_auto(style.width),
            height: is_auto(style.height),
        }
    }
}

/// Per-element results that outlive a pass, keyed by element.
///
/// Entries must be invalidated before an element is laid out again.
#[derive(Debug, Clone, Default)]
pub struct LayoutCaches {
    /// Resolved, parent-relative geometry.
    pub dimensions: HashMap<NodeId, BoxDimensions>,
    /// Which axes were sized from content.
    pub auto_axes: HashMap<NodeId, AutoAxes>,
    /// Containing blocks of out-of-flow elements.
    pub containing_blocks: ContainingBlockCache,
    /// List marker labels.
    pub markers: HashMap<NodeId, String>,
    /// Wrapped lines of text-bearing elements.
    pub text_lines: HashMap<NodeId, Vec<String>>,
}

impl LayoutCaches {
    /// Drop everything.
    pub fn clear(&mut self) {
        self.dimensions.clear();
        self.auto_axes.clear();
        self.containing_blocks.clear();
        self.markers.clear();
        self.text_lines.clear();
    }

    /// Drop the entries of every descendant of `root`. The entry of `root`
    /// itself is kept, except for its containing-block entries.
    pub fn invalidate_descendants(&mut self, tree: &DomTree, root: NodeId) {
        self.containing_blocks.invalidate_subtree(tree, root);
        for node in tree.descendants(root) {
            let _ = self.dimensions.remove(&node);
            let _ = self.auto_axes.remove(&node);
            let _ = self.markers.remove(&node);
            let _ = self.text_lines.remove(&node);
        }
    }
}

/// State of one layout pass.
pub struct LayoutContext<'a> {
    /// The element tree.
    pub tree: &'a DomTree,
    /// Resolved style of every element.
    pub styles: &'a HashMap<NodeId, StyleProperties>,
    /// Viewport for this pass.
    pub viewport: Viewport,
    /// Length resolver bound to the viewport.
    pub resolver: LengthResolver,
    /// Engine constants.
    pub config: &'a LayoutConfig,
    /// Text measurement.
    pub measurer: &'a dyn TextMeasurer,
    /// Content sizes supplied by the host through updates.
    pub intrinsic: &'a HashMap<NodeId, Size>,
    /// Cross-pass caches.
    pub caches: &'a mut LayoutCaches,
    /// Recovered conditions found so far.
    pub diagnostics: Vec<Diagnostic>,
    /// Absolute and fixed elements waiting for their containing blocks.
    pub out_of_flow: VecDeque<NodeId>,
}

impl<'a> LayoutContext<'a> {
    /// Start a pass.
    #[allow(clippy::too_many_arguments, clippy::implicit_hasher)]
    pub fn new(
        tree: &'a DomTree,
        styles: &'a HashMap<NodeId, StyleProperties>,
        viewport: Viewport,
        config: &'a LayoutConfig,
        measurer: &'a dyn TextMeasurer,
        intrinsic: &'a HashMap<NodeId, Size>,
        caches: &'a mut LayoutCaches,
    ) -> Self {
        Self {
            tree,
            styles,
            viewport,
            resolver: LengthResolver::new(viewport.size()),
            config,
            measurer,
            intrinsic,
            caches,
            diagnostics: Vec::new(),
            out_of_flow: VecDeque::new(),
        }
    }

    /// The resolved style of `node`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] when `node` has no resolved style.
    pub fn style(&self, node: NodeId) -> Result<&'a StyleProperties, LayoutError> {
        self.styles.get(&node).ok_or(LayoutError::UnknownNode(node))
    }

    /// Whether `node` generates a box.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::style`].
    pub fn is_displayed(&self, node: NodeId) -> Result<bool, LayoutError> {
        Ok(self.style(node)?.display() != Display::None)
    }

    /// The cached geometry of `node`. A miss is a structural error.
    ///
    /// # Errors
    ///
    /// [`LayoutError::MissingDimensions`] on a cache miss.
    pub fn dimension(
        &self,
        node: NodeId,
        context: &'static str,
    ) -> Result<BoxDimensions, LayoutError> {
        self.caches
            .dimensions
            .get(&node)
            .copied()
            .ok_or(LayoutError::MissingDimensions { node, context })
    }

    /// Record the geometry of `node`.
    pub fn store(&mut self, node: NodeId, dims: BoxDimensions) {
        let _ = self.caches.dimensions.insert(node, dims);
    }

    /// Record which axes of `node` are content-sized.
    pub fn store_axes(&mut self, node: NodeId, axes: AutoAxes) {
        let _ = self.caches.auto_axes.insert(node, axes);
    }

    /// The content-sized axes of `node`; unknown elements are definite.
    #[must_use]
    pub fn axes(&self, node: NodeId) -> AutoAxes {
        self.caches
            .auto_axes
            .get(&node)
            .copied()
            .unwrap_or(AutoAxes::DEFINITE)
    }

    /// Attach a recovered condition to the pass. Identical diagnostics are
    /// recorded once.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        if self.diagnostics.contains(&diagnostic) {
            return;
        }
        warn!("layout diagnostic on {}: {:?}", diagnostic.node, diagnostic.kind);
        self.diagnostics.push(diagnostic);
    }

    /// Origin of `node`'s content box in scene coordinates: the sum of the
    /// parent-relative offsets along its ancestor chain.
    ///
    /// # Errors
    ///
    /// Fails when an element on the ancestor chain has no stored box.
    pub fn absolute_content_origin(&self, node: NodeId) -> Result<(f32, f32), LayoutError> {
        let mut x = 0.0;
        let mut y = 0.0;
        let mut current = Some(node);
        while let Some(id) = current {
            let dims = self.dimension(id, "absolute position")?;
            x += dims.content.x;
            y += dims.content.y;
            current = self.tree.parent(id);
        }
        Ok((x, y))
    }

    /// Measure the literal text of `node`, if it has any, wrapping at
    /// `max_width`. The lines are cached for the output tree.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::style`].
    pub fn measure_text(
        &mut self,
        node: NodeId,
        max_width: Option<f32>,
    ) -> Result<Option<TextMetrics>, LayoutError> {
        let tree = self.tree;
        let Some(text) = tree.text(node).filter(|t| !t.trim().is_empty()) else {
            return Ok(None);
        };
        let font = FontProperties::from_style(self.style(node)?, &self.resolver);
        let metrics = self.measurer.measure(text, &font, max_width);
        let _ = self
            .caches
            .text_lines
            .insert(node, metrics.lines.clone());
        Ok(Some(metrics))
    }

    /// Content size of `node` from its declarations alone: a host-supplied
    /// size, explicit `width`/`height`, measured text, or the stacked sizes
    /// of its in-flow children. `None` when there is nothing to go on.
    ///
    /// Percentages resolve against `available`.
    ///
    /// # Errors
    ///
    /// A percentage size with no reference, or an unknown element.
    pub fn declared_size(
        &mut self,
        node: NodeId,
        available: Size,
    ) -> Result<Option<Size>, LayoutError> {
        if let Some(size) = self.intrinsic.get(&node) {
            return Ok(Some(*size));
        }
        let style = self.style(node)?;
        let width = self
            .resolver
            .auto_length("width", style.width, Some(available.width))?
            .length();
        let height = self
            .resolver
            .auto_length("height", style.height, Some(available.height))?
            .length();
        if let (Some(width), Some(height)) = (width, height) {
            return Ok(Some(Size::new(width, height)));
        }

        let inner_width = width.unwrap_or(available.width);
        let content = self.content_extent(node, Size::new(inner_width, available.height))?;
        Ok(content.map(|c| {
            Size::new(
                width.unwrap_or(c.width).max(0.0),
                height.unwrap_or(c.height).max(0.0),
            )
        }))
    }

    /// [`Self::declared_size`], falling back to the configured default leaf
    /// size. The fallback is reported.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::declared_size`].
    pub fn intrinsic_size(&mut self, node: NodeId, available: Size) -> Result<Size, LayoutError> {
        if let Some(size) = self.declared_size(node, available)? {
            return Ok(size);
        }
        let style = self.style(node)?;
        let fallback = Size::new(self.config.default_leaf_width, self.config.default_leaf_height);
        self.record(Diagnostic {
            node,
            kind: DiagnosticKind::ContentSizingFallback {
                width: fallback.width,
                height: fallback.height,
            },
        });
        let width = self
            .resolver
            .auto_length("width", style.width, Some(available.width))?
            .to_px_or(fallback.width);
        let height = self
            .resolver
            .auto_length("height", style.height, Some(available.height))?
            .to_px_or(fallback.height);
        Ok(Size::new(width, height))
    }

    /// Border-box size from [`Self::declared_size`]: the content size plus
    /// padding and border.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::declared_size`], or on an unresolvable edge.
    pub fn declared_border_box(
        &mut self,
        node: NodeId,
        available: Size,
    ) -> Result<Option<Size>, LayoutError> {
        let Some(content) = self.declared_size(node, available)? else {
            return Ok(None);
        };
        let style = self.style(node)?;
        let reference = Some(available.width);
        let padding = self
            .resolver
            .edges("padding", style.padding_edges(), reference)?;
        let border = self
            .resolver
            .edges("border-width", style.border_edges(), reference)?;
        Ok(Some(Size::new(
            content.width + padding.horizontal() + border.horizontal(),
            content.height + padding.vertical() + border.vertical(),
        )))
    }

    /// Size of `node`'s own content without laying it out: its text, plus
    /// its in-flow children placed side by side for a row flex container
    /// and stacked otherwise.
    fn content_extent(
        &mut self,
        node: NodeId,
        available: Size,
    ) -> Result<Option<Size>, LayoutError> {
        let style = self.style(node)?;
        let stacks_horizontally =
            style.display() == Display::Flex && style.flex_direction().is_row();

        let mut extent: Option<Size> = self
            .measure_text(node, Some(available.width))?
            .map(|metrics| Size::new(metrics.width, metrics.height));

        let tree = self.tree;
        for &child in tree.children(node) {
            let child_style = self.style(child)?;
            if child_style.display() == Display::None || child_style.position().is_out_of_flow()
            {
                continue;
            }
            let content = self.intrinsic_size(child, available)?;
            let reference = Some(available.width);
            let padding = self
                .resolver
                .edges("padding", child_style.padding_edges(), reference)?;
            let border = self
                .resolver
                .edges("border-width", child_style.border_edges(), reference)?;
            let margin = self
                .resolver
                .auto_edges("margin", child_style.margin_edges(), reference)?
                .or_zero();
            let outer = Size::new(
                content.width + padding.horizontal() + border.horizontal() + margin.horizontal(),
                content.height + padding.vertical() + border.vertical() + margin.vertical(),
            );
            let current = extent.unwrap_or_default();
            extent = Some(if stacks_horizontally {
                Size::new(current.width + outer.width, current.height.max(outer.height))
            } else {
                Size::new(current.width.max(outer.width), current.height + outer.height)
            });
        }
        Ok(extent)
    }

    /// Hand the collected diagnostics to the caller.
    #[must_use]
    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
