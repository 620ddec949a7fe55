//! Layout entry points.
//!
//! A [`LayoutEngine`] owns the caches that persist between passes. A full
//! pass ([`LayoutEngine::layout`]) discards them and lays out the whole
//! tree. A partial pass ([`LayoutEngine::update`]) re-lays out only the
//! smallest subtree a changed content size can affect.

use std::collections::HashMap;

use log::{debug, info};
use serde::Serialize;
use trellis_dom::{DomTree, NodeId};

use crate::cascade::{StyleResolver, compute_styles};
use crate::error::{Diagnostic, LayoutError};
use crate::style::{Display, StyleProperties};

use super::box_model::{BoxDimensions, Size};
use super::config::LayoutConfig;
use super::context::{AutoAxes, LayoutCaches, LayoutContext};
use super::layout_box::{BoxAssembler, LayoutBox};
use super::positioned::ContainingBlock;
use super::stacking::StackingContexts;
use super::text::{ApproximateTextMeasurer, TextMeasurer};
use super::viewport::{Viewport, ViewportProvider};

/// Result of a full layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutOutput {
    /// The layout tree.
    pub root: LayoutBox,
    /// Recovered conditions found during the pass.
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of [`LayoutEngine::update`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutUpdate {
    /// The element the re-layout started from.
    pub relayout_root: NodeId,
    /// Elements whose geometry changed, in id order.
    pub changed: Vec<NodeId>,
    /// New boxes of the changed elements, without children.
    pub boxes: Vec<LayoutBox>,
    /// Recovered conditions found during the re-layout.
    pub diagnostics: Vec<Diagnostic>,
}

/// The layout engine.
///
/// ```
/// use trellis_css::{LayoutEngine, RuleSetResolver, Viewport};
/// use trellis_dom::{DomTree, ElementData, ElementKind};
///
/// let mut tree = DomTree::new(ElementData::new(ElementKind::Div));
/// let root = tree.root();
/// let _child = tree.append_element(root, ElementData::new(ElementKind::Div));
///
/// let mut engine = LayoutEngine::new();
/// let output = engine
///     .layout(&tree, &RuleSetResolver::new(), &Viewport::new(800.0, 600.0))
///     .unwrap();
/// assert_eq!(output.root.dimensions.content.width, 800.0);
/// ```
pub struct LayoutEngine {
    config: LayoutConfig,
    measurer: Box<dyn TextMeasurer>,
    caches: LayoutCaches,
    stacking: StackingContexts,
    intrinsic: HashMap<NodeId, Size>,
    /// Viewport of the last successful pass.
    viewport: Option<Viewport>,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    /// An engine with the default configuration and
    /// [`ApproximateTextMeasurer`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    /// An engine with custom constants.
    #[must_use]
    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            config,
            measurer: Box::new(ApproximateTextMeasurer),
            caches: LayoutCaches::default(),
            stacking: StackingContexts::new(&config),
            intrinsic: HashMap::new(),
            viewport: None,
        }
    }

    /// Replace the text measurer.
    #[must_use]
    pub fn with_text_measurer(mut self, measurer: impl TextMeasurer + 'static) -> Self {
        self.measurer = Box::new(measurer);
        self
    }

    /// The engine constants.
    #[must_use]
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out the whole tree.
    ///
    /// Every cache is discarded first. On error nothing is returned and the
    /// next [`Self::update`] falls back to a full pass.
    ///
    /// # Errors
    ///
    /// A non-finite viewport, or any structural failure during the pass.
    pub fn layout(
        &mut self,
        tree: &DomTree,
        resolver: &dyn StyleResolver,
        viewport: &dyn ViewportProvider,
    ) -> Result<LayoutOutput, LayoutError> {
        let viewport = viewport.viewport();
        let styles = compute_styles(tree, resolver);
        let diagnostics = self.full_pass(tree, &styles, viewport)?;
        let root = BoxAssembler::new(tree, &styles, &self.caches, &self.stacking)
            .tree(tree.root(), (0.0, 0.0))?;
        info!(
            "laid out {} elements with {} diagnostics",
            self.caches.dimensions.len(),
            diagnostics.len()
        );
        Ok(LayoutOutput { root, diagnostics })
    }

    /// Record a new content size for `node` and re-lay out what it affects.
    ///
    /// The size replaces the content-derived size on `node`'s `auto` axes
    /// and stays in effect for later passes until
    /// [`Self::clear_intrinsic_sizes`].
    ///
    /// The re-layout starts at the nearest ancestor-or-self whose own size
    /// cannot change: explicit `width` and `height`, and not placed by a
    /// flex, table or list parent (out-of-flow elements are exempt from the
    /// last rule). When that is the root, the viewport changed, or no pass
    /// has run yet, the whole tree is laid out again. For an element inside
    /// a `display: none` subtree only the size is recorded, and the result
    /// is empty.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for an id outside `tree`,
    /// [`LayoutError::NonFinite`] for a NaN or infinite size, and any
    /// structural failure of the re-layout.
    pub fn update(
        &mut self,
        tree: &DomTree,
        resolver: &dyn StyleResolver,
        viewport: &dyn ViewportProvider,
        node: NodeId,
        size: Size,
    ) -> Result<LayoutUpdate, LayoutError> {
        if tree.get(node).is_none() {
            return Err(LayoutError::UnknownNode(node));
        }
        if !size.width.is_finite() {
            return Err(LayoutError::NonFinite {
                property: "width",
                node,
            });
        }
        if !size.height.is_finite() {
            return Err(LayoutError::NonFinite {
                property: "height",
                node,
            });
        }
        let _ = self
            .intrinsic
            .insert(node, Size::new(size.width.max(0.0), size.height.max(0.0)));

        let viewport = viewport.viewport();
        let styles = compute_styles(tree, resolver);

        // A hidden element has no box to re-lay out. The size is kept for
        // when it is shown again.
        let hidden = std::iter::once(node)
            .chain(tree.ancestors(node))
            .any(|id| styles.get(&id).is_some_and(|s| s.display() == Display::None));
        if hidden {
            debug!("update of {node}: inside a display:none subtree, nothing to do");
            return Ok(LayoutUpdate {
                relayout_root: node,
                changed: Vec::new(),
                boxes: Vec::new(),
                diagnostics: Vec::new(),
            });
        }

        let before = self.caches.dimensions.clone();
        let root = relayout_root(tree, &styles, node);
        let full = root == tree.root() || self.viewport != Some(viewport);

        // STEP 1: Re-layout.
        let (relayout_root, diagnostics) = if full {
            debug!("update of {node}: full pass");
            (tree.root(), self.full_pass(tree, &styles, viewport)?)
        } else {
            debug!("update of {node}: re-layout from {root}");
            (root, self.partial_pass(tree, &styles, viewport, root)?)
        };

        // STEP 2: Changed boxes.
        let changed: Vec<NodeId> = {
            let mut ids: Vec<NodeId> = self
                .caches
                .dimensions
                .iter()
                .filter(|(id, dims)| before.get(id) != Some(dims))
                .map(|(id, _)| *id)
                .collect();
            ids.sort_unstable();
            ids
        };
        let assembler = BoxAssembler::new(tree, &styles, &self.caches, &self.stacking);
        let boxes = changed
            .iter()
            .filter(|id| styles.get(id).is_some_and(|s| s.display() != Display::None))
            .map(|&id| assembler.detached(id))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LayoutUpdate {
            relayout_root,
            changed,
            boxes,
            diagnostics,
        })
    }

    /// Forget every size recorded through [`Self::update`].
    pub fn clear_intrinsic_sizes(&mut self) {
        self.intrinsic.clear();
    }

    /// Geometry of `node` from the last pass.
    #[must_use]
    pub fn dimensions(&self, node: NodeId) -> Option<&BoxDimensions> {
        self.caches.dimensions.get(&node)
    }

    /// Containing block `node` was resolved against, for absolute and fixed
    /// elements.
    #[must_use]
    pub fn containing_block(&self, node: NodeId) -> Option<&ContainingBlock> {
        self.caches.containing_blocks.get(node)
    }

    /// The stacking tree from the last pass.
    #[must_use]
    pub const fn stacking(&self) -> &StackingContexts {
        &self.stacking
    }

    fn full_pass(
        &mut self,
        tree: &DomTree,
        styles: &HashMap<NodeId, StyleProperties>,
        viewport: Viewport,
    ) -> Result<Vec<Diagnostic>, LayoutError> {
        self.viewport = None;
        check_viewport(tree, viewport)?;
        self.caches.clear();

        let mut cx = LayoutContext::new(
            tree,
            styles,
            viewport,
            &self.config,
            self.measurer.as_ref(),
            &self.intrinsic,
            &mut self.caches,
        );
        cx.layout_root()?;
        cx.layout_out_of_flow()?;
        let diagnostics = cx.finish();

        self.stacking = StackingContexts::build(tree, styles, &self.config);
        self.viewport = Some(viewport);
        Ok(diagnostics)
    }

    fn partial_pass(
        &mut self,
        tree: &DomTree,
        styles: &HashMap<NodeId, StyleProperties>,
        viewport: Viewport,
        root: NodeId,
    ) -> Result<Vec<Diagnostic>, LayoutError> {
        if !self.caches.dimensions.contains_key(&root) {
            return Err(LayoutError::MissingDimensions {
                node: root,
                context: "re-layout root",
            });
        }
        self.viewport = None;
        self.caches.invalidate_descendants(tree, root);

        let mut cx = LayoutContext::new(
            tree,
            styles,
            viewport,
            &self.config,
            self.measurer.as_ref(),
            &self.intrinsic,
            &mut self.caches,
        );
        cx.layout_subtree(root, false)?;
        cx.layout_out_of_flow()?;
        let diagnostics = cx.finish();

        self.stacking = StackingContexts::build(tree, styles, &self.config);
        self.viewport = Some(viewport);
        Ok(diagnostics)
    }
}

/// Reject a viewport no length can be resolved against.
fn check_viewport(tree: &DomTree, viewport: Viewport) -> Result<(), LayoutError> {
    let checks = [
        ("viewport width", viewport.width),
        ("viewport height", viewport.height),
        ("viewport scale", viewport.transform.scale),
        ("viewport scroll-x", viewport.transform.scroll_x),
        ("viewport scroll-y", viewport.transform.scroll_y),
    ];
    match checks.iter().find(|(_, value)| !value.is_finite()) {
        Some(&(property, _)) => Err(LayoutError::NonFinite {
            property,
            node: tree.root(),
        }),
        None => Ok(()),
    }
}

/// The nearest ancestor-or-self of `node` whose border box does not depend
/// on its content or its siblings.
fn relayout_root(
    tree: &DomTree,
    styles: &HashMap<NodeId, StyleProperties>,
    node: NodeId,
) -> NodeId {
    let mut current = node;
    while let Some(parent) = tree.parent(current) {
        let style = styles.get(&current);
        let fixed_size = style.is_some_and(|s| AutoAxes::from_style(s) == AutoAxes::DEFINITE);
        let out_of_flow = style.is_some_and(|s| s.position().is_out_of_flow());
        let grouped = styles.get(&parent).is_some_and(|p| {
            matches!(
                p.display(),
                Display::Flex
                    | Display::Table
                    | Display::List
                    | Display::TableRow
                    | Display::TableRowGroup
                    | Display::TableHeaderGroup
                    | Display::TableFooterGroup
            )
        });
        if fixed_size && (out_of_flow || !grouped) {
            return current;
        }
        current = parent;
    }
    current
}
