//! CSS Stacking Contexts and Painting Order.
//!
//! [§ 9.9 Layered presentation](https://www.w3.org/TR/CSS2/visuren.html#layers)
//!
//! "An element in CSS 2 may have a stack level, which describes its position
//! within a set of elements sharing the same stacking context."
//!
//! [CSS 2.1 Appendix E: Elaborate description of Stacking Contexts](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! Stacking never moves boxes. It produces a scalar depth per element, so a
//! renderer that sorts by depth alone gets nested contexts right, and a
//! back-to-front paint order that also breaks depth ties.

use std::collections::HashMap;

use log::debug;
use serde::Serialize;
use strum_macros::{AsRefStr, Display as StrumDisplay};
use trellis_dom::{DomTree, NodeId};

use crate::error::LayoutError;
use crate::style::{Display, StyleProperties};

use super::config::LayoutConfig;

/// [§ 9.9.1 Specifying the stack level: the 'z-index' property](https://www.w3.org/TR/CSS2/visuren.html#z-index)
///
/// "For a positioned box, the 'z-index' property specifies:
///
/// 1. The stack level of the box in the current stacking context.
/// 2. Whether the box establishes a stacking context."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZIndex {
    /// "The stack level of the generated box in the current stacking
    /// context is 0."
    #[default]
    Auto,
    /// "This integer is the stack level of the generated box in the current
    /// stacking context."
    Integer(i32),
}

impl ZIndex {
    /// "Value: auto | <integer>"
    ///
    /// # Errors
    ///
    /// [`LayoutError::MalformedValue`] for anything but `auto` or an integer.
    pub fn parse(raw: &str) -> Result<Self, LayoutError> {
        let value = raw.trim();
        if value.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        value
            .parse::<i32>()
            .map(Self::Integer)
            .map_err(|_| LayoutError::malformed("z-index", raw, "expected an integer or 'auto'"))
    }

    /// The stack level, 0 for `auto`.
    #[must_use]
    pub const fn level(self) -> i32 {
        match self {
            Self::Auto => 0,
            Self::Integer(z) => z,
        }
    }

    /// Returns true for an integer value.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Integer(_))
    }
}

/// Why an element forms a stacking context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay, AsRefStr, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum EstablishedBy {
    /// "The root element forms the root stacking context."
    Root,
    /// A positioned element with an integer `z-index`.
    PositionedZIndex,
    /// A `transform` other than `none`.
    Transform,
    /// `opacity` below 1.
    Opacity,
    /// [CSS Flexbox § 4.3](https://www.w3.org/TR/css-flexbox-1/#painting)
    ///
    /// "Flex items ... z-index values other than auto create a stacking
    /// context even if position is static."
    BareZIndex,
}

/// Whether a non-root element forms a stacking context.
///
/// `parent_display` is the display of the element's parent, used for the
/// flex-item rule.
#[must_use]
pub fn establishes_stacking_context(
    style: &StyleProperties,
    parent_display: Option<Display>,
) -> Option<EstablishedBy> {
    let z_index = style.z_index();
    let position = style.position();
    if position.is_positioned() && z_index.is_integer() {
        Some(EstablishedBy::PositionedZIndex)
    } else if style.has_transform() {
        Some(EstablishedBy::Transform)
    } else if style.opacity() < 1.0 {
        Some(EstablishedBy::Opacity)
    } else if z_index.is_integer() && parent_display == Some(Display::Flex) {
        Some(EstablishedBy::BareZIndex)
    } else {
        None
    }
}

/// A stacking context in the CSS painting order.
///
/// [§ Appendix E](https://www.w3.org/TR/CSS2/zindex.html)
///
/// "Each box belongs to one stacking context. Each positioned box in a given
/// stacking context has an integer stack level, which is its position on the
/// z-axis relative to other stack levels within the same stacking context."
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackingContext {
    /// The element forming the context.
    pub node: NodeId,
    /// The enclosing context, `None` for the root.
    pub parent: Option<NodeId>,
    /// Stack level within the parent context.
    pub z_index: i32,
    /// What made the element a stacking context.
    pub established_by: EstablishedBy,
    /// Pre-order index of the element in the document.
    pub document_order: usize,
    /// Child contexts, sorted by `(z_index, document_order)`.
    pub children: Vec<NodeId>,
}

/// The stacking-context tree of a document.
///
/// Entries are keyed by element and persist until rebuilt or removed.
#[derive(Debug, Clone, Default)]
pub struct StackingContexts {
    contexts: HashMap<NodeId, StackingContext>,
    /// For every element, the context it paints in. A context element
    /// paints in its parent context.
    owner: HashMap<NodeId, NodeId>,
    /// Elements that do not form a context, per owning context, in
    /// document order.
    members: HashMap<NodeId, Vec<NodeId>>,
    document_order: HashMap<NodeId, usize>,
    root: Option<NodeId>,
    /// Configured smallest multiplier between adjacent levels.
    min_base: f64,
    /// Multiplier in use, at least twice the largest `|z_index| + 1`.
    base: f64,
    /// Length of the longest chain of nested non-root contexts.
    levels: i32,
}

impl StackingContexts {
    /// An empty tree using the depth constants from `config`.
    #[must_use]
    pub fn new(config: &LayoutConfig) -> Self {
        let base = f64::from(config.depth_base);
        Self {
            min_base: base,
            base,
            ..Self::default()
        }
    }

    /// Build the tree for every displayed element of `tree`.
    ///
    /// Elements with `display: none` and their subtrees are skipped.
    #[must_use]
    #[allow(clippy::implicit_hasher)]
    pub fn build(
        tree: &DomTree,
        styles: &HashMap<NodeId, StyleProperties>,
        config: &LayoutConfig,
    ) -> Self {
        let mut contexts = Self::new(config);
        let root = tree.root();
        contexts.root = Some(root);
        let _ = contexts.document_order.insert(root, 0);
        contexts.attach(StackingContext {
            node: root,
            parent: None,
            z_index: 0,
            established_by: EstablishedBy::Root,
            document_order: 0,
            children: Vec::new(),
        });

        let is_displayed =
            |node: NodeId| styles.get(&node).is_none_or(|s| s.display() != Display::None);
        if !is_displayed(root) {
            contexts.rescale();
            return contexts;
        }

        // Pre-order walk, skipping hidden subtrees.
        let mut order = 0_usize;
        let mut stack: Vec<NodeId> = tree.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if !is_displayed(node) {
                continue;
            }
            order += 1;
            let _ = contexts.document_order.insert(node, order);

            let Some(parent) = tree.parent(node) else {
                continue;
            };
            let owning = if contexts.contexts.contains_key(&parent) {
                parent
            } else {
                contexts.owner.get(&parent).copied().unwrap_or(root)
            };
            let _ = contexts.owner.insert(node, owning);

            let style = styles.get(&node);
            let parent_display = styles.get(&parent).map(StyleProperties::display);
            match style.and_then(|s| establishes_stacking_context(s, parent_display)) {
                Some(established_by) => contexts.attach(StackingContext {
                    node,
                    parent: Some(owning),
                    z_index: style.map_or(0, |s| s.z_index().level()),
                    established_by,
                    document_order: order,
                    children: Vec::new(),
                }),
                None => contexts.members.entry(owning).or_default().push(node),
            }

            stack.extend(tree.children(node).iter().rev().copied());
        }

        contexts.rescale();
        debug!(
            "built {} stacking contexts, {} levels, base {}",
            contexts.contexts.len(),
            contexts.levels,
            contexts.base
        );
        contexts
    }

    /// Insert a context, or move it if it is already present.
    ///
    /// "Boxes with the same stack level in a stacking context are stacked
    /// back-to-front according to document tree order." Children stay
    /// sorted by `(z_index, document_order)`; inserting the same context
    /// twice leaves a single entry.
    pub fn insert(&mut self, context: StackingContext) {
        self.attach(context);
        self.rescale();
    }

    fn attach(&mut self, context: StackingContext) {
        let node = context.node;
        let previous = self.contexts.get(&node).and_then(|c| c.parent);
        if let Some(parent) = previous.and_then(|p| self.contexts.get_mut(&p)) {
            parent.children.retain(|child| *child != node);
        }

        let key = (context.z_index, context.document_order);
        if let Some(parent_id) = context.parent {
            let _ = self.owner.insert(node, parent_id);
            let position = self.contexts.get(&parent_id).map(|parent| {
                parent
                    .children
                    .iter()
                    .position(|child| {
                        self.contexts
                            .get(child)
                            .is_some_and(|c| (c.z_index, c.document_order) > key)
                    })
                    .unwrap_or(parent.children.len())
            });
            if let (Some(position), Some(parent)) = (position, self.contexts.get_mut(&parent_id)) {
                parent.children.insert(position, node);
            }
        }

        let children = self
            .contexts
            .get(&node)
            .map(|existing| existing.children.clone())
            .unwrap_or_default();
        let _ = self.contexts.insert(
            node,
            StackingContext {
                children: if context.children.is_empty() {
                    children
                } else {
                    context.children
                },
                ..context
            },
        );
    }

    /// Remove the context formed by `node` together with its nested
    /// contexts.
    pub fn remove(&mut self, node: NodeId) {
        let Some(context) = self.contexts.remove(&node) else {
            return;
        };
        if let Some(parent) = context.parent.and_then(|p| self.contexts.get_mut(&p)) {
            parent.children.retain(|child| *child != node);
        }
        let _ = self.members.remove(&node);
        for child in context.children {
            self.remove(child);
        }
        self.rescale();
    }

    /// Recompute the level count and multiplier from the current contexts.
    ///
    /// With every `|z| <= base / 2 - 1`, the inner levels of a chain add up
    /// to less than half of one outer step, so no inner stack level can
    /// carry an element past a sibling of an outer context.
    fn rescale(&mut self) {
        let mut levels = 0_usize;
        let mut largest = 0_u32;
        for context in self.contexts.values() {
            if context.parent.is_none() {
                continue;
            }
            largest = largest.max(context.z_index.unsigned_abs());
            levels = levels.max(self.chain(context.node).len());
        }
        self.levels = i32::try_from(levels).unwrap_or(i32::MAX);
        self.base = self.min_base.max(2.0 * (f64::from(largest) + 1.0));
    }

    /// Stack levels of the non-root contexts from the outermost down to
    /// `innermost`.
    fn chain(&self, innermost: NodeId) -> Vec<i32> {
        let mut chain = Vec::new();
        let mut current = Some(innermost);
        while let Some(context) = current.and_then(|id| self.contexts.get(&id)) {
            if context.parent.is_none() {
                break;
            }
            chain.push(context.z_index);
            current = context.parent;
        }
        chain.reverse();
        chain
    }

    /// The context formed by `node`, if any.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&StackingContext> {
        self.contexts.get(&node)
    }

    /// The root context.
    #[must_use]
    pub fn root(&self) -> Option<&StackingContext> {
        self.root.and_then(|root| self.contexts.get(&root))
    }

    /// Number of contexts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Returns true when no context has been built.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// The context `node` paints in. A context element paints in its parent
    /// context; the root paints in its own.
    #[must_use]
    pub fn owner_of(&self, node: NodeId) -> Option<NodeId> {
        if self.root == Some(node) {
            return self.root;
        }
        self.owner.get(&node).copied()
    }

    /// Scalar paint depth of `node`.
    ///
    /// ```text
    /// depth = Σ z_i × base^(levels − i)
    /// ```
    ///
    /// over the contexts from the outermost non-root level (`i = 1`) down
    /// to the innermost context containing `node`. `levels` is the longest
    /// chain of nested contexts in the tree, so every level has its own
    /// multiplier. `base` is the configured base, raised to twice the
    /// largest `|z| + 1` when a stack level would not fit, so distinct
    /// stack levels always give distinct depths. Elements outside any
    /// nested context have depth 0.
    ///
    /// Depth is exact while `base^levels` stays below 2^53. Past that,
    /// neighbouring inner levels may round to the same value and only
    /// [`Self::paint_order`] separates them.
    #[must_use]
    pub fn depth(&self, node: NodeId) -> f64 {
        // Innermost context containing `node`, including `node` itself.
        let innermost = if self.contexts.contains_key(&node) {
            Some(node)
        } else {
            self.owner.get(&node).copied()
        };
        let Some(innermost) = innermost else {
            return 0.0;
        };

        self.chain(innermost)
            .iter()
            .zip((0..self.levels).rev())
            .map(|(z, exponent)| f64::from(*z) * self.base.powi(exponent))
            .sum()
    }

    /// [§ Appendix E Painting order](https://www.w3.org/TR/CSS2/zindex.html)
    ///
    /// Back-to-front order of every element. Within a context the element
    /// forming it paints first, then its child contexts and plain members
    /// in `(stack level, document order)` order, with plain members at
    /// level 0. Child contexts paint atomically.
    #[must_use]
    pub fn paint_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.document_order.len());
        if let Some(root) = self.root {
            self.paint_context(root, &mut order);
        }
        order
    }

    fn paint_context(&self, node: NodeId, out: &mut Vec<NodeId>) {
        let Some(context) = self.contexts.get(&node) else {
            return;
        };
        out.push(node);

        // (stack level, document order, is context, node)
        let mut layers: Vec<(i32, usize, bool, NodeId)> = context
            .children
            .iter()
            .filter_map(|child| self.contexts.get(child))
            .map(|child| (child.z_index, child.document_order, true, child.node))
            .collect();
        if let Some(members) = self.members.get(&node) {
            layers.extend(members.iter().map(|member| {
                let order = self.document_order.get(member).copied().unwrap_or(usize::MAX);
                (0, order, false, *member)
            }));
        }
        layers.sort_by_key(|(z, order, _, _)| (*z, *order));

        for (_, _, is_context, member) in layers {
            if is_context {
                self.paint_context(member, out);
            } else {
                out.push(member);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_z_index_parse() {
        assert_eq!(ZIndex::parse("auto"), Ok(ZIndex::Auto));
        assert_eq!(ZIndex::parse(" -3 "), Ok(ZIndex::Integer(-3)));
        assert!(matches!(
            ZIndex::parse("1.5"),
            Err(LayoutError::MalformedValue { .. })
        ));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut contexts = StackingContexts::new(&LayoutConfig::default());
        let root = NodeId(0);
        contexts.insert(StackingContext {
            node: root,
            parent: None,
            z_index: 0,
            established_by: EstablishedBy::Root,
            document_order: 0,
            children: Vec::new(),
        });
        let child = StackingContext {
            node: NodeId(1),
            parent: Some(root),
            z_index: 2,
            established_by: EstablishedBy::PositionedZIndex,
            document_order: 1,
            children: Vec::new(),
        };
        contexts.insert(child.clone());
        contexts.insert(child);
        assert_eq!(contexts.get(root).map(|c| c.children.len()), Some(1));
        assert_eq!(contexts.len(), 2);
    }
}
