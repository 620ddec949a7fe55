//! Rule matching and style resolution
//!
//! A deliberately small cascade: no specificity arithmetic, no inheritance.
//! Rules are bucketed by [`Tier`] and applied in a fixed precedence order:
//!
//! 1. type defaults from the UA table
//! 2. type rules
//! 3. class rules
//! 4. id rules
//! 5. `:hover` type, class, then id rules, only while the element is hovered
//!
//! Within one tier, rules apply in insertion order, so a later rule wins.

use std::collections::{HashMap, HashSet};

use trellis_common::warning::warn_once;
use trellis_dom::{DomTree, NodeId};

use crate::error::LayoutError;
use crate::selector::{Selector, Tier};
use crate::style::StyleProperties;
use crate::ua_stylesheet::type_defaults;

/// A selector plus the properties it sets.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    /// Which elements the rule applies to.
    pub selector: Selector,
    /// The declared properties.
    pub properties: StyleProperties,
}

impl StyleRule {
    /// Build a rule from a selector and textual declarations.
    ///
    /// Returns `Ok(None)` (with a warning) when the selector is unsupported,
    /// and an error when a declaration value is malformed.
    ///
    /// # Errors
    ///
    /// A malformed declaration value.
    pub fn parse<'a>(
        selector: &str,
        declarations: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Option<Self>, LayoutError> {
        let Some(parsed) = Selector::parse(selector) else {
            warn_once("cascade", &format!("unsupported selector '{selector}' skipped"));
            return Ok(None);
        };
        let mut properties = StyleProperties::default();
        for (name, value) in declarations {
            properties.set(name, value)?;
        }
        Ok(Some(Self {
            selector: parsed,
            properties,
        }))
    }
}

/// Produces the merged style of an element.
///
/// The layout engine only ever asks for one element at a time and never
/// mutates the result.
pub trait StyleResolver {
    /// The resolved style for `node`.
    fn resolve(&self, tree: &DomTree, node: NodeId) -> StyleProperties;
}

/// [`StyleResolver`] over an ordered list of [`StyleRule`]s.
#[derive(Debug, Clone, Default)]
pub struct RuleSetResolver {
    rules: Vec<StyleRule>,
    hovered: HashSet<NodeId>,
    overrides: HashMap<NodeId, StyleProperties>,
}

impl RuleSetResolver {
    /// An empty rule set: every element gets its type defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. Later rules win within a tier.
    pub fn add_rule(&mut self, rule: StyleRule) {
        self.rules.push(rule);
    }

    /// Parse and append a rule; see [`StyleRule::parse`].
    ///
    /// # Errors
    ///
    /// Fails like [`StyleRule::parse`].
    pub fn add_rule_text<'a>(
        &mut self,
        selector: &str,
        declarations: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<(), LayoutError> {
        if let Some(rule) = StyleRule::parse(selector, declarations)? {
            self.add_rule(rule);
        }
        Ok(())
    }

    /// The rules in insertion order.
    #[must_use]
    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    /// Mark or unmark an element as hovered.
    pub fn set_hovered(&mut self, node: NodeId, hovered: bool) {
        if hovered {
            let _ = self.hovered.insert(node);
        } else {
            let _ = self.hovered.remove(&node);
        }
    }

    /// Whether `node` is currently hovered.
    #[must_use]
    pub fn is_hovered(&self, node: NodeId) -> bool {
        self.hovered.contains(&node)
    }

    /// Per-element properties applied after every rule, like an inline
    /// `style` attribute.
    pub fn set_inline(&mut self, node: NodeId, properties: StyleProperties) {
        let _ = self.overrides.insert(node, properties);
    }

    fn apply_tier(
        &self,
        tree: &DomTree,
        node: NodeId,
        hover: bool,
        tier: Tier,
        into: &mut StyleProperties,
    ) {
        for rule in &self.rules {
            if rule.selector.is_hover() == hover
                && rule.selector.tier() == tier
                && rule.selector.matches(tree, node)
            {
                into.merge_from(&rule.properties);
            }
        }
    }
}

impl StyleResolver for RuleSetResolver {
    fn resolve(&self, tree: &DomTree, node: NodeId) -> StyleProperties {
        let mut style = tree
            .element(node)
            .map(|element| type_defaults(&element.kind))
            .unwrap_or_default();

        for tier in [Tier::Type, Tier::Class, Tier::Id] {
            self.apply_tier(tree, node, false, tier, &mut style);
        }
        if self.is_hovered(node) {
            for tier in [Tier::Type, Tier::Class, Tier::Id] {
                self.apply_tier(tree, node, true, tier, &mut style);
            }
        }
        if let Some(inline) = self.overrides.get(&node) {
            style.merge_from(inline);
        }
        style
    }
}

/// Resolve every element of the tree once, in document order.
pub fn compute_styles(
    tree: &DomTree,
    resolver: &dyn StyleResolver,
) -> HashMap<NodeId, StyleProperties> {
    let mut styles = HashMap::with_capacity(tree.len());
    let root = tree.root();
    let _ = styles.insert(root, resolver.resolve(tree, root));
    for id in tree.descendants(root) {
        let _ = styles.insert(id, resolver.resolve(tree, id));
    }
    styles
}
