//! Selector parsing and matching
//!
//! Only the simple selectors the layout core needs are supported, per
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/): one type, class or
//! id selector, optionally followed by `:hover`.

use std::fmt;

use trellis_dom::{DomTree, ElementKind, NodeId};

/// A single-condition selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// "A type selector is the name of a document language element type,
    /// and represents an instance of that element type in the document tree."
    ///
    /// Examples: `div`, `td`, `li`
    Type(ElementKind),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    /// "The class selector is given as a full stop (. U+002E) immediately
    /// followed by an identifier."
    ///
    /// Examples: `.card`, `.row`
    Class(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    /// "An ID selector is a hash (#, U+0023) immediately followed by the
    /// ID value, which is an identifier."
    ///
    /// Examples: `#app`, `#sidebar`
    Id(String),

    /// [§ 9.2 The pointer hover pseudo-class](https://www.w3.org/TR/selectors-4/#the-hover-pseudo)
    ///
    /// The inner selector, applied only while the element is hovered.
    Hover(Box<Selector>),
}

/// Precedence tier of a selector. Later tiers override earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// Type selectors.
    Type,
    /// Class selectors.
    Class,
    /// Id selectors.
    Id,
}

impl Selector {
    /// Parse selector text. Returns `None` for anything but a simple
    /// type/class/id selector with an optional trailing `:hover`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(base) = text.strip_suffix(":hover") {
            let inner = Self::parse(base)?;
            if matches!(inner, Self::Hover(_)) {
                return None;
            }
            return Some(Self::Hover(Box::new(inner)));
        }

        if let Some(id) = text.strip_prefix('#') {
            return is_ident(id).then(|| Self::Id(id.to_string()));
        }
        if let Some(class) = text.strip_prefix('.') {
            return is_ident(class).then(|| Self::Class(class.to_string()));
        }
        is_ident(text).then(|| Self::Type(ElementKind::from_tag(text)))
    }

    /// Whether this is a `:hover` selector.
    #[must_use]
    pub const fn is_hover(&self) -> bool {
        matches!(self, Self::Hover(_))
    }

    /// The precedence tier (a hover selector takes its inner tier).
    #[must_use]
    pub fn tier(&self) -> Tier {
        match self {
            Self::Type(_) => Tier::Type,
            Self::Class(_) => Tier::Class,
            Self::Id(_) => Tier::Id,
            Self::Hover(inner) => inner.tier(),
        }
    }

    /// Check whether the element matches, ignoring hover state.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some(element) = tree.element(id) else {
            return false;
        };
        match self {
            Self::Type(kind) => element.kind == *kind,
            Self::Class(class) => element.has_class(class),
            Self::Id(wanted) => element.id.as_deref() == Some(wanted.as_str()),
            Self::Hover(inner) => inner.matches(tree, id),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(kind) => write!(f, "{kind}"),
            Self::Class(class) => write!(f, ".{class}"),
            Self::Id(id) => write!(f, "#{id}"),
            Self::Hover(inner) => write!(f, "{inner}:hover"),
        }
    }
}

/// [§ 4 Identifiers](https://www.w3.org/TR/css-syntax-3/#ident-token-diagram), simplified.
fn is_ident(text: &str) -> bool {
    !text.is_empty()
        && !text.starts_with(|c: char| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_selectors() {
        assert_eq!(Selector::parse("td"), Some(Selector::Type(ElementKind::Td)));
        assert_eq!(Selector::parse(".card"), Some(Selector::Class("card".into())));
        assert_eq!(Selector::parse(" #app "), Some(Selector::Id("app".into())));
        assert_eq!(
            Selector::parse(".card:hover"),
            Some(Selector::Hover(Box::new(Selector::Class("card".into()))))
        );
    }

    #[test]
    fn test_reject_compound_selectors() {
        assert_eq!(Selector::parse("div.card"), None);
        assert_eq!(Selector::parse("div > p"), None);
        assert_eq!(Selector::parse(".a:hover:hover"), None);
        assert_eq!(Selector::parse("#"), None);
    }
}
