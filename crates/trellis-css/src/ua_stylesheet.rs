//! User-Agent type defaults
//!
//! [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
//!
//! "User agents are expected to have a default style sheet that presents elements
//! of HTML documents in ways consistent with general user expectations."
//!
//! Type defaults have the lowest priority in the cascade — any author rule
//! overrides them, including a type rule.

use std::sync::OnceLock;

use trellis_common::warning::warn_once;
use trellis_dom::ElementKind;

use crate::style::StyleProperties;

/// [WHATWG HTML § 15.3.8 Tables](https://html.spec.whatwg.org/multipage/rendering.html#tables-2)
/// and [§ 15.3.7 Lists](https://html.spec.whatwg.org/multipage/rendering.html#lists).
///
/// Elements not listed here get `display: block` from the property initial value.
const UA_RULES: &[(&[&str], &[(&str, &str)])] = &[
    // "table { display: table; }"
    (&["table"], &[("display", "table")]),
    // "caption { display: table-caption; }"
    (&["caption"], &[("display", "table-caption")]),
    // "colgroup { display: table-column-group; }"
    (&["colgroup"], &[("display", "table-column-group")]),
    // "col { display: table-column; }"
    (&["col"], &[("display", "table-column")]),
    // "thead { display: table-header-group; }"
    (&["thead"], &[("display", "table-header-group")]),
    // "tbody { display: table-row-group; }"
    (&["tbody"], &[("display", "table-row-group")]),
    // "tfoot { display: table-footer-group; }"
    (&["tfoot"], &[("display", "table-footer-group")]),
    // "tr { display: table-row; }"
    (&["tr"], &[("display", "table-row")]),
    // "td, th { display: table-cell; }"
    (&["td", "th"], &[("display", "table-cell")]),
    // "ul, menu, dir { list-style-type: disc; }"
    (&["ul"], &[("display", "list"), ("list-style-type", "disc")]),
    // "ol { list-style-type: decimal; }"
    (&["ol"], &[("display", "list"), ("list-style-type", "decimal")]),
    // "li { display: list-item; }"
    (&["li"], &[("display", "list-item")]),
];

/// Parsed defaults, built on first use.
fn ua_defaults() -> &'static [(ElementKind, StyleProperties)] {
    static DEFAULTS: OnceLock<Vec<(ElementKind, StyleProperties)>> = OnceLock::new();
    DEFAULTS.get_or_init(|| {
        let mut out = Vec::new();
        for (tags, declarations) in UA_RULES {
            let mut props = StyleProperties::default();
            for (name, value) in *declarations {
                if let Err(err) = props.set(name, value) {
                    warn_once("UA", &err.to_string());
                }
            }
            for tag in *tags {
                out.push((ElementKind::from_tag(tag), props.clone()));
            }
        }
        out
    })
}

/// The type-default style for an element kind.
#[must_use]
pub fn type_defaults(kind: &ElementKind) -> StyleProperties {
    ua_defaults()
        .iter()
        .find(|(k, _)| k == kind)
        .map(|(_, props)| props.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Display, ListStyleType};

    #[test]
    fn test_table_kinds_have_table_displays() {
        assert_eq!(type_defaults(&ElementKind::Table).display(), Display::Table);
        assert_eq!(type_defaults(&ElementKind::Th).display(), Display::TableCell);
        assert_eq!(
            type_defaults(&ElementKind::Thead).display(),
            Display::TableHeaderGroup
        );
    }

    #[test]
    fn test_list_kinds_have_markers() {
        let ol = type_defaults(&ElementKind::Ol);
        assert_eq!(ol.display(), Display::List);
        assert_eq!(ol.list_style_type(), ListStyleType::Decimal);
        assert_eq!(type_defaults(&ElementKind::Div), StyleProperties::default());
    }
}
