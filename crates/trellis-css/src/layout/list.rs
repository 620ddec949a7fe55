//! List layout.
//!
//! A list stacks its in-flow children vertically with uniform spacing and
//! shares its content height between them:
//!
//! ```text
//! h   = floor(max((H − s·(n − 1)) / n, max(ratio·H, min_height)))
//! y_i = i · (h + s)
//! ```
//!
//! Items never shrink below the minimum, so a list can overflow its
//! container; that is reported, not corrected. Every item is inset on the
//! left to leave room for its marker.
//!
//! [CSS Lists and Counters Module Level 3](https://www.w3.org/TR/css-lists-3/)

use log::trace;
use trellis_dom::NodeId;

use crate::error::{Axis, Diagnostic, DiagnosticKind};
use crate::style::ListStyleType;

use super::box_model::{BoxDimensions, EdgeSizes, Rect, Size};
use super::config::LayoutConfig;

/// One list item as seen by the list engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListChild {
    /// The item element.
    pub node: NodeId,
    /// The item's resolved padding.
    pub padding: EdgeSizes,
    /// The item's resolved border widths.
    pub border: EdgeSizes,
}

/// Result of [`layout_list_items`].
#[derive(Debug, Clone, PartialEq)]
pub struct ListLayout {
    /// One box per input item, in input order. Content rectangles are
    /// relative to the list's content origin.
    pub items: Vec<BoxDimensions>,
    /// The shared item height.
    pub item_height: f32,
    /// Total height the items take, spacing included.
    pub used_height: f32,
    /// Set when the items do not fit the list's content height.
    pub overflow: Option<Diagnostic>,
}

/// Lay out `items` inside a list whose content box is `content`.
///
/// `spacing` is the gap between adjacent items, `marker_inset` the space
/// reserved on the left of every item for its marker.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn layout_list_items(
    list: NodeId,
    items: &[ListChild],
    content: Size,
    spacing: f32,
    marker_inset: f32,
    config: &LayoutConfig,
) -> ListLayout {
    let count = items.len();
    if count == 0 {
        return ListLayout {
            items: Vec::new(),
            item_height: 0.0,
            used_height: 0.0,
            overflow: None,
        };
    }

    // STEP 1: Shared item height.
    let n = count as f32;
    let available = content.height - spacing * (n - 1.0);
    let minimum = (config.list_min_item_ratio * content.height).max(config.list_min_item_height);
    let item_height = (available / n).max(minimum).floor();

    // STEP 2: Stack.
    let mut boxes = Vec::with_capacity(count);
    for (index, item) in items.iter().enumerate() {
        let y = index as f32 * (item_height + spacing);
        let slot = Rect::new(0.0, y, content.width, item_height);
        let mut dims = BoxDimensions {
            content: Rect::default(),
            padding: EdgeSizes {
                left: item.padding.left + marker_inset,
                ..item.padding
            },
            border: item.border,
            margin: EdgeSizes::default(),
        };
        dims.set_outer_size(slot.width, slot.height);
        dims.set_margin_origin(slot.x, slot.y);
        trace!("list {list} item {}: {:?}", item.node, dims.content);
        boxes.push(dims);
    }

    // STEP 3: Overflow.
    let used_height = item_height * n + spacing * (n - 1.0);
    let overflow = (used_height > content.height + 1e-3).then(|| Diagnostic {
        node: list,
        kind: DiagnosticKind::Overflow {
            axis: Axis::Vertical,
            amount: used_height - content.height,
        },
    });

    ListLayout {
        items: boxes,
        item_height,
        used_height,
        overflow,
    }
}

/// [§ 3 Markers](https://www.w3.org/TR/css-lists-3/#markers)
///
/// The marker text for the item at zero-based `index`, or `None` for
/// `list-style-type: none`.
#[must_use]
pub fn marker_label(style: ListStyleType, index: usize) -> Option<String> {
    let ordinal = index + 1;
    let label = match style {
        ListStyleType::None => return None,
        ListStyleType::Disc => "\u{2022}".to_string(),
        ListStyleType::Circle => "\u{25e6}".to_string(),
        ListStyleType::Square => "\u{25aa}".to_string(),
        ListStyleType::Decimal => format!("{ordinal}."),
        ListStyleType::LowerAlpha => format!("{}.", alphabetic(ordinal)),
        ListStyleType::UpperAlpha => format!("{}.", alphabetic(ordinal).to_ascii_uppercase()),
        ListStyleType::LowerRoman => format!("{}.", roman(ordinal)),
        ListStyleType::UpperRoman => format!("{}.", roman(ordinal).to_ascii_uppercase()),
    };
    Some(label)
}

/// [CSS Counter Styles § 3.1.4](https://www.w3.org/TR/css-counter-styles-3/#alphabetic-system)
///
/// Bijective base-26: 1 → a, 26 → z, 27 → aa.
fn alphabetic(mut value: usize) -> String {
    let mut letters = Vec::new();
    while value > 0 {
        value -= 1;
        letters.push(char::from(b'a' + (value % 26) as u8));
        value /= 26;
    }
    letters.iter().rev().collect()
}

/// [CSS Counter Styles § 6.1](https://www.w3.org/TR/css-counter-styles-3/#simple-numeric)
///
/// Lowercase additive roman numerals, defined for 1..=3999. Larger
/// values fall back to decimal.
fn roman(value: usize) -> String {
    const SYMBOLS: [(usize, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    if value == 0 || value > 3999 {
        return value.to_string();
    }
    let mut rest = value;
    let mut out = String::new();
    for (weight, symbol) in SYMBOLS {
        while rest >= weight {
            out.push_str(symbol);
            rest -= weight;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabetic_is_bijective() {
        assert_eq!(alphabetic(1), "a");
        assert_eq!(alphabetic(26), "z");
        assert_eq!(alphabetic(27), "aa");
        assert_eq!(alphabetic(52), "az");
    }

    #[test]
    fn test_roman() {
        assert_eq!(roman(4), "iv");
        assert_eq!(roman(1994), "mcmxciv");
        assert_eq!(roman(4000), "4000");
    }

    #[test]
    fn test_marker_labels() {
        assert_eq!(marker_label(ListStyleType::Decimal, 2).as_deref(), Some("3."));
        assert_eq!(marker_label(ListStyleType::UpperRoman, 8).as_deref(), Some("IX."));
        assert_eq!(marker_label(ListStyleType::None, 0), None);
    }
}
