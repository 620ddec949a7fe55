//! Keyword-valued properties for flex, list and table layout.
//!
//! Every enum parses from its CSS keyword through `strum` and defaults to the
//! property's initial value. [`parse_keyword`] is the single entry point used
//! by the declaration parser: unknown keywords are not errors, they warn once
//! and fall back to the initial value.

use std::str::FromStr;

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

use trellis_common::warning::warn_once;

/// Parse a keyword, falling back to `T::default()` with a warning.
#[must_use]
pub fn parse_keyword<T: FromStr + Default>(property: &str, raw: &str) -> T {
    let lower = raw.trim().to_ascii_lowercase();
    T::from_str(&lower).unwrap_or_else(|_| {
        warn_once(
            "style",
            &format!("unsupported {property} value '{lower}', using initial value"),
        );
        T::default()
    })
}

/// [§ 5.1 'flex-direction'](https://www.w3.org/TR/css-flexbox-1/#flex-direction-property)
///
/// "Values: row | row-reverse | column | column-reverse"
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, AsRefStr, Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum FlexDirection {
    /// "The flex container's main axis has the same orientation as the inline axis."
    #[default]
    Row,
    /// "Same as row, except the main-start and main-end directions are swapped."
    RowReverse,
    /// "The flex container's main axis has the same orientation as the block axis."
    Column,
    /// "Same as column, except the main-start and main-end directions are swapped."
    ColumnReverse,
}

impl FlexDirection {
    /// Main axis is horizontal.
    #[must_use]
    pub const fn is_row(self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    /// A `-reverse` variant.
    #[must_use]
    pub const fn is_reverse(self) -> bool {
        matches!(self, Self::RowReverse | Self::ColumnReverse)
    }
}

/// [§ 5.2 'flex-wrap'](https://www.w3.org/TR/css-flexbox-1/#flex-wrap-property)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, AsRefStr, Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum FlexWrap {
    /// "The flex container is single-line."
    #[default]
    Nowrap,
    /// "The flex container is multi-line."
    Wrap,
    /// "Same as wrap" with the cross-start and cross-end directions swapped.
    WrapReverse,
}

/// [§ 8.2 'justify-content'](https://www.w3.org/TR/css-flexbox-1/#justify-content-property)
///
/// Also used for `align-content` distributions through [`AlignContent`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, AsRefStr, Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum JustifyContent {
    /// "Flex items are packed toward the start of the line."
    #[default]
    FlexStart,
    /// "Flex items are packed toward the end of the line."
    FlexEnd,
    /// "Flex items are packed toward the center of the line."
    Center,
    /// "Flex items are evenly distributed in the line."
    SpaceBetween,
    /// "...with half-size spaces on either end."
    SpaceAround,
    /// Equal spacing between items and at both ends.
    SpaceEvenly,
}

/// [§ 8.3 'align-items'](https://www.w3.org/TR/css-flexbox-1/#align-items-property)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, AsRefStr, Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum AlignItems {
    /// "The cross-start margin edge of the flex item is placed flush with the
    /// cross-start edge of the line."
    FlexStart,
    /// "...placed flush with the cross-end edge of the line."
    FlexEnd,
    /// "The flex item's margin box is centered in the cross axis within the line."
    Center,
    /// Treated as `flex-start`.
    Baseline,
    /// "...the cross size of the item's margin box is as close to the same
    /// size as the line as possible."
    #[default]
    Stretch,
}

/// [§ 8.3 'align-self'](https://www.w3.org/TR/css-flexbox-1/#align-items-property)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, AsRefStr, Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum AlignSelf {
    /// "Defers cross-axis alignment control to the value of align-items on the
    /// parent box."
    #[default]
    Auto,
    /// See [`AlignItems::FlexStart`].
    FlexStart,
    /// See [`AlignItems::FlexEnd`].
    FlexEnd,
    /// See [`AlignItems::Center`].
    Center,
    /// See [`AlignItems::Baseline`].
    Baseline,
    /// See [`AlignItems::Stretch`].
    Stretch,
}

impl AlignSelf {
    /// Resolve `auto` against the container's `align-items`.
    #[must_use]
    pub const fn resolve(self, align_items: AlignItems) -> AlignItems {
        match self {
            Self::Auto => align_items,
            Self::FlexStart => AlignItems::FlexStart,
            Self::FlexEnd => AlignItems::FlexEnd,
            Self::Center => AlignItems::Center,
            Self::Baseline => AlignItems::Baseline,
            Self::Stretch => AlignItems::Stretch,
        }
    }
}

/// [§ 8.4 'align-content'](https://www.w3.org/TR/css-flexbox-1/#align-content-property)
///
/// "Note, this property has no effect on a single-line flex container."
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, AsRefStr, Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum AlignContent {
    /// "Lines are packed toward the start of the flex container."
    FlexStart,
    /// "Lines are packed toward the end of the flex container."
    FlexEnd,
    /// "Lines are packed toward the center of the flex container."
    Center,
    /// "Lines are evenly distributed in the flex container."
    SpaceBetween,
    /// "...with half-size spaces on either end."
    SpaceAround,
    /// Equal spacing between lines and at both ends.
    SpaceEvenly,
    /// "Lines stretch to take up the remaining space."
    #[default]
    Stretch,
}

impl AlignContent {
    /// The main-axis distribution with the same packing, or `None` for
    /// `stretch`.
    #[must_use]
    pub const fn as_distribution(self) -> Option<JustifyContent> {
        match self {
            Self::FlexStart => Some(JustifyContent::FlexStart),
            Self::FlexEnd => Some(JustifyContent::FlexEnd),
            Self::Center => Some(JustifyContent::Center),
            Self::SpaceBetween => Some(JustifyContent::SpaceBetween),
            Self::SpaceAround => Some(JustifyContent::SpaceAround),
            Self::SpaceEvenly => Some(JustifyContent::SpaceEvenly),
            Self::Stretch => None,
        }
    }
}

/// [§ 3.1 'list-style-type'](https://www.w3.org/TR/css-lists-3/#list-style-type)
///
/// "The list-style-type property specifies a counter style or string for the
/// element's marker."
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, AsRefStr, Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ListStyleType {
    /// Filled circle.
    #[default]
    Disc,
    /// Hollow circle.
    Circle,
    /// Filled square.
    Square,
    /// 1, 2, 3, ...
    Decimal,
    /// a, b, c, ...
    LowerAlpha,
    /// A, B, C, ...
    UpperAlpha,
    /// i, ii, iii, ...
    LowerRoman,
    /// I, II, III, ...
    UpperRoman,
    /// No marker, and no marker space.
    None,
}

/// [§ 17.4.1 Caption position](https://www.w3.org/TR/CSS2/tables.html#caption-position)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, AsRefStr, Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CaptionSide {
    /// "Positions the caption box above the table box."
    #[default]
    Top,
    /// "Positions the caption box below the table box."
    Bottom,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyword_is_case_insensitive() {
        let dir: FlexDirection = parse_keyword("flex-direction", "Column-Reverse");
        assert_eq!(dir, FlexDirection::ColumnReverse);
        assert!(dir.is_reverse());
        assert!(!dir.is_row());
    }

    #[test]
    fn test_unknown_keyword_falls_back_to_initial() {
        let align: AlignContent = parse_keyword("align-content", "sideways");
        assert_eq!(align, AlignContent::Stretch);
        let wrap: FlexWrap = parse_keyword("flex-wrap", "wrap-reverse");
        assert_eq!(wrap, FlexWrap::WrapReverse);
    }
}
