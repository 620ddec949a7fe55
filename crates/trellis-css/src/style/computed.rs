//! Resolved style properties for one element.
//!
//! [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//! "The computed value is the result of resolving the specified value..."

use trellis_common::warning::warn_once;

use crate::error::LayoutError;
use crate::layout::positioned::PositionType;
use crate::layout::stacking::ZIndex;

use super::display::Display;
use super::keywords::{
    AlignContent, AlignItems, AlignSelf, CaptionSide, FlexDirection, FlexWrap, JustifyContent,
    ListStyleType, parse_keyword,
};
use super::values::{AutoLength, EdgeValues, LengthValue, parse_number};

/// Style properties for an element.
///
/// All values are Option - `None` means "not set", and the getters supply the
/// property's initial value. Rules are combined with [`Self::merge_from`],
/// which overrides field by field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleProperties {
    /// [§ 2 'display'](https://www.w3.org/TR/css-display-3/#the-display-properties)
    pub display: Option<Display>,

    /// [§ 10.2 Content width: the 'width' property](https://www.w3.org/TR/CSS2/visudet.html#the-width-property)
    pub width: Option<AutoLength>,
    /// [§ 10.5 Content height: the 'height' property](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    pub height: Option<AutoLength>,

    /// `padding` shorthand.
    /// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    pub padding: Option<EdgeValues<LengthValue>>,
    /// `padding-top`
    pub padding_top: Option<LengthValue>,
    /// `padding-right`
    pub padding_right: Option<LengthValue>,
    /// `padding-bottom`
    pub padding_bottom: Option<LengthValue>,
    /// `padding-left`
    pub padding_left: Option<LengthValue>,

    /// `margin` shorthand.
    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    pub margin: Option<EdgeValues<AutoLength>>,
    /// `margin-top`
    pub margin_top: Option<AutoLength>,
    /// `margin-right`
    pub margin_right: Option<AutoLength>,
    /// `margin-bottom`
    pub margin_bottom: Option<AutoLength>,
    /// `margin-left`
    pub margin_left: Option<AutoLength>,

    /// `border-width` shorthand.
    /// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
    pub border_width: Option<EdgeValues<LengthValue>>,
    /// `border-top-width`
    pub border_top_width: Option<LengthValue>,
    /// `border-right-width`
    pub border_right_width: Option<LengthValue>,
    /// `border-bottom-width`
    pub border_bottom_width: Option<LengthValue>,
    /// `border-left-width`
    pub border_left_width: Option<LengthValue>,

    /// [§ 9.3.1 'position'](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
    pub position: Option<PositionType>,
    /// [§ 9.3.2 'top'](https://www.w3.org/TR/CSS2/visuren.html#position-props)
    pub top: Option<AutoLength>,
    /// [§ 9.3.2 'right'](https://www.w3.org/TR/CSS2/visuren.html#position-props)
    pub right: Option<AutoLength>,
    /// [§ 9.3.2 'bottom'](https://www.w3.org/TR/CSS2/visuren.html#position-props)
    pub bottom: Option<AutoLength>,
    /// [§ 9.3.2 'left'](https://www.w3.org/TR/CSS2/visuren.html#position-props)
    pub left: Option<AutoLength>,
    /// [§ 9.9.1 'z-index'](https://www.w3.org/TR/CSS2/visuren.html#z-index)
    pub z_index: Option<ZIndex>,
    /// Raw `transform` value; `none` is kept so it can override a rule below.
    pub transform: Option<String>,
    /// Raw `perspective` value; `none` is kept like `transform`.
    pub perspective: Option<String>,
    /// [§ 3.2 'opacity'](https://www.w3.org/TR/css-color-4/#transparency), clamped to 0..=1.
    pub opacity: Option<f32>,

    /// [§ 5.1 'flex-direction'](https://www.w3.org/TR/css-flexbox-1/#flex-direction-property)
    pub flex_direction: Option<FlexDirection>,
    /// [§ 5.2 'flex-wrap'](https://www.w3.org/TR/css-flexbox-1/#flex-wrap-property)
    pub flex_wrap: Option<FlexWrap>,
    /// [§ 8.2 'justify-content'](https://www.w3.org/TR/css-flexbox-1/#justify-content-property)
    pub justify_content: Option<JustifyContent>,
    /// [§ 8.3 'align-items'](https://www.w3.org/TR/css-flexbox-1/#align-items-property)
    pub align_items: Option<AlignItems>,
    /// [§ 8.4 'align-content'](https://www.w3.org/TR/css-flexbox-1/#align-content-property)
    pub align_content: Option<AlignContent>,
    /// [§ 8.3 'align-self'](https://www.w3.org/TR/css-flexbox-1/#align-items-property)
    pub align_self: Option<AlignSelf>,
    /// [§ 7.2 'flex-grow'](https://www.w3.org/TR/css-flexbox-1/#flex-grow-property)
    pub flex_grow: Option<f32>,
    /// [§ 7.3 'flex-shrink'](https://www.w3.org/TR/css-flexbox-1/#flex-shrink-property)
    pub flex_shrink: Option<f32>,
    /// [§ 7.1 'flex-basis'](https://www.w3.org/TR/css-flexbox-1/#flex-basis-property)
    pub flex_basis: Option<AutoLength>,
    /// [§ 5.4 'order'](https://www.w3.org/TR/css-flexbox-1/#order-property).
    /// Kept as a float so a non-finite value can be reported by the flex engine.
    pub order: Option<f32>,
    /// [§ 10.1 'row-gap'](https://www.w3.org/TR/css-align-3/#column-row-gap)
    pub row_gap: Option<LengthValue>,
    /// [§ 10.1 'column-gap'](https://www.w3.org/TR/css-align-3/#column-row-gap)
    pub column_gap: Option<LengthValue>,

    /// [§ 3.1 'list-style-type'](https://www.w3.org/TR/css-lists-3/#list-style-type)
    pub list_style_type: Option<ListStyleType>,
    /// [§ 17.4.1 'caption-side'](https://www.w3.org/TR/CSS2/tables.html#caption-position)
    pub caption_side: Option<CaptionSide>,

    /// [§ 3.5 'font-size'](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
    pub font_size: Option<LengthValue>,
    /// Unitless `line-height` multiplier.
    pub line_height: Option<f32>,
}

/// Override every field of `$target` that is set in `$source`.
macro_rules! merge_fields {
    ($target:ident, $source:ident; $($field:ident),* $(,)?) => {
        $(
            if $source.$field.is_some() {
                $target.$field.clone_from(&$source.$field);
            }
        )*
    };
}

impl StyleProperties {
    /// Parse a textual declaration and store it.
    ///
    /// Property names are accepted in kebab-case (`padding-top`) or camelCase
    /// (`paddingTop`). Unknown properties and unknown keywords warn once and
    /// are ignored or replaced by the initial value. Malformed numbers and
    /// unknown units are errors.
    ///
    /// # Errors
    ///
    /// [`LayoutError::MalformedValue`] for a malformed number or length.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), LayoutError> {
        let property = kebab_case(name);
        let value = value.trim();
        let p = property.as_str();

        match p {
            "display" => self.display = Some(Display::parse(value)),
            "width" => self.width = Some(AutoLength::parse(p, value)?),
            "height" => self.height = Some(AutoLength::parse(p, value)?),

            "padding" => {
                self.padding = Some(EdgeValues::parse_shorthand(p, value, LengthValue::parse)?);
            }
            "padding-top" => self.padding_top = Some(LengthValue::parse(p, value)?),
            "padding-right" => self.padding_right = Some(LengthValue::parse(p, value)?),
            "padding-bottom" => self.padding_bottom = Some(LengthValue::parse(p, value)?),
            "padding-left" => self.padding_left = Some(LengthValue::parse(p, value)?),

            "margin" => {
                self.margin = Some(EdgeValues::parse_shorthand(p, value, AutoLength::parse)?);
            }
            "margin-top" => self.margin_top = Some(AutoLength::parse(p, value)?),
            "margin-right" => self.margin_right = Some(AutoLength::parse(p, value)?),
            "margin-bottom" => self.margin_bottom = Some(AutoLength::parse(p, value)?),
            "margin-left" => self.margin_left = Some(AutoLength::parse(p, value)?),

            "border-width" => {
                self.border_width =
                    Some(EdgeValues::parse_shorthand(p, value, LengthValue::parse)?);
            }
            "border-top-width" => self.border_top_width = Some(LengthValue::parse(p, value)?),
            "border-right-width" => self.border_right_width = Some(LengthValue::parse(p, value)?),
            "border-bottom-width" => {
                self.border_bottom_width = Some(LengthValue::parse(p, value)?);
            }
            "border-left-width" => self.border_left_width = Some(LengthValue::parse(p, value)?),
            // [§ 8.5.4 Border shorthand properties](https://www.w3.org/TR/CSS2/box.html#border-shorthand-properties)
            //
            // Only the width component takes part in layout.
            "border" => {
                let width = value
                    .split_whitespace()
                    .find(|part| part.starts_with(|c: char| c.is_ascii_digit() || c == '.'));
                if let Some(width) = width {
                    self.border_width = Some(EdgeValues::uniform(LengthValue::parse(p, width)?));
                }
            }

            "position" => self.position = Some(parse_keyword(p, value)),
            "top" => self.top = Some(AutoLength::parse(p, value)?),
            "right" => self.right = Some(AutoLength::parse(p, value)?),
            "bottom" => self.bottom = Some(AutoLength::parse(p, value)?),
            "left" => self.left = Some(AutoLength::parse(p, value)?),
            "z-index" => self.z_index = Some(ZIndex::parse(value)?),
            "transform" => self.transform = Some(value.to_ascii_lowercase()),
            "perspective" => self.perspective = Some(value.to_ascii_lowercase()),
            "opacity" => self.opacity = Some(parse_number(p, value)?.clamp(0.0, 1.0)),

            "flex-direction" => self.flex_direction = Some(parse_keyword(p, value)),
            "flex-wrap" => self.flex_wrap = Some(parse_keyword(p, value)),
            // [§ 5.3 'flex-flow'](https://www.w3.org/TR/css-flexbox-1/#flex-flow-property)
            "flex-flow" => {
                for part in value.split_whitespace() {
                    if part.starts_with("row") || part.starts_with("column") {
                        self.flex_direction = Some(parse_keyword("flex-direction", part));
                    } else {
                        self.flex_wrap = Some(parse_keyword("flex-wrap", part));
                    }
                }
            }
            "justify-content" => self.justify_content = Some(parse_keyword(p, value)),
            "align-items" => self.align_items = Some(parse_keyword(p, value)),
            "align-content" => self.align_content = Some(parse_keyword(p, value)),
            "align-self" => self.align_self = Some(parse_keyword(p, value)),
            "flex-grow" => self.flex_grow = Some(parse_flex_factor(p, value)?),
            "flex-shrink" => self.flex_shrink = Some(parse_flex_factor(p, value)?),
            "flex-basis" => self.flex_basis = Some(AutoLength::parse(p, value)?),
            "flex" => self.set_flex_shorthand(value)?,
            "order" => self.order = Some(parse_number(p, value)?),
            // [§ 10.2 'gap' shorthand](https://www.w3.org/TR/css-align-3/#gap-shorthand)
            //
            // "If <'column-gap'> is omitted, it's set to the same value as <'row-gap'>."
            "gap" => {
                let mut parts = value.split_whitespace();
                let row = parts
                    .next()
                    .ok_or_else(|| LayoutError::malformed(p, value, "expected a length"))?;
                let row = LengthValue::parse(p, row)?;
                let column = parts
                    .next()
                    .map(|c| LengthValue::parse(p, c))
                    .transpose()?
                    .unwrap_or(row);
                self.row_gap = Some(row);
                self.column_gap = Some(column);
            }
            "row-gap" => self.row_gap = Some(LengthValue::parse(p, value)?),
            "column-gap" => self.column_gap = Some(LengthValue::parse(p, value)?),

            "list-style-type" | "list-style" => {
                self.list_style_type = Some(parse_keyword("list-style-type", value));
            }
            "caption-side" => self.caption_side = Some(parse_keyword(p, value)),

            "font-size" => self.font_size = Some(LengthValue::parse(p, value)?),
            "line-height" => self.line_height = Some(parse_number(p, value)?),

            _ => warn_once("style", &format!("unsupported property '{property}' ignored")),
        }
        Ok(())
    }

    /// [§ 7.2 'flex' shorthand](https://www.w3.org/TR/css-flexbox-1/#flex-property)
    ///
    /// "Value: none | [ <'flex-grow'> <'flex-shrink'>? || <'flex-basis'> ]"
    ///
    /// - `none` is `0 0 auto`, `auto` is `1 1 auto`.
    /// - A lone number `n` is `n 1 0`.
    /// - A lone length is `1 1 <length>`.
    fn set_flex_shorthand(&mut self, value: &str) -> Result<(), LayoutError> {
        let lower = value.to_ascii_lowercase();
        let (grow, shrink, basis) = match lower.as_str() {
            "none" => (0.0, 0.0, AutoLength::Auto),
            "auto" => (1.0, 1.0, AutoLength::Auto),
            _ => {
                let mut grow = None;
                let mut shrink = None;
                let mut basis = None;
                for part in lower.split_whitespace() {
                    let number = parse_flex_factor("flex", part).ok();
                    match (number, grow, shrink) {
                        (Some(n), None, _) if basis.is_none() => grow = Some(n),
                        (Some(n), Some(_), None) if basis.is_none() => shrink = Some(n),
                        _ => basis = Some(AutoLength::parse("flex", part)?),
                    }
                }
                if grow.is_none() && basis.is_none() {
                    return Err(LayoutError::malformed("flex", value, "empty value"));
                }
                match (grow, basis) {
                    (None, Some(basis)) => (1.0, 1.0, basis),
                    (grow, basis) => (
                        grow.unwrap_or(1.0),
                        shrink.unwrap_or(1.0),
                        basis.unwrap_or(AutoLength::Length(LengthValue::ZERO)),
                    ),
                }
            }
        };
        self.flex_grow = Some(grow);
        self.flex_shrink = Some(shrink);
        self.flex_basis = Some(basis);
        Ok(())
    }

    /// Override every property that is set in `other`.
    ///
    /// Fields are visited in a fixed order; shorthands and longhands are
    /// separate fields, so a longhand set in `other` survives a shorthand
    /// set here and vice versa.
    pub fn merge_from(&mut self, other: &Self) {
        merge_fields!(self, other;
            display, width, height,
            padding, padding_top, padding_right, padding_bottom, padding_left,
            margin, margin_top, margin_right, margin_bottom, margin_left,
            border_width, border_top_width, border_right_width, border_bottom_width,
            border_left_width,
            position, top, right, bottom, left, z_index, transform, perspective, opacity,
            flex_direction, flex_wrap, justify_content, align_items, align_content, align_self,
            flex_grow, flex_shrink, flex_basis, order, row_gap, column_gap,
            list_style_type, caption_side, font_size, line_height,
        );
    }

    /// The `display` value (initial: `block`).
    #[must_use]
    pub fn display(&self) -> Display {
        self.display.unwrap_or_default()
    }

    /// The `position` value (initial: `static`).
    #[must_use]
    pub fn position(&self) -> PositionType {
        self.position.unwrap_or_default()
    }

    /// The `z-index` value (initial: `auto`).
    #[must_use]
    pub fn z_index(&self) -> ZIndex {
        self.z_index.unwrap_or_default()
    }

    /// The `flex-direction` value (initial: `row`).
    #[must_use]
    pub fn flex_direction(&self) -> FlexDirection {
        self.flex_direction.unwrap_or_default()
    }

    /// The `flex-wrap` value (initial: `nowrap`).
    #[must_use]
    pub fn flex_wrap(&self) -> FlexWrap {
        self.flex_wrap.unwrap_or_default()
    }

    /// The `justify-content` value (initial: `flex-start`).
    #[must_use]
    pub fn justify_content(&self) -> JustifyContent {
        self.justify_content.unwrap_or_default()
    }

    /// The `align-items` value (initial: `stretch`).
    #[must_use]
    pub fn align_items(&self) -> AlignItems {
        self.align_items.unwrap_or_default()
    }

    /// The `align-content` value (initial: `stretch`).
    #[must_use]
    pub fn align_content(&self) -> AlignContent {
        self.align_content.unwrap_or_default()
    }

    /// The `align-self` value (initial: `auto`).
    #[must_use]
    pub fn align_self(&self) -> AlignSelf {
        self.align_self.unwrap_or_default()
    }

    /// The flex grow factor (initial: 0).
    #[must_use]
    pub fn flex_grow(&self) -> f32 {
        self.flex_grow.unwrap_or(0.0)
    }

    /// The flex shrink factor (initial: 1).
    #[must_use]
    pub fn flex_shrink(&self) -> f32 {
        self.flex_shrink.unwrap_or(1.0)
    }

    /// The `flex-basis` value (initial: `auto`).
    #[must_use]
    pub fn flex_basis(&self) -> AutoLength {
        self.flex_basis.unwrap_or(AutoLength::Auto)
    }

    /// The `order` value (initial: 0).
    #[must_use]
    pub fn order(&self) -> f32 {
        self.order.unwrap_or(0.0)
    }

    /// The `list-style-type` value (initial: `disc`).
    #[must_use]
    pub fn list_style_type(&self) -> ListStyleType {
        self.list_style_type.unwrap_or_default()
    }

    /// The `caption-side` value (initial: `top`).
    #[must_use]
    pub fn caption_side(&self) -> CaptionSide {
        self.caption_side.unwrap_or_default()
    }

    /// Opacity (initial: 1).
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity.unwrap_or(1.0)
    }

    /// A `transform` other than `none` is set.
    #[must_use]
    pub fn has_transform(&self) -> bool {
        self.transform.as_deref().is_some_and(|t| !t.is_empty() && t != "none")
    }

    /// A `perspective` other than `none` is set.
    #[must_use]
    pub fn has_perspective(&self) -> bool {
        self.perspective.as_deref().is_some_and(|p| !p.is_empty() && p != "none")
    }

    /// Padding on four sides.
    ///
    /// When any longhand is set the longhands win entirely and the shorthand
    /// is ignored; sides without a longhand are zero.
    #[must_use]
    pub fn padding_edges(&self) -> EdgeValues<LengthValue> {
        pick_edges(
            self.padding,
            [
                self.padding_top,
                self.padding_right,
                self.padding_bottom,
                self.padding_left,
            ],
            LengthValue::ZERO,
        )
    }

    /// Margins on four sides, with the same longhand rule as
    /// [`Self::padding_edges`].
    #[must_use]
    pub fn margin_edges(&self) -> EdgeValues<AutoLength> {
        pick_edges(
            self.margin,
            [
                self.margin_top,
                self.margin_right,
                self.margin_bottom,
                self.margin_left,
            ],
            AutoLength::Length(LengthValue::ZERO),
        )
    }

    /// Border widths on four sides, with the same longhand rule as
    /// [`Self::padding_edges`].
    #[must_use]
    pub fn border_edges(&self) -> EdgeValues<LengthValue> {
        pick_edges(
            self.border_width,
            [
                self.border_top_width,
                self.border_right_width,
                self.border_bottom_width,
                self.border_left_width,
            ],
            LengthValue::ZERO,
        )
    }
}

/// Choose between a shorthand and its longhands.
fn pick_edges<T: Copy>(
    shorthand: Option<EdgeValues<T>>,
    [top, right, bottom, left]: [Option<T>; 4],
    zero: T,
) -> EdgeValues<T> {
    if top.is_some() || right.is_some() || bottom.is_some() || left.is_some() {
        EdgeValues {
            top: top.unwrap_or(zero),
            right: right.unwrap_or(zero),
            bottom: bottom.unwrap_or(zero),
            left: left.unwrap_or(zero),
        }
    } else {
        shorthand.unwrap_or(EdgeValues::uniform(zero))
    }
}

/// "Negative values are invalid."
fn parse_flex_factor(property: &str, value: &str) -> Result<f32, LayoutError> {
    let factor = parse_number(property, value)?;
    if factor < 0.0 {
        return Err(LayoutError::malformed(property, value, "must not be negative"));
    }
    Ok(factor)
}

/// `paddingTop` -> `padding-top`; kebab-case input is returned lowercased.
fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.trim().chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("paddingTop"), "padding-top");
        assert_eq!(kebab_case("flex-grow"), "flex-grow");
        assert_eq!(kebab_case("zIndex"), "z-index");
        assert_eq!(kebab_case("Display"), "display");
    }

    #[test]
    fn test_pick_edges_longhands_replace_shorthand() {
        let shorthand = Some(EdgeValues::uniform(5.0_f32));
        let edges = pick_edges(shorthand, [None, Some(1.0), None, None], 0.0);
        assert_eq!(edges.right, 1.0);
        assert_eq!(edges.top, 0.0);
        assert_eq!(edges.left, 0.0);
    }
}
