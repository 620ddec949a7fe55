//! CSS Length values and parsing
//!
//! [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)

use serde::Serialize;

use crate::error::LayoutError;

/// User agent default font size.
/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
/// "Lengths refer to distance measurements and are denoted by `<length>` in the
/// property definitions."
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LengthValue {
    /// [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
    /// "1px = 1/96th of 1in"
    Px(f32),
    /// [§ 5.1.1 Font-relative lengths](https://www.w3.org/TR/css-values-4/#font-relative-lengths)
    /// "Equal to the computed value of the font-size property of the element"
    Em(f32),
    /// [§ 5.1.2 Viewport-percentage lengths](https://www.w3.org/TR/css-values-4/#viewport-relative-lengths)
    /// "1vw = 1% of viewport width"
    Vw(f32),
    /// [§ 5.1.2 Viewport-percentage lengths](https://www.w3.org/TR/css-values-4/#viewport-relative-lengths)
    /// "1vh = 1% of viewport height"
    Vh(f32),
    /// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    /// "A <percentage> value is denoted by <percentage>, and consists of a
    /// <number> immediately followed by a percent sign '%'."
    Percent(f32),
}

impl LengthValue {
    /// Zero pixels.
    pub const ZERO: Self = Self::Px(0.0);

    /// Parse a textual length such as `12px`, `50%`, `1.5em`, `10vw`.
    ///
    /// A bare number is read as pixels. An unknown unit, a missing number,
    /// or a non-finite number is a [`LayoutError::MalformedValue`].
    ///
    /// # Errors
    ///
    /// [`LayoutError::MalformedValue`] as described above.
    pub fn parse(property: &str, raw: &str) -> Result<Self, LayoutError> {
        let text = raw.trim();
        let (number, unit) = split_number_unit(text)
            .ok_or_else(|| LayoutError::malformed(property, raw, "expected a number"))?;

        match unit.to_ascii_lowercase().as_str() {
            "" | "px" => Ok(Self::Px(number)),
            "em" => Ok(Self::Em(number)),
            "vw" => Ok(Self::Vw(number)),
            "vh" => Ok(Self::Vh(number)),
            "%" => Ok(Self::Percent(number)),
            other => Err(LayoutError::malformed(
                property,
                raw,
                format!("unknown unit `{other}`"),
            )),
        }
    }

    /// Returns true for percentages.
    #[must_use]
    pub const fn is_percent(&self) -> bool {
        matches!(self, Self::Percent(_))
    }

    /// Get the value in pixels, resolving viewport units.
    ///
    /// [§ 5.1.2 Viewport-percentage lengths](https://www.w3.org/TR/css-values-4/#viewport-relative-lengths)
    /// "The viewport-percentage lengths are relative to the size of the
    /// initial containing block."
    ///
    /// Percentages return `None`: they need a reference size, see
    /// [`Self::to_px_with_containing_block`].
    #[must_use]
    pub fn to_px_with_viewport(&self, viewport_width: f32, viewport_height: f32) -> Option<f32> {
        match self {
            Self::Px(px) => Some(*px),
            Self::Em(em) => Some(*em * DEFAULT_FONT_SIZE_PX),
            // "1vw = 1% of viewport width"
            Self::Vw(vw) => Some(*vw * viewport_width / 100.0),
            // "1vh = 1% of viewport height"
            Self::Vh(vh) => Some(*vh * viewport_height / 100.0),
            Self::Percent(_) => None,
        }
    }

    /// Resolve a length to pixels, resolving percentages against a containing
    /// block dimension and viewport units against the viewport.
    ///
    /// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    /// "Percentages are always relative to another quantity, for example a length."
    #[must_use]
    pub fn to_px_with_containing_block(
        &self,
        cb_dimension: f32,
        viewport_width: f32,
        viewport_height: f32,
    ) -> f32 {
        match self {
            Self::Percent(pct) => *pct * cb_dimension / 100.0,
            other => other
                .to_px_with_viewport(viewport_width, viewport_height)
                .unwrap_or(0.0),
        }
    }
}

/// [§ 4.4 Automatic values](https://www.w3.org/TR/CSS2/cascade.html#value-def-auto)
///
/// "Some properties can take the keyword 'auto' as a value. This keyword
/// allows the user agent to compute the value based on other properties."
///
/// Used for width, height, margins, offsets and flex-basis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum AutoLength {
    /// The value is 'auto' and will be resolved during layout.
    Auto,

    /// A specific length value (px, em, %, etc.).
    Length(LengthValue),
}

impl AutoLength {
    /// Parse `auto` or a length.
    ///
    /// # Errors
    ///
    /// Fails like [`LengthValue::parse`].
    pub fn parse(property: &str, raw: &str) -> Result<Self, LayoutError> {
        if raw.trim().eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else {
            LengthValue::parse(property, raw).map(Self::Length)
        }
    }

    /// Check if the value is 'auto'.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// The length, or `None` for 'auto'.
    #[must_use]
    pub const fn length(&self) -> Option<LengthValue> {
        match self {
            Self::Auto => None,
            Self::Length(len) => Some(*len),
        }
    }
}

/// Parse a plain finite number such as a flex factor or opacity.
///
/// # Errors
///
/// [`LayoutError::MalformedValue`] when the text is not a finite number.
pub fn parse_number(property: &str, raw: &str) -> Result<f32, LayoutError> {
    let text = raw.trim();
    match split_number_unit(text) {
        Some((number, "")) => Ok(number),
        _ => Err(LayoutError::malformed(property, raw, "expected a finite number")),
    }
}

/// Split `"12.5px"` into `(12.5, "px")`.
///
/// Returns `None` when there is no leading number or it is not finite.
fn split_number_unit(text: &str) -> Option<(f32, &str)> {
    let end = text
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .map_or(text.len(), |(i, _)| i);
    let (number, unit) = text.split_at(end);
    let value = number.parse::<f32>().ok()?;
    value.is_finite().then_some((value, unit.trim()))
}
