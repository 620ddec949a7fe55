//! Four-sided shorthand values (margin, padding, border-width).
//!
//! [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
//! [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)

use serde::Serialize;

use crate::error::LayoutError;

/// One value per physical side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeValues<T> {
    /// Top side.
    pub top: T,
    /// Right side.
    pub right: T,
    /// Bottom side.
    pub bottom: T,
    /// Left side.
    pub left: T,
}

impl<T: Copy> EdgeValues<T> {
    /// The same value on all four sides.
    #[must_use]
    pub const fn uniform(value: T) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Parse a 1 to 4 value shorthand.
    ///
    /// [§ 8.3](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    ///
    /// "If there is only one component value, it applies to all sides. If
    /// there are two values, the top and bottom margins are set to the first
    /// value and the right and left margins are set to the second. If there
    /// are three values, the top is set to the first value, the left and
    /// right are set to the second, and the bottom is set to the third. If
    /// there are four values, they apply to the top, right, bottom, and left,
    /// respectively."
    ///
    /// # Errors
    ///
    /// A component that does not parse, or a count other than one to four.
    pub fn parse_shorthand(
        property: &str,
        raw: &str,
        parse_one: impl Fn(&str, &str) -> Result<T, LayoutError>,
    ) -> Result<Self, LayoutError> {
        let parts = raw
            .split_whitespace()
            .map(|part| parse_one(property, part))
            .collect::<Result<Vec<T>, LayoutError>>()?;

        match parts.as_slice() {
            [all] => Ok(Self::uniform(*all)),
            [vertical, horizontal] => Ok(Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, horizontal, bottom] => Ok(Self {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            _ => Err(LayoutError::malformed(
                property,
                raw,
                format!("expected 1 to 4 values, found {}", parts.len()),
            )),
        }
    }

    /// Apply `f` to every side.
    #[must_use]
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> EdgeValues<U> {
        EdgeValues {
            top: f(self.top),
            right: f(self.right),
            bottom: f(self.bottom),
            left: f(self.left),
        }
    }
}
