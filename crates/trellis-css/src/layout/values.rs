//! Used-value resolution for lengths during layout.
//!
//! [§ 6.1 Used Values](https://www.w3.org/TR/css-cascade-4/#used)
//!
//! "The used value is the result of taking the computed value and
//! completing any remaining calculations to make it the absolute
//! theoretical value used in the layout of the document."

use crate::error::LayoutError;
use crate::style::{AutoLength, EdgeValues, LengthValue};

use super::box_model::{EdgeSizes, Size};

/// Resolves lengths to pixels against a viewport and an optional
/// reference size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthResolver {
    /// Viewport size for `vw`/`vh`.
    pub viewport: Size,
}

impl LengthResolver {
    /// A resolver for the given viewport.
    #[must_use]
    pub const fn new(viewport: Size) -> Self {
        Self { viewport }
    }

    /// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    ///
    /// "Percentages are always relative to another quantity, for example a length."
    ///
    /// A percentage with no `reference` cannot be resolved and is a
    /// structural error.
    ///
    /// # Errors
    ///
    /// A percentage with no `reference` is a [`LayoutError::UnresolvablePercentage`].
    pub fn length(
        &self,
        property: &'static str,
        value: LengthValue,
        reference: Option<f32>,
    ) -> Result<f32, LayoutError> {
        match (value, reference) {
            (LengthValue::Percent(pct), None) => Err(LayoutError::UnresolvablePercentage {
                property,
                value: pct,
            }),
            (value, reference) => Ok(value.to_px_with_containing_block(
                reference.unwrap_or(0.0),
                self.viewport.width,
                self.viewport.height,
            )),
        }
    }

    /// Resolve an optional auto-or-length; unset reads as `auto`.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::length`].
    pub fn auto_length(
        &self,
        property: &'static str,
        value: Option<AutoLength>,
        reference: Option<f32>,
    ) -> Result<AutoOr, LayoutError> {
        match value {
            None | Some(AutoLength::Auto) => Ok(AutoOr::Auto),
            Some(AutoLength::Length(len)) => {
                self.length(property, len, reference).map(AutoOr::Length)
            }
        }
    }

    /// Resolve four lengths against one reference.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::length`] on the first side that does.
    pub fn edges(
        &self,
        property: &'static str,
        edges: EdgeValues<LengthValue>,
        reference: Option<f32>,
    ) -> Result<EdgeSizes, LayoutError> {
        Ok(EdgeSizes {
            top: self.length(property, edges.top, reference)?,
            right: self.length(property, edges.right, reference)?,
            bottom: self.length(property, edges.bottom, reference)?,
            left: self.length(property, edges.left, reference)?,
        })
    }

    /// Resolve four auto-or-lengths against one reference.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::length`] on the first side that does.
    pub fn auto_edges(
        &self,
        property: &'static str,
        edges: EdgeValues<AutoLength>,
        reference: Option<f32>,
    ) -> Result<AutoEdgeSizes, LayoutError> {
        Ok(AutoEdgeSizes {
            top: self.auto_length(property, Some(edges.top), reference)?,
            right: self.auto_length(property, Some(edges.right), reference)?,
            bottom: self.auto_length(property, Some(edges.bottom), reference)?,
            left: self.auto_length(property, Some(edges.left), reference)?,
        })
    }
}

/// [§ 4.4 Automatic values](https://www.w3.org/TR/CSS2/cascade.html#value-def-auto)
///
/// "Some properties can take the keyword 'auto' as a value. This keyword
/// allows the user agent to compute the value based on other properties."
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AutoOr {
    /// The value is 'auto' and must be resolved during layout.
    #[default]
    Auto,
    /// The value is a specific length in pixels.
    Length(f32),
}

impl AutoOr {
    /// Check if the value is 'auto'.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Get the length value, or a default if 'auto'.
    #[must_use]
    pub const fn to_px_or(&self, default: f32) -> f32 {
        match self {
            Self::Length(v) => *v,
            Self::Auto => default,
        }
    }

    /// The length, or `None` for 'auto'.
    #[must_use]
    pub const fn length(&self) -> Option<f32> {
        match self {
            Self::Length(v) => Some(*v),
            Self::Auto => None,
        }
    }
}

/// [§ 8 Box model](https://www.w3.org/TR/CSS2/box.html)
///
/// Edge values where each side can be 'auto' or a specific length.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AutoEdgeSizes {
    /// Top edge value.
    pub top: AutoOr,
    /// Right edge value.
    pub right: AutoOr,
    /// Bottom edge value.
    pub bottom: AutoOr,
    /// Left edge value.
    pub left: AutoOr,
}

impl AutoEdgeSizes {
    /// Treat every `auto` side as zero.
    #[must_use]
    pub const fn or_zero(&self) -> EdgeSizes {
        EdgeSizes {
            top: self.top.to_px_or(0.0),
            right: self.right.to_px_or(0.0),
            bottom: self.bottom.to_px_or(0.0),
            left: self.left.to_px_or(0.0),
        }
    }
}
