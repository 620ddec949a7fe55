//! Style values, cascade, and layout for trees of styled elements.
//!
//! # Scope
//!
//! This crate implements:
//! - **Style values** ([CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/))
//!   - Lengths in `px`, `%`, `vw`, `vh`, `em`
//!   - Keyword properties for display, flexbox, positioning, lists and tables
//!
//! - **Cascade** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/))
//!   - Type, class, id and `:hover` selectors
//!   - Fixed precedence: type defaults < type < class < id, then hover
//!
//! - **Layout** ([CSS 2.1 Visual Formatting Model](https://www.w3.org/TR/CSS2/visuren.html))
//!   - Box model resolution against the parent's content box
//!   - Normal flow, flexbox, tables and lists
//!   - Relative, absolute and fixed positioning
//!   - Stacking contexts and paint depth
//!   - Partial re-layout after a content size change
//!
//! # Not Implemented
//!
//! - CSS grid, multi-column, floats
//! - Writing modes and right-to-left text
//! - `border-spacing`, `border-collapse`
//! - Glyph shaping (text is measured through [`TextMeasurer`])

/// CSS cascade per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod cascade;
/// Structural layout errors and recovered diagnostics.
pub mod error;
/// Layout engines and the output tree.
pub mod layout;
/// Selector parsing and matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;
/// Style values and per-element properties.
pub mod style;
/// Type-default styles per element kind.
pub mod ua_stylesheet;

// Re-exports for convenience
pub use cascade::{RuleSetResolver, StyleResolver, StyleRule, compute_styles};
pub use error::{Axis, Diagnostic, DiagnosticKind, LayoutError};
pub use layout::{
    ApproximateTextMeasurer, BoxDimensions, EdgeSizes, LayoutBox, LayoutConfig, LayoutEngine,
    LayoutOutput, LayoutUpdate, Rect, Size, TextMeasurer, Viewport, ViewportProvider,
    ViewportTransform,
};
pub use selector::Selector;
pub use style::{
    AutoLength, DEFAULT_FONT_SIZE_PX, Display, LengthValue, ListStyleType, StyleProperties,
};
