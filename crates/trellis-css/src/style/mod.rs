//! Style values and per-element style properties.
//!
//! This module implements the value types the layout engines consume:
//! - [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/) lengths
//! - [CSS Display Module Level 3](https://www.w3.org/TR/css-display-3/) display types
//! - keyword properties from [CSS Flexible Box Layout](https://www.w3.org/TR/css-flexbox-1/),
//!   [CSS Lists](https://www.w3.org/TR/css-lists-3/) and CSS 2.1 tables

pub mod computed;
mod display;
pub mod keywords;
mod values;

// Re-export all public types
pub use computed::StyleProperties;
pub use display::Display;
pub use keywords::{
    AlignContent, AlignItems, AlignSelf, CaptionSide, FlexDirection, FlexWrap, JustifyContent,
    ListStyleType,
};
pub use values::{AutoLength, DEFAULT_FONT_SIZE_PX, EdgeValues, LengthValue, parse_number};
