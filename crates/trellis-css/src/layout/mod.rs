//! Layout engine.
//!
//! Computes the geometry of every displayed element: box model, normal
//! flow, flexbox, tables, lists, and positioned layout with stacking.
//!
//! # Relevant Specifications
//!
//! - [CSS 2.1 Box Model](https://www.w3.org/TR/CSS2/box.html)
//! - [CSS 2.1 Visual Formatting Model](https://www.w3.org/TR/CSS2/visuren.html)
//! - [CSS Flexible Box Layout Module Level 1](https://www.w3.org/TR/css-flexbox-1/)
//! - [CSS 2.1 Tables](https://www.w3.org/TR/CSS2/tables.html)
//! - [CSS Lists and Counters Module Level 3](https://www.w3.org/TR/css-lists-3/)
//! - [CSS Positioned Layout Module Level 3](https://www.w3.org/TR/css-position-3/)
//! - [CSS 2.1 Appendix E: Elaborate description of Stacking Contexts](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! # Module Structure
//!
//! - [`box_model`] - Box dimensions, rectangles, edge sizes, and per-element box resolution
//! - [`values`] - Used-value resolution of lengths and percentages
//! - [`flex`] - Flex layout algorithm
//! - [`table`] - Table layout algorithm
//! - [`list`] - List item stacking and markers
//! - [`positioned`] - Relative, absolute and fixed positioning, containing blocks
//! - [`stacking`] - Stacking contexts and paint depth
//! - [`context`] - Per-pass state and caches
//! - [`engine`] - Full and partial layout passes
//! - [`layout_box`] - The output tree

pub mod box_model;
pub mod config;
pub mod context;
pub mod engine;
pub mod flex;
mod flow;
pub mod layout_box;
pub mod list;
pub mod positioned;
pub mod stacking;
pub mod table;
pub mod text;
pub mod values;
pub mod viewport;

// Re-exports for convenience
pub use box_model::{BoxDimensions, EdgeSizes, Rect, ResolvedBox, Size, resolve_box};
pub use config::LayoutConfig;
pub use context::{AutoAxes, LayoutCaches, LayoutContext};
pub use engine::{LayoutEngine, LayoutOutput, LayoutUpdate};
pub use flex::{FlexChild, FlexContainer, FlexLayout, FlexLine, layout_flex_children};
pub use layout_box::{LayoutBox, LayoutBoxIter};
pub use list::{ListChild, ListLayout, layout_list_items, marker_label};
pub use positioned::{
    BoxOffsets, ContainingBlock, ContainingBlockCache, PositionType, PositionedLayout,
};
pub use stacking::{EstablishedBy, StackingContext, StackingContexts, ZIndex};
pub use table::{TableLayout, TableStructure, layout_table};
pub use text::{ApproximateTextMeasurer, FontProperties, TextMeasurer, TextMetrics};
pub use values::{AutoEdgeSizes, AutoOr, LengthResolver};
pub use viewport::{Viewport, ViewportProvider, ViewportTransform};
