//! Tunable layout constants.

use serde::Deserialize;

/// Constants used by the layout engines.
///
/// Every field has a default, so a partial JSON object deserializes.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Content width used for a leaf with no explicit size and no content.
    pub default_leaf_width: f32,
    /// Content height used for a leaf with no explicit size and no content.
    pub default_leaf_height: f32,
    /// Gap between list items when the list sets no `row-gap`/`gap`.
    pub list_item_spacing: f32,
    /// Horizontal space reserved for a list marker.
    pub list_marker_inset: f32,
    /// Smallest list item height.
    pub list_min_item_height: f32,
    /// Smallest list item height as a fraction of the list's content height.
    pub list_min_item_ratio: f32,
    /// Tolerance when deciding whether a flex item still fits on a line.
    pub flex_wrap_epsilon: f32,
    /// Smallest multiplier between adjacent stacking-context levels. It is
    /// raised when a stack level does not fit below half of it.
    pub depth_base: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_leaf_width: 100.0,
            default_leaf_height: 30.0,
            list_item_spacing: 4.0,
            list_marker_inset: 20.0,
            list_min_item_height: 8.0,
            list_min_item_ratio: 0.10,
            flex_wrap_epsilon: 1e-3,
            depth_base: 1000.0,
        }
    }
}
