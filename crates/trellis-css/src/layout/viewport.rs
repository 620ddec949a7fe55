//! The viewport: initial containing block size plus scroll/projection.
//!
//! [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
//!
//! "The containing block in which the root element lives is a rectangle
//! called the initial containing block. For continuous media, it has the
//! dimensions of the viewport and is anchored at the canvas origin."

use serde::Deserialize;

use super::box_model::{Rect, Size};

/// Scroll offset and uniform scale applied by the scene's camera.
///
/// Fixed-position boxes are anchored to the viewport, so they are carried
/// through this transform back into scene space after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewportTransform {
    /// Horizontal scroll of the viewport over the scene.
    pub scroll_x: f32,
    /// Vertical scroll of the viewport over the scene.
    pub scroll_y: f32,
    /// Scene units per viewport unit.
    pub scale: f32,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            scale: 1.0,
        }
    }
}

impl ViewportTransform {
    /// Map a viewport-space rectangle into scene space.
    #[must_use]
    pub fn viewport_to_scene(&self, rect: Rect) -> Rect {
        Rect {
            x: rect.x * self.scale + self.scroll_x,
            y: rect.y * self.scale + self.scroll_y,
            width: rect.width * self.scale,
            height: rect.height * self.scale,
        }
    }
}

/// Current viewport state.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Viewport {
    /// Viewport width.
    pub width: f32,
    /// Viewport height.
    pub height: f32,
    /// Camera transform.
    #[serde(default)]
    pub transform: ViewportTransform,
}

impl Viewport {
    /// A viewport with no scroll and unit scale.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            transform: ViewportTransform::default(),
        }
    }

    /// The viewport size.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The initial containing block, at the origin.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Supplies the viewport to a layout pass.
pub trait ViewportProvider {
    /// The current viewport.
    fn viewport(&self) -> Viewport;
}

impl ViewportProvider for Viewport {
    fn viewport(&self) -> Viewport {
        *self
    }
}
