//! CSS Box Model types and per-element box resolution.
//!
//! [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)
//!
//! All rectangles are in a parent-relative coordinate space: the origin is
//! the top-left corner of the parent's content box and y grows downward.
//! Flipping into a renderer's own convention happens outside layout.

use serde::Serialize;

use crate::error::LayoutError;
use crate::style::StyleProperties;

use super::values::LengthResolver;

/// [§ 3. The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
///
/// "Each box has a content area and optional surrounding padding, border,
/// and margin areas."
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoxDimensions {
    /// Content area dimensions
    pub content: Rect,
    /// Padding edge (content + padding)
    pub padding: EdgeSizes,
    /// Border edge (content + padding + border)
    pub border: EdgeSizes,
    /// Margin edge (content + padding + border + margin)
    pub margin: EdgeSizes,
}

/// A rectangle positioned in 2D space.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: f32,
    /// Vertical position of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// A rectangle at `(x, y)` with the given size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The size of the rectangle.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// The same rectangle moved by `(dx, dy)`.
    #[must_use]
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// A width and height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Size {
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Size {
    /// A size of `width` × `height`.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Edge sizes for padding, border, or margin.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EdgeSizes {
    /// Top edge size.
    pub top: f32,
    /// Right edge size.
    pub right: f32,
    /// Bottom edge size.
    pub bottom: f32,
    /// Left edge size.
    pub left: f32,
}

impl EdgeSizes {
    /// The same size on every side.
    #[must_use]
    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// `left + right`
    #[must_use]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// `top + bottom`
    #[must_use]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

impl BoxDimensions {
    // [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
    //
    // The boxes from innermost to outermost:
    //   1. Content box  - the actual content (text, images, etc.)
    //   2. Padding box  - content + padding
    //   3. Border box   - content + padding + border
    //   4. Margin box   - content + padding + border + margin (outermost)

    /// [§ 3.1 Margins](https://www.w3.org/TR/css-box-3/#margins)
    ///
    /// "The margin box is the outermost box, and contains all four areas."
    ///
    /// ```text
    /// x = content.x - padding.left - border.left - margin.left
    /// width = content.width + padding.h + border.h + margin.h
    /// ```
    #[must_use]
    pub fn margin_box(&self) -> Rect {
        let border = self.border_box();
        Rect {
            x: border.x - self.margin.left,
            y: border.y - self.margin.top,
            width: border.width + self.margin.horizontal(),
            height: border.height + self.margin.vertical(),
        }
    }

    /// [§ 3.2 Padding](https://www.w3.org/TR/css-box-3/#paddings)
    ///
    /// "The padding box contains both the content and padding areas."
    #[must_use]
    pub fn padding_box(&self) -> Rect {
        Rect {
            x: self.content.x - self.padding.left,
            y: self.content.y - self.padding.top,
            width: self.content.width + self.padding.horizontal(),
            height: self.content.height + self.padding.vertical(),
        }
    }

    /// [§ 3.3 Borders](https://www.w3.org/TR/css-box-3/#borders)
    ///
    /// "The border box contains content, padding, and border areas."
    #[must_use]
    pub fn border_box(&self) -> Rect {
        let padding = self.padding_box();
        Rect {
            x: padding.x - self.border.left,
            y: padding.y - self.border.top,
            width: padding.width + self.border.horizontal(),
            height: padding.height + self.border.vertical(),
        }
    }

    /// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
    /// "The content box contains the actual content of the element."
    #[must_use]
    pub const fn content_box(&self) -> Rect {
        self.content
    }

    /// Padding + border + margin on the left and right.
    #[must_use]
    pub fn extra_width(&self) -> f32 {
        self.padding.horizontal() + self.border.horizontal() + self.margin.horizontal()
    }

    /// Padding + border + margin on the top and bottom.
    #[must_use]
    pub fn extra_height(&self) -> f32 {
        self.padding.vertical() + self.border.vertical() + self.margin.vertical()
    }

    /// Place the margin box's top-left corner at `(x, y)`, keeping sizes.
    pub fn set_margin_origin(&mut self, x: f32, y: f32) {
        self.content.x = x + self.margin.left + self.border.left + self.padding.left;
        self.content.y = y + self.margin.top + self.border.top + self.padding.top;
    }

    /// Set the content size from a margin-box size, clamping at zero.
    pub fn set_outer_size(&mut self, width: f32, height: f32) {
        self.content.width = (width - self.extra_width()).max(0.0);
        self.content.height = (height - self.extra_height()).max(0.0);
    }
}

/// Output of [`resolve_box`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResolvedBox {
    /// The resolved geometry. `content.x`/`content.y` are parent-relative.
    pub dimensions: BoxDimensions,
    /// Width was `auto` and took the parent's remaining content width.
    pub auto_width: bool,
    /// Height was `auto` and took the parent's remaining content height.
    pub auto_height: bool,
    /// `left` placed the box horizontally (otherwise it is centered).
    pub explicit_x: bool,
    /// `top` placed the box vertically (otherwise it is centered).
    pub explicit_y: bool,
}

/// Resolve padding, border, margin, size and position of one element
/// relative to its parent's content box.
///
/// `parent` is the parent's content size. `None` means there is no
/// reference size, and any percentage is an
/// [`LayoutError::UnresolvablePercentage`].
///
/// - Width/height: explicit lengths are used as-is; percentages resolve
///   against the parent's content width/height; `auto` takes the parent's
///   remaining content size after this box's own padding, border and margin.
/// - Padding/border/margin: percentages resolve against the parent's content
///   width, on every side ([§ 8.3/8.4](https://www.w3.org/TR/CSS2/box.html#padding-properties)).
///   `auto` margins are zero.
/// - Position: `left`/`top` give the margin-box offset from the parent's
///   content origin; without them the margin box is centered on that axis.
///   Offsets are only read for `position: static`, the positioning resolver
///   owns them for every other scheme.
///
/// Content sizes never go below zero.
///
/// # Errors
///
/// Any percentage that resolves against an absent reference size.
pub fn resolve_box(
    style: &StyleProperties,
    parent: Option<Size>,
    resolver: &LengthResolver,
) -> Result<ResolvedBox, LayoutError> {
    let parent_width = parent.map(|p| p.width);
    let parent_height = parent.map(|p| p.height);

    // STEP 1: Edges.
    let padding = resolver.edges("padding", style.padding_edges(), parent_width)?;
    let border = resolver.edges("border-width", style.border_edges(), parent_width)?;
    let margin = resolver
        .auto_edges("margin", style.margin_edges(), parent_width)?
        .or_zero();

    let mut dims = BoxDimensions {
        content: Rect::default(),
        padding,
        border,
        margin,
    };

    // STEP 2: Size.
    let width = resolver.auto_length("width", style.width, parent_width)?;
    let height = resolver.auto_length("height", style.height, parent_height)?;

    dims.content.width = width
        .to_px_or(parent_width.unwrap_or(0.0) - dims.extra_width())
        .max(0.0);
    dims.content.height = height
        .to_px_or(parent_height.unwrap_or(0.0) - dims.extra_height())
        .max(0.0);

    // STEP 3: Position.
    let is_static = style.position().is_static();
    let left = if is_static {
        resolver.auto_length("left", style.left, parent_width)?.length()
    } else {
        None
    };
    let top = if is_static {
        resolver.auto_length("top", style.top, parent_height)?.length()
    } else {
        None
    };

    let outer = dims.margin_box();
    let x = left.unwrap_or_else(|| (parent_width.unwrap_or(0.0) - outer.width) / 2.0);
    let y = top.unwrap_or_else(|| (parent_height.unwrap_or(0.0) - outer.height) / 2.0);
    dims.set_margin_origin(x, y);

    Ok(ResolvedBox {
        dimensions: dims,
        auto_width: width.is_auto(),
        auto_height: height.is_auto(),
        explicit_x: left.is_some(),
        explicit_y: top.is_some(),
    })
}
