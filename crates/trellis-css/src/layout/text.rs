//! Text measurement for text-bearing leaves.
//!
//! Layout never shapes glyphs itself. It asks a [`TextMeasurer`] to wrap a
//! string at a maximum width and uses the resulting block size.

use crate::style::{DEFAULT_FONT_SIZE_PX, StyleProperties};

use super::values::LengthResolver;

/// Font inputs to measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontProperties {
    /// Font size in pixels.
    pub size: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
}

impl Default for FontProperties {
    fn default() -> Self {
        Self {
            size: DEFAULT_FONT_SIZE_PX,
            line_height: DEFAULT_LINE_HEIGHT,
        }
    }
}

impl FontProperties {
    /// Read `font-size` and `line-height` from a style. Percentages resolve
    /// against the default font size.
    #[must_use]
    pub fn from_style(style: &StyleProperties, resolver: &LengthResolver) -> Self {
        let size = style
            .font_size
            .and_then(|len| resolver.length("font-size", len, Some(DEFAULT_FONT_SIZE_PX)).ok())
            .filter(|s| *s > 0.0)
            .unwrap_or(DEFAULT_FONT_SIZE_PX);
        Self {
            size,
            line_height: style
                .line_height
                .filter(|lh| *lh > 0.0)
                .unwrap_or(DEFAULT_LINE_HEIGHT),
        }
    }
}

/// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
///
/// "We recommend a used value for 'normal' between 1.0 and 1.2."
pub const DEFAULT_LINE_HEIGHT: f32 = 1.2;

/// Result of measuring a string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextMetrics {
    /// The wrapped lines.
    pub lines: Vec<String>,
    /// Width of the widest line.
    pub width: f32,
    /// Total block height of all lines.
    pub height: f32,
}

/// Wrap-aware text measurement.
pub trait TextMeasurer {
    /// Measure `text`, wrapping at `max_width` when given.
    fn measure(&self, text: &str, font: &FontProperties, max_width: Option<f32>) -> TextMetrics;
}

/// Approximate measurement using fixed ratios.
///
/// The average advance width of Latin glyphs in a proportional font is
/// approximately 0.6× the font size. Lines are filled greedily word by
/// word; a word wider than the line gets a line of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateTextMeasurer;

impl ApproximateTextMeasurer {
    const CHAR_WIDTH_RATIO: f32 = 0.6;

    #[allow(clippy::cast_precision_loss)]
    fn text_width(text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * Self::CHAR_WIDTH_RATIO
    }
}

impl TextMeasurer for ApproximateTextMeasurer {
    #[allow(clippy::cast_precision_loss)]
    fn measure(&self, text: &str, font: &FontProperties, max_width: Option<f32>) -> TextMetrics {
        let mut lines: Vec<String> = Vec::new();
        let mut current = String::new();

        for word in text.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate_width = Self::text_width(&current, font.size)
                + Self::text_width(" ", font.size)
                + Self::text_width(word, font.size);
            if max_width.is_some_and(|max| candidate_width > max) {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            } else {
                current.push(' ');
                current.push_str(word);
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }

        let width = lines
            .iter()
            .map(|line| Self::text_width(line, font.size))
            .fold(0.0_f32, f32::max);
        let height = lines.len() as f32 * font.size * font.line_height;
        TextMetrics {
            lines,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_greedily() {
        let font = FontProperties {
            size: 10.0,
            line_height: 1.0,
        };
        // Each char is 6px wide: "aaa bbb" is 42px.
        let metrics = ApproximateTextMeasurer.measure("aaa bbb ccc", &font, Some(45.0));
        assert_eq!(metrics.lines, vec!["aaa bbb".to_string(), "ccc".to_string()]);
        assert!((metrics.width - 42.0).abs() < 1e-4);
        assert!((metrics.height - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_empty_text_has_no_lines() {
        let metrics = ApproximateTextMeasurer.measure("   ", &FontProperties::default(), None);
        assert!(metrics.lines.is_empty());
        assert_eq!(metrics.height, 0.0);
    }
}
