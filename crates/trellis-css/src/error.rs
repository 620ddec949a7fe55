//! Layout errors and recovered-condition diagnostics.
//!
//! Two classes of problems come out of a layout pass:
//!
//! - [`LayoutError`] is structural. It aborts the pass and no partial tree
//!   is returned: a referenced element has no resolved dimensions, a
//!   percentage has nothing to resolve against, or a style value is
//!   malformed.
//! - [`Diagnostic`] is recovered. Layout completes and the diagnostic is
//!   attached to the output: a leaf fell back to a default content size, or
//!   content overflows its container.

use serde::Serialize;
use thiserror::Error;
use trellis_dom::NodeId;

/// A structural layout failure. Always aborts the current pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// A referenced element or containing block has no resolved dimensions.
    #[error("missing resolved dimensions for node {node} ({context})")]
    MissingDimensions {
        /// The element whose dimensions were needed.
        node: NodeId,
        /// What was being resolved when the lookup failed.
        context: &'static str,
    },

    /// A percentage value was used where no reference size exists.
    #[error("percentage {value}% for `{property}` has no reference size")]
    UnresolvablePercentage {
        /// The property holding the percentage.
        property: &'static str,
        /// The percentage value.
        value: f32,
    },

    /// A textual style value could not be parsed.
    #[error("malformed value `{value}` for `{property}`: {reason}")]
    MalformedValue {
        /// The property name.
        property: String,
        /// The raw value text.
        value: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A numeric style value that must be finite was NaN or infinite.
    #[error("non-finite `{property}` on node {node}")]
    NonFinite {
        /// The property name.
        property: &'static str,
        /// The element carrying the value.
        node: NodeId,
    },

    /// A node id that is not part of the tree.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
}

impl LayoutError {
    /// Build a [`LayoutError::MalformedValue`].
    pub(crate) fn malformed(property: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::MalformedValue {
            property: property.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Which axis a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Horizontal.
    Horizontal,
    /// Vertical.
    Vertical,
}

/// A recovered condition recorded during layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A leaf had no explicit size and no measurable content, so the
    /// documented default content size was used.
    ContentSizingFallback {
        /// Width that was substituted.
        width: f32,
        /// Height that was substituted.
        height: f32,
    },
    /// Content extends past its container on `axis` by `amount` units.
    Overflow {
        /// The overflowing axis.
        axis: Axis,
        /// How far the content exceeds the container.
        amount: f32,
    },
}

/// A recovered condition attached to a specific element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// The element the condition was found on.
    pub node: NodeId,
    /// What happened.
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Returns true for overflow diagnostics.
    #[must_use]
    pub const fn is_overflow(&self) -> bool {
        matches!(self.kind, DiagnosticKind::Overflow { .. })
    }

    /// Returns true for content-sizing fallbacks.
    #[must_use]
    pub const fn is_sizing_fallback(&self) -> bool {
        matches!(self.kind, DiagnosticKind::ContentSizingFallback { .. })
    }
}
