//! CSS Display property types and parsing
//!
//! [§ 2 Box Layout Modes: the display property](https://www.w3.org/TR/css-display-3/#the-display-properties)

use serde::Serialize;
use strum_macros::{AsRefStr, Display as StrumDisplay};

use trellis_common::warning::warn_once;

/// The layout mode an element's box takes part in and lays its children out with.
///
/// [§ 2 Box Layout Modes](https://www.w3.org/TR/css-display-3/#the-display-properties)
///
/// "The display property defines an element's display type, which consists of
/// the two basic qualities of how an element generates boxes."
///
/// Only the combinations the layout engines dispatch on are modelled; inline
/// values collapse to [`Display::Block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, StrumDisplay, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    /// Block flow container.
    #[default]
    Block,
    /// [CSS Flexible Box Layout](https://www.w3.org/TR/css-flexbox-1/)
    Flex,
    /// [§ 17.2 The CSS table model](https://www.w3.org/TR/CSS2/tables.html#table-display)
    Table,
    /// "table-header-group (In HTML: THEAD)"
    TableHeaderGroup,
    /// "table-row-group (In HTML: TBODY)"
    TableRowGroup,
    /// "table-footer-group (In HTML: TFOOT)"
    TableFooterGroup,
    /// "table-row (In HTML: TR)"
    TableRow,
    /// "table-cell (In HTML: TD, TH)"
    TableCell,
    /// "table-column (In HTML: COL)"
    TableColumn,
    /// "table-column-group (In HTML: COLGROUP)"
    TableColumnGroup,
    /// "table-caption (In HTML: CAPTION)"
    TableCaption,
    /// Container whose children stack as uniformly sized list items.
    List,
    /// [§ 2.3 Generating Marker Boxes](https://www.w3.org/TR/css-display-3/#list-items)
    ListItem,
    /// [§ 2.6 display: none](https://www.w3.org/TR/css-display-3/#valdef-display-none)
    ///
    /// "The element and its descendants generate no boxes or text runs."
    None,
}

impl Display {
    /// Parse a display keyword. Unknown values warn once and fall back to
    /// `block`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "block" | "flow-root" | "inline" | "inline-block" | "contents" => Self::Block,
            "flex" | "inline-flex" => Self::Flex,
            "table" | "inline-table" => Self::Table,
            "table-header-group" => Self::TableHeaderGroup,
            "table-row-group" => Self::TableRowGroup,
            "table-footer-group" => Self::TableFooterGroup,
            "table-row" => Self::TableRow,
            "table-cell" => Self::TableCell,
            "table-column" => Self::TableColumn,
            "table-column-group" => Self::TableColumnGroup,
            "table-caption" => Self::TableCaption,
            "list" => Self::List,
            "list-item" => Self::ListItem,
            "none" => Self::None,
            other => {
                warn_once("style", &format!("unsupported display value '{other}', using block"));
                Self::Block
            }
        }
    }

    /// Table row groups: header, body and footer.
    #[must_use]
    pub const fn is_row_group(self) -> bool {
        matches!(
            self,
            Self::TableHeaderGroup | Self::TableRowGroup | Self::TableFooterGroup
        )
    }

    /// Column definitions (`table-column` or `table-column-group`).
    #[must_use]
    pub const fn is_column_definition(self) -> bool {
        matches!(self, Self::TableColumn | Self::TableColumnGroup)
    }
}
