//! CSS value types.

mod edges;
mod length;

pub use edges::EdgeValues;
pub use length::{AutoLength, DEFAULT_FONT_SIZE_PX, LengthValue, parse_number};
