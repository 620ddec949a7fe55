//! Common utilities for the trellis layout engine.
//!
//! This crate provides shared infrastructure used by all trellis crates:
//! - **Warning System** - colored, deduplicated terminal output for
//!   recovered style problems (unknown keywords, unknown properties)

pub mod warning;
