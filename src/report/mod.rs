//! Report renderers for the merged dependency list.
//!
//! - [`json`]: the license report artifact: pretty-printed, stable key order.
//! - [`terminal`]: colored summary table of which dependencies got a license;
//!   respects `--quiet`.

pub mod json;
pub mod terminal;
