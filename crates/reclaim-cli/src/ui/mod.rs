//! UI Module - terminal output for commands
//!
//! - [`theme`] - colours, icons, and [`format_size`]
//! - [`output`] - the [`Output`] handle commands print through; it also
//!   implements the engine's `Reporter` so progress shows up live
//! - [`table`] - plan, result, and scan tables

pub mod output;
pub mod table;
pub mod theme;

pub use output::Output;
pub use theme::{Theme, format_size};
