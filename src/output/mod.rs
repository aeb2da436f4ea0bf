//! Output formatting module

pub mod colorize;
mod formatter;

pub use formatter::*;
