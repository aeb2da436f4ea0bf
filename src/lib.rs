//! termdown - render markdown documents, tables included, as styled terminal output.
//!
//! The library half holds the whole pipeline; the binary only wires
//! configuration and command line flags into it.
//!
//! ```no_run
//! use termdown::markdown::{render_document, RenderOptions};
//!
//! let out = render_document("| a | b |\n|---|--:|\n| 1 | 2 |\n", &RenderOptions::default())?;
//! print!("{}", out);
//! # Ok::<(), termdown::RenderError>(())
//! ```

pub mod config;
pub mod error;
pub mod markdown;
pub mod output;

pub use error::{RenderError, Result};
pub use markdown::{parse, render_document, tokenize, RenderOptions};
