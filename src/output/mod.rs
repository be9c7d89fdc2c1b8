//! Output module for presenting analysis results
//!
//! This module handles:
//! - Printing analysis reports and scan history to the terminal
//! - Rendering Markdown reports to a file

mod console;
mod markdown;

pub use console::{print_history, print_report};
pub use markdown::{format_markdown_report, write_markdown_report};
