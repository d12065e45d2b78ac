//! Shared primitives: diagnostics, errors, configuration, the header
//! parser, command and path resolution, and report rendering.

pub mod command;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod frontmatter;
pub mod output;
pub mod paths;
pub mod report;
pub mod tui;
