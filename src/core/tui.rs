//! Terminal rendering primitives.
//!
//! Everything here returns a `String` so the report can be rendered once
//! and printed (or asserted on) by the caller.

use crate::core::diagnostic::Severity;
use colored::{ColoredString, Colorize};
use std::env;

const MIN_BOX_WIDTH: usize = 40;
const MAX_BOX_WIDTH: usize = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemStatus {
    Pass,
    Fail,
    Warn,
    Info,
    Skipped,
}

impl ItemStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            ItemStatus::Pass => "✅",
            ItemStatus::Fail => "❌",
            ItemStatus::Warn => "⚠️",
            ItemStatus::Info => "💡",
            ItemStatus::Skipped => "⏭",
        }
    }

    fn paint(&self, text: &str) -> ColoredString {
        match self {
            ItemStatus::Pass => text.bright_green(),
            ItemStatus::Fail => text.bright_red(),
            ItemStatus::Warn => text.bright_yellow(),
            ItemStatus::Info => text.cyan(),
            ItemStatus::Skipped => text.bright_black(),
        }
    }
}

impl From<Severity> for ItemStatus {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => ItemStatus::Fail,
            Severity::Warning => ItemStatus::Warn,
            Severity::Info => ItemStatus::Info,
        }
    }
}

pub fn terminal_width() -> usize {
    env::var("TERM_WIDTH")
        .ok()
        .and_then(|w| w.parse().ok())
        .or_else(|| env::var("COLUMNS").ok().and_then(|c| c.parse().ok()))
        .unwrap_or(80)
}

fn box_width() -> usize {
    terminal_width().clamp(MIN_BOX_WIDTH, MAX_BOX_WIDTH)
}

pub fn box_top(width: usize) -> String {
    format!("╔{}╗", "═".repeat(width.saturating_sub(2)))
}

pub fn box_bottom(width: usize) -> String {
    format!("╚{}╝", "═".repeat(width.saturating_sub(2)))
}

/// Center `content` between the box edges.
pub fn box_row(content: &str, width: usize) -> String {
    let padding = width.saturating_sub(2).saturating_sub(content.chars().count());
    let left = padding / 2;
    format!(
        "║{}{}{}║",
        " ".repeat(left),
        content,
        " ".repeat(padding - left)
    )
}

/// A three-line boxed title.
pub fn banner(title: &str, status: ItemStatus) -> String {
    let width = box_width();
    format!(
        "{}\n{}\n{}\n",
        status.paint(&box_top(width)),
        status.paint(&box_row(title, width)).bold(),
        status.paint(&box_bottom(width)),
    )
}

pub fn section(title: &str) -> String {
    format!("\n{}\n", title.bold())
}

pub fn status_line(indent: usize, message: &str, status: ItemStatus) -> String {
    format!(
        "{}{} {}\n",
        " ".repeat(indent),
        status.paint(status.icon()),
        message
    )
}

pub fn heading(indent: usize, text: &str) -> String {
    format!("{}{}\n", " ".repeat(indent), text.bright_white().bold())
}
