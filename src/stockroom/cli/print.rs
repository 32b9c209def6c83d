use chrono::{DateTime, Utc};
use colored::Colorize;
use std::io::{self, BufRead, Write};
use stockroom::commands::{CmdMessage, MessageLevel};
use stockroom::config::{StockroomConfig, CONFIG_KEYS};
use stockroom::feedback::{ConfirmPrompt, StatusSink};
use stockroom::model::Item;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const NAME_WIDTH: usize = 40;
const QTY_WIDTH: usize = 8;
const TIME_WIDTH: usize = 14;
const IMAGE_MARKER: &str = "▣";

/// Colors each message by severity.
pub(super) struct TerminalSink;

impl StatusSink for TerminalSink {
    fn notify(&self, message: &CmdMessage) {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

/// Asks on stdout and reads the answer from stdin. `assume_yes` skips the question.
pub(super) struct StdinPrompt {
    pub assume_yes: bool,
}

impl ConfirmPrompt for StdinPrompt {
    fn confirm(&self, title: &str, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{} {} [y/N] ", format!("{}:", title).bold(), message);
        let _ = io::stdout().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        println!();
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

pub(super) fn print_items(items: &[Item]) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }

    for item in items {
        let name = truncate_to_width(&item.name, NAME_WIDTH);
        let padding = NAME_WIDTH.saturating_sub(name.width());
        let marker = if item.image.is_some() { IMAGE_MARKER } else { " " };
        let qty = format!("{:>width$}", item.quantity, width = QTY_WIDTH);
        let qty = if item.quantity == 0 {
            qty.red()
        } else {
            qty.normal()
        };

        println!(
            "  {}  {}{} {} {}  {}",
            item.short_id().yellow(),
            name,
            " ".repeat(padding),
            marker,
            qty,
            format_time_ago(item.created_at).dimmed()
        );
    }
}

pub(super) fn print_config(config: &StockroomConfig) {
    for key in CONFIG_KEYS {
        let value = config.get(key).unwrap_or_default();
        println!("{} = {}", key, value);
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_wide_names() {
        let long = "x".repeat(60);
        let cut = truncate_to_width(&long, NAME_WIDTH);
        assert_eq!(cut.width(), NAME_WIDTH);
        assert!(cut.ends_with('…'));
        assert_eq!(truncate_to_width("短い", NAME_WIDTH), "短い");
    }

    #[test]
    fn time_ago_is_right_aligned() {
        let formatted = format_time_ago(Utc::now());
        assert_eq!(formatted.len(), TIME_WIDTH);
        assert!(!formatted.trim().is_empty());
    }
}
