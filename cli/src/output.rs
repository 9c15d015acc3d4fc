//! CLI output helpers.

use colored::Colorize;

pub fn heading(text: &str) -> String {
    format!("{}", text.bright_cyan())
}

pub fn label(text: &str) -> String {
    format!("{}", text.bright_blue())
}

pub fn muted(text: &str) -> String {
    format!("{}", text.bright_black())
}

pub fn success(text: &str) -> String {
    format!("{}", text.bright_green())
}

pub fn info(text: &str) -> String {
    format!("{} {}", "Info:".bright_blue().bold(), text)
}
