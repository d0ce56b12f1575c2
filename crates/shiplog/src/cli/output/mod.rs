//! Output formatting utilities
//!
//! Status lines go to stderr; stdout is reserved for the rendered document.

use console::style;

use shiplog_core::Diagnostic;

/// Print a success message
pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    eprintln!("{} {}", style("→").blue(), message);
}

/// Create a styled header
pub fn header(text: &str) -> String {
    style(text).bold().to_string()
}

/// Create a styled key-value line
pub fn key_value(key: &str, value: &str) -> String {
    format!("  {}: {}", style(key).dim(), value)
}

/// One-line rendering of a recorded diagnostic
pub fn diagnostic_line(diagnostic: &Diagnostic) -> String {
    match &diagnostic.commit {
        Some(commit) => format!(
            "[{}] {}: {}",
            diagnostic.stage,
            style(commit.chars().take(7).collect::<String>()).yellow(),
            diagnostic.message
        ),
        None => format!("[{}] {}", diagnostic.stage, diagnostic.message),
    }
}
