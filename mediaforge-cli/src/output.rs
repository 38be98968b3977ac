// ============================================================================
// mediaforge-cli/src/output.rs
// ============================================================================
//
// TERMINAL OUTPUT: styled printing helpers for command results
//
// Results go to stdout, errors to stderr. Styling comes from `console`, which
// drops colors on its own when the stream is not a terminal.

use console::style;
use std::fmt::Display;

use mediaforge_core::CoreError;

/// Print a heading with styling and clear separation
pub fn print_heading(text: &str) {
    println!("\n{}", style(text.to_uppercase()).cyan().bold());
}

/// Print a section heading (smaller than main heading)
pub fn print_section(text: &str) {
    println!("\n  {}", style(text).bold());
}

/// Print an info line with an aligned, dimmed label
pub fn print_info<T: Display>(label: &str, value: T) {
    println!("  {:<18} {}", style(format!("{label}:")).dim(), value);
}

/// Print a success message with a green checkmark
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print a warning to stderr
pub fn print_warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}

/// Print an error and its suggestion (when it has one) to stderr
pub fn print_error(error: &CoreError) {
    eprintln!("{} {}", style("Error:").red().bold(), error);
    if let Some(suggestion) = error.suggestion() {
        eprintln!("  {} {}", style("Hint:").yellow(), suggestion);
    }
}
