//! Terminal output utilities

use clap::ValueEnum;
use colored::Colorize;

/// Output format for the report summary
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a second count as days, hours, minutes, seconds.
pub fn format_duration(total_seconds: f64) -> String {
    let seconds = total_seconds.max(0.0);
    let days = (seconds / 86_400.0).floor() as u64;
    let hours = ((seconds % 86_400.0) / 3_600.0).floor() as u64;
    let minutes = ((seconds % 3_600.0) / 60.0).floor() as u64;
    let secs = seconds % 60.0;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m {secs:.2}s")
    } else if hours > 0 {
        format!("{hours}h {minutes}m {secs:.2}s")
    } else {
        format!("{minutes}m {secs:.2}s")
    }
}
