// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Terminal color utilities
//!
//! Markers shared by every command: ✓ done, ✗ failed, ⚠ needs attention.

use colored::Colorize;

/// Print a styled header
pub fn print_header(title: &str) {
    println!("{}", title.bold());
    println!("{}", "═".repeat(title.len().max(40)));
}

/// Print a styled section
pub fn print_section(title: &str) {
    println!();
    println!("{}:", title.bold());
}

pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    println!("  {} {}", "✗".red(), msg);
}

pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

pub fn print_info(msg: &str) {
    println!("  {} {}", "→".blue(), msg);
}

/// Disable colors when `NO_COLOR` is set
pub fn configure_colors() {
    if std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }
}
