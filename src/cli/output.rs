//! Shared CLI output helpers.
//!
//! Data goes to stdout unstyled so it can be piped. Status lines go to
//! stderr. Colors respect NO_COLOR.

use console::style;
use std::fmt::Display;

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none() && console::colors_enabled_stderr()
}

/// Print raw data to stdout.
pub fn data(value: &str) {
    println!("{}", value);
}

/// Print a success message with checkmark (green).
pub fn success(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("✓").green(), msg);
    } else {
        eprintln!("✓ {}", msg);
    }
}

/// Print an error message to stderr (red).
pub fn error(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("✗").red(), msg);
    } else {
        eprintln!("✗ {}", msg);
    }
}

/// Print a hint message (cyan).
///
/// Example: `→ set CFGSEAL_CONFIG or pass --config`
pub fn hint(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("→").cyan(), style(msg).cyan());
    } else {
        eprintln!("→ {}", msg);
    }
}

/// Print a bold header.
pub fn header(title: &str) {
    if colors_enabled() {
        println!("{}", style(title).bold());
    } else {
        println!("{}", title);
    }
}

/// Print a list item with bullet.
pub fn list_item(item: impl Display) {
    println!("  • {}", item);
}
