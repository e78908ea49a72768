//! Coloured terminal output for the interactive shell.

pub mod progress;

use std::io::Write;

use crossterm::style::{Color, Stylize};

/// Print a success message in green to stdout.
pub fn success(msg: &str) {
    println!("{}", msg.with(Color::Green));
}

/// Print an error message in red to stderr.
pub fn error(msg: &str) {
    eprintln!("{}", msg.with(Color::Red));
}

/// Print a warning message in yellow to stderr.
pub fn warning(msg: &str) {
    eprintln!("{}", msg.with(Color::Yellow));
}

/// Print an info message in cyan to stdout.
pub fn info(msg: &str) {
    println!("{}", msg.with(Color::Cyan));
}

/// Print a prompt without a trailing newline and flush so it shows before input.
pub fn prompt(msg: &str) {
    print!("{}", msg.with(Color::Magenta));
    let _ = std::io::stdout().flush();
}
