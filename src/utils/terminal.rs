//! Terminal output utilities
//!
//! Echoed commands go to stdout unstyled so the trace can be copied and
//! re-run. Everything else is decorated with `console` styles.

use console::style;

use crate::exec::Invocation;

/// Print an error message to stderr
pub fn print_error(message: &str) {
    eprintln!("{}: {}", style("error").red().bold(), message);
}

/// Print a warning message to stderr
pub fn print_warning(message: &str) {
    eprintln!("{}: {}", style("warning").yellow().bold(), message);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{}: {}", style("success").green().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{}: {}", style("info").blue().bold(), message);
}

/// Echo an external command exactly as it is about to run
pub fn print_command(invocation: &Invocation) {
    println!("{}", invocation);
}
