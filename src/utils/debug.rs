//! Debug output gated by the `DEBUG` setting.
//!
//! Output goes to stderr so it never mixes with command results on stdout.

use std::fmt::Display;

use crate::config;

pub fn debug_enabled() -> bool {
    config::settings().debug
}

/// Prints like `eprintln!` when debug output is enabled.
#[macro_export]
macro_rules! debug_print {
    ($($arg:tt)*) => {
        if $crate::utils::debug::debug_enabled() {
            eprintln!($($arg)*);
        }
    };
}

/// Prints `expr = value` when debug output is enabled.
#[macro_export]
macro_rules! debug_var {
    ($var:expr) => {
        $crate::debug_print!("{} = {:?}", stringify!($var), &$var)
    };
}

/// Joins `parts` with `sep` and wraps the result, unless the join is empty.
pub fn join_if_not_empty<I>(parts: I, sep: &str, prefix: &str, suffix: &str) -> Option<String>
where
    I: IntoIterator,
    I::Item: Display,
{
    let combined = parts
        .into_iter()
        .map(|part| part.to_string())
        .collect::<Vec<_>>()
        .join(sep);
    if combined.is_empty() {
        None
    } else {
        Some(format!("{prefix}{combined}{suffix}"))
    }
}

pub fn print_if_not_empty<I>(parts: I, sep: &str, prefix: &str, suffix: &str)
where
    I: IntoIterator,
    I::Item: Display,
{
    if let Some(line) = join_if_not_empty(parts, sep, prefix, suffix) {
        debug_print!("{line}");
    }
}

/// Prints `value` followed by `end` (callers usually pass `"\n\n"`).
pub fn print_with_newline(value: impl Display, end: &str) {
    if debug_enabled() {
        eprint!("{}", with_end(value, end));
    }
}

fn with_end(value: impl Display, end: &str) -> String {
    format!("{value}{end}")
}
