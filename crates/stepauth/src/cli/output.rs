//! Shared CLI output formatting with colors and symbols.

use std::io::IsTerminal;

/// Check if color output is enabled.
pub fn color_enabled() -> bool {
    // Respect NO_COLOR env (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("STEPAUTH_NO_COLOR").is_ok() {
        return false;
    }
    std::io::stderr().is_terminal()
}

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Colored string builder.
pub struct Styled {
    use_color: bool,
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}

impl Styled {
    pub fn new() -> Self {
        Self {
            use_color: color_enabled(),
        }
    }

    /// Green checkmark symbol.
    pub fn ok_sym(&self) -> &str {
        if self.use_color {
            "\x1b[32m\u{2713}\x1b[0m"
        } else {
            "OK"
        }
    }

    /// Red X symbol.
    pub fn fail_sym(&self) -> &str {
        if self.use_color {
            "\x1b[31m\u{2717}\x1b[0m"
        } else {
            "!!"
        }
    }

    /// Yellow warning symbol.
    pub fn warn_sym(&self) -> &str {
        if self.use_color {
            "\x1b[33m\u{26a0}\x1b[0m"
        } else {
            "??"
        }
    }

    pub fn green(&self, s: &str) -> String {
        self.paint(GREEN, s)
    }

    pub fn red(&self, s: &str) -> String {
        self.paint(RED, s)
    }

    pub fn dim(&self, s: &str) -> String {
        self.paint(DIM, s)
    }

    pub fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s)
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.use_color {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }
}

/// Print a branded header for CLI output.
pub fn print_header(s: &Styled) {
    eprintln!(
        "  {} {}",
        s.bold("stepauth"),
        s.dim(&format!("v{}", env!("CARGO_PKG_VERSION")))
    );
    eprintln!();
}

/// Print a check result line with symbol and label/value.
pub fn print_check(symbol: &str, label: &str, value: &str) {
    eprintln!("  {symbol} {label:<14} {value}");
}

/// Truncate a value for one-line display.
pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let cut: String = value.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}\u{2026}")
}

/// Check if --quiet mode is active.
pub fn is_quiet() -> bool {
    std::env::var("STEPAUTH_QUIET").is_ok()
}

/// Check if --verbose mode is active.
pub fn is_verbose() -> bool {
    std::env::var("STEPAUTH_VERBOSE").is_ok()
}

/// Check if --json mode is active.
pub fn is_json() -> bool {
    std::env::var("STEPAUTH_JSON").is_ok()
}

/// Print JSON output to stdout.
pub fn print_json(value: &serde_json::Value) {
    if let Ok(s) = serde_json::to_string_pretty(value) {
        println!("{s}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 5), "abcd\u{2026}");
    }

    #[test]
    fn test_plain_styling_without_color() {
        let s = Styled { use_color: false };
        assert_eq!(s.ok_sym(), "OK");
        assert_eq!(s.bold("x"), "x");
        assert_eq!(s.red("x"), "x");
    }
}
