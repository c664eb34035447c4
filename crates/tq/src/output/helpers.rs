//! Common helper functions for output formatting.

use owo_colors::OwoColorize;

/// Formats a section header.
pub fn format_header(text: &str, use_colors: bool) -> String {
    if use_colors {
        text.green().bold().to_string()
    } else {
        text.to_string()
    }
}

/// Formats a validity flag for display.
pub fn format_status(valid: bool, use_colors: bool) -> String {
    let label = if valid { "valid" } else { "invalid" };
    match (use_colors, valid) {
        (false, _) => label.to_string(),
        (true, true) => label.green().to_string(),
        (true, false) => label.red().to_string(),
    }
}

/// Dims secondary text.
pub fn format_dimmed(text: &str, use_colors: bool) -> String {
    if use_colors {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

/// Pads `s` to `width` characters.
///
/// Counts characters rather than bytes so column ids with multi-byte
/// characters still line up.
pub fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{s}{}", " ".repeat(width - len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_formatting() {
        assert_eq!(format_header("Tokens", false), "Tokens");
        assert_eq!(format_status(true, false), "valid");
        assert_eq!(format_status(false, false), "invalid");
        assert_eq!(format_dimmed("x", false), "x");
    }

    #[test]
    fn test_colored_status_keeps_label() {
        assert!(format_status(false, true).contains("invalid"));
        assert_ne!(format_status(true, true), "valid");
    }

    #[test]
    fn test_pad() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad("abcdef", 4), "abcdef");
        assert_eq!(pad("âge", 4), "âge ");
    }
}
