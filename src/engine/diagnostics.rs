//! Source-line diagnostics for parse failures
//!
//! Prints a bounded window of lines around the failure, with right-aligned
//! line numbers, a marker on the offending line, and a column-accurate caret
//! beneath it:
//!
//! ```text
//!   1 | {
//! > 2 |   "a": }
//!     |        ^
//!   3 | }
//! ```

use std::io::{self, Write};

use crate::handler::{Handler, ParseFailure};

/// Lines of context shown above and below the offending line.
const CONTEXT_LINES: usize = 3;

/// Renders the diagnostic window for `failure` against the full source.
///
/// The window spans `max(line - 3, 1) ..= min(line + 3, total)`; at a file
/// boundary it truncates rather than padding, so no line outside the source
/// is ever referenced. The offending line is colorized through the handler
/// when `color` is set.
pub fn render<W: Write>(
    out: &mut W,
    source: &str,
    failure: &ParseFailure,
    handler: &dyn Handler,
    color: bool,
) -> io::Result<()> {
    let lines: Vec<&str> = source.lines().collect();
    let total = lines.len();
    if total == 0 {
        return Ok(());
    }

    // Handlers report 1-based lines; clamp against a report past the end,
    // which can happen when the source ends unexpectedly.
    let error_line = failure.line.clamp(1, total);
    let start = error_line.saturating_sub(CONTEXT_LINES).max(1);
    let end = (error_line + CONTEXT_LINES).min(total);
    let number_width = decimal_digits(end);

    for number in start..=end {
        let text = lines[number - 1];
        if number == error_line {
            let shown = if color {
                handler.colorize(text)
            } else {
                text.to_string()
            };
            writeln!(out, "> {number:>number_width$} | {shown}")?;
            writeln!(
                out,
                "  {:>number_width$} | {}^",
                "",
                " ".repeat(failure.column)
            )?;
        } else {
            writeln!(out, "  {number:>number_width$} | {text}")?;
        }
    }
    Ok(())
}

fn decimal_digits(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::JsonHandler;

    fn failure(line: usize, column: usize) -> ParseFailure {
        ParseFailure {
            line,
            column,
            message: "boom".to_string(),
        }
    }

    fn rendered(source: &str, line: usize, column: usize) -> Vec<String> {
        let mut out = Vec::new();
        render(&mut out, source, &failure(line, column), &JsonHandler, false).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn ten_lines() -> String {
        (1..=10).map(|n| format!("line {n}\n")).collect()
    }

    #[test]
    fn error_on_first_line_truncates_window_start() {
        let lines = rendered(&ten_lines(), 1, 0);

        // Lines 1-4 plus the caret line.
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "> 1 | line 1");
        assert_eq!(lines[1], "    | ^");
        assert_eq!(lines[4], "  4 | line 4");
    }

    #[test]
    fn error_on_last_line_truncates_window_end() {
        let lines = rendered(&ten_lines(), 10, 2);

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "   7 | line 7");
        assert_eq!(lines[3], "> 10 | line 10");
        assert_eq!(lines[4], "     |   ^");
    }

    #[test]
    fn mid_file_window_spans_three_lines_each_side() {
        let lines = rendered(&ten_lines(), 5, 0);

        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "  2 | line 2");
        assert_eq!(lines[3], "> 5 | line 5");
        assert_eq!(lines[7], "  8 | line 8");
    }

    #[test]
    fn number_width_follows_largest_window_line() {
        // Error at line 8 of 12: window 5..=11, so width 2.
        let source: String = (1..=12).map(|n| format!("l{n}\n")).collect();
        let lines = rendered(&source, 8, 1);

        assert_eq!(lines[0], "   5 | l5");
        assert_eq!(lines[3], ">  8 | l8");
        assert_eq!(lines[4], "     |  ^");
    }

    #[test]
    fn caret_lands_on_the_reported_column() {
        let lines = rendered("abcdef\n", 1, 3);

        // Prefix is "  1 | " (marker column, width-1 number, separator).
        let caret_line = &lines[1];
        let text_start = lines[0].find("| ").unwrap() + 2;
        assert_eq!(caret_line.chars().nth(text_start + 3), Some('^'));
    }

    #[test]
    fn empty_source_renders_nothing() {
        let lines = rendered("", 1, 0);

        assert!(lines.is_empty());
    }

    #[test]
    fn line_past_end_is_clamped() {
        let lines = rendered("only\n", 99, 0);

        assert_eq!(lines[0], "> 1 | only");
    }
}
