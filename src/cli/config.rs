//! Project-local configuration
//!
//! A `.sfmtrc` in the working directory holds one flag-or-pattern per line.
//! Its lines are merged into the real argument list ahead of the
//! command-line flags, so a flag given on the command line wins when both
//! set the same option. Absence of the file is not an error.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};

/// Fixed config filename, looked up in the current working directory.
pub const CONFIG_FILE: &str = ".sfmtrc";

/// Reads the config file's lines, trimmed, with blank lines dropped.
/// A missing file yields an empty list.
pub fn read_config_lines(cwd: &Path) -> Result<Vec<String>> {
    let path = cwd.join(CONFIG_FILE);
    match fs::read_to_string(&path) {
        Ok(content) => Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

/// Splices config lines into the argument list, directly after the action
/// token, so command-line flags come later and win during parsing while
/// config patterns still join the positional list.
pub fn merge_args(argv: Vec<String>, config_lines: Vec<String>) -> Vec<String> {
    if config_lines.is_empty() {
        return argv;
    }

    // The action is the first non-flag token past the program name.
    let insert_at = argv
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, arg)| !arg.starts_with('-'))
        .map(|(i, _)| i + 1)
        .unwrap_or(argv.len());

    let mut merged = argv;
    merged.splice(insert_at..insert_at, config_lines);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_config_yields_no_lines() {
        let dir = TempDir::new().unwrap();

        assert!(read_config_lines(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn config_lines_are_trimmed_and_blank_lines_dropped() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "--print-width=40\n\n  *.json  \n",
        )
        .unwrap();

        assert_eq!(
            read_config_lines(dir.path()).unwrap(),
            args(&["--print-width=40", "*.json"])
        );
    }

    #[test]
    fn config_lines_land_after_the_action_token() {
        let merged = merge_args(
            args(&["sfmt", "check", "--print-width=100", "a.json"]),
            args(&["--print-width=40", "extra.json"]),
        );

        assert_eq!(
            merged,
            args(&[
                "sfmt",
                "check",
                "--print-width=40",
                "extra.json",
                "--print-width=100",
                "a.json",
            ])
        );
    }

    #[test]
    fn leading_flags_do_not_swallow_the_insert_point() {
        let merged = merge_args(
            args(&["sfmt", "--verbose", "format", "a.json"]),
            args(&["--print-width=40"]),
        );

        assert_eq!(
            merged,
            args(&["sfmt", "--verbose", "format", "--print-width=40", "a.json"])
        );
    }

    #[test]
    fn empty_config_leaves_args_untouched() {
        let argv = args(&["sfmt", "check"]);

        assert_eq!(merge_args(argv.clone(), Vec::new()), argv);
    }

    #[test]
    fn args_without_action_get_config_appended() {
        let merged = merge_args(args(&["sfmt"]), args(&["--print-width=40"]));

        assert_eq!(merged, args(&["sfmt", "--print-width=40"]));
    }
}
