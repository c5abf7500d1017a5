//! # Command-Line Interface
//!
//! Argument parsing, config-file merging, and the run orchestration.
//!
//! ## Commands
//!
//! | Command | Alias | Per-item behavior |
//! |---------|-------|-------------------|
//! | `ast` | `a` | Parse and print the syntax tree |
//! | `check` | `c` | Verify the file is already formatted |
//! | `debug` | | Verify formatting is stable across two passes |
//! | `doc` | | Print the formatter's first doc group |
//! | `format` | `f` | Print the file formatted |
//! | `json` | `j` | Print the syntax tree as JSON |
//! | `match` | `m` | Print a structural-match expression |
//! | `write` | `w` | Format the file in place |
//!
//! `help`, `version`, and `lsp` run no queue work.
//!
//! ## Configuration
//!
//! A `.sfmtrc` in the working directory contributes one flag-or-pattern per
//! line; command-line flags override config-file flags.
//!
//! ## Exit status
//!
//! `0` on success (including help/version); `1` on any per-item failure,
//! usage error, or interactive invocation with no input.

mod app;
mod config;
mod output;

pub use app::{run, run_with, Cli, Commands};
pub use config::{merge_args, read_config_lines, CONFIG_FILE};
pub use output::Output;
