//! Main CLI application structure

use std::io::IsTerminal;
use std::process::{Command as ProcessCommand, ExitCode};

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};

use super::config;
use super::output::Output;
use crate::engine::{
    self, dispatch, resolve_items, Action, EmitFormatted, EmitJson, EmitMatch, Env, InspectDoc,
    InspectTree, Options, VerifyFormat, VerifyIdempotence, WorkQueue, WriteInPlace,
};
use crate::handler::HandlerRegistry;
use crate::plugin;

#[derive(Parser)]
#[command(name = "sfmt")]
#[command(author, version, about = "Parallel formatting front-end for tree-structured source files")]
pub struct Cli {
    /// Maximum line width for formatted output; the last occurrence wins
    #[arg(
        long = "print-width",
        global = true,
        value_name = "WIDTH",
        action = ArgAction::Append
    )]
    pub print_width: Vec<usize>,

    /// Comma-separated plugin names to load at start-up
    #[arg(
        long = "plugins",
        global = true,
        value_name = "NAMES",
        value_delimiter = ',',
        action = ArgAction::Append
    )]
    pub plugins: Vec<String>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse each file and print its syntax tree
    #[command(visible_alias = "a")]
    Ast { patterns: Vec<String> },

    /// Verify each file is already formatted
    #[command(visible_alias = "c")]
    Check { patterns: Vec<String> },

    /// Verify formatting is stable across two passes
    Debug { patterns: Vec<String> },

    /// Print the formatter's internal doc group for each file
    Doc { patterns: Vec<String> },

    /// Print each file formatted
    #[command(visible_alias = "f")]
    Format { patterns: Vec<String> },

    /// Print each file's syntax tree as JSON
    #[command(visible_alias = "j")]
    Json { patterns: Vec<String> },

    /// Print a structural-match expression for each file
    #[command(visible_alias = "m")]
    Match { patterns: Vec<String> },

    /// Format each file in place
    #[command(visible_alias = "w")]
    Write { patterns: Vec<String> },

    /// Print the version
    Version,

    /// Launch the external language server and wait for it to exit
    Lsp,
}

impl Commands {
    fn patterns(&self) -> &[String] {
        match self {
            Commands::Ast { patterns }
            | Commands::Check { patterns }
            | Commands::Debug { patterns }
            | Commands::Doc { patterns }
            | Commands::Format { patterns }
            | Commands::Json { patterns }
            | Commands::Match { patterns }
            | Commands::Write { patterns } => patterns,
            Commands::Version | Commands::Lsp => &[],
        }
    }
}

/// Main entry point for the CLI
pub fn run() -> Result<ExitCode> {
    let env = Env::detect()?;
    let argv: Vec<String> = std::env::args().collect();
    run_with(argv, &env).map(ExitCode::from)
}

/// Runs the tool against an explicit argument list and environment,
/// returning the process exit status. Split from [`run`] so tests can drive
/// a full invocation without touching process globals.
pub fn run_with(argv: Vec<String>, env: &Env) -> Result<u8> {
    let config_lines = config::read_config_lines(&env.cwd)?;
    let merged = config::merge_args(argv, config_lines);

    let cli = match Cli::try_parse_from(&merged) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            // clap routes help/version to stdout and errors to stderr.
            e.print().context("failed to print usage")?;
            return Ok(code);
        }
    };

    let output = Output::new(cli.verbose);

    match &cli.command {
        Commands::Version => {
            println!("sfmt {}", env!("CARGO_PKG_VERSION"));
            return Ok(0);
        }
        Commands::Lsp => return launch_lsp(),
        _ => {}
    }

    let options = Options {
        print_width: cli
            .print_width
            .last()
            .copied()
            .unwrap_or(engine::DEFAULT_PRINT_WIDTH),
        plugin_names: cli.plugins.clone(),
    };
    output.verbose_ctx("options", &format!("print width {}", options.print_width));

    let mut registry = HandlerRegistry::new();
    plugin::load_plugins(&options.plugin_names, &env.cwd, &mut registry, &output)?;

    let patterns = cli.command.patterns();
    if patterns.is_empty() && env.stdin_is_terminal {
        // A user at a terminal with no piped data and no file arguments.
        Cli::command().print_help().context("failed to print help")?;
        return Ok(1);
    }

    let items = resolve_items(patterns, env, &registry)?;
    output.verbose_ctx("resolve", &format!("{} work item(s) queued", items.len()));

    let action = select_action(&cli.command, &options);
    let any_failed = dispatch(action.as_ref(), WorkQueue::new(items));

    Ok(u8::from(any_failed))
}

fn select_action(command: &Commands, options: &Options) -> Box<dyn Action> {
    match command {
        Commands::Ast { .. } => Box::new(InspectTree),
        Commands::Check { .. } => Box::new(VerifyFormat {
            options: options.clone(),
        }),
        Commands::Debug { .. } => Box::new(VerifyIdempotence {
            options: options.clone(),
        }),
        Commands::Doc { .. } => Box::new(InspectDoc {
            options: options.clone(),
        }),
        Commands::Format { .. } => Box::new(EmitFormatted {
            options: options.clone(),
        }),
        Commands::Json { .. } => Box::new(EmitJson),
        Commands::Match { .. } => Box::new(EmitMatch),
        Commands::Write { .. } => Box::new(WriteInPlace {
            options: options.clone(),
            color: std::io::stdout().is_terminal(),
        }),
        Commands::Version | Commands::Lsp => unreachable!("zero-queue commands handled earlier"),
    }
}

/// Delegates entirely to the external `sfmt-lsp` server binary.
fn launch_lsp() -> Result<u8> {
    let status = ProcessCommand::new("sfmt-lsp")
        .status()
        .context("failed to launch sfmt-lsp")?;
    Ok(status.code().unwrap_or(1).clamp(0, u8::MAX as i32) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn aliases_select_the_same_command() {
        assert!(matches!(parse(&["sfmt", "a"]).command, Commands::Ast { .. }));
        assert!(matches!(parse(&["sfmt", "c"]).command, Commands::Check { .. }));
        assert!(matches!(parse(&["sfmt", "f"]).command, Commands::Format { .. }));
        assert!(matches!(parse(&["sfmt", "j"]).command, Commands::Json { .. }));
        assert!(matches!(parse(&["sfmt", "m"]).command, Commands::Match { .. }));
        assert!(matches!(parse(&["sfmt", "w"]).command, Commands::Write { .. }));
    }

    #[test]
    fn repeated_print_width_keeps_the_last_value() {
        let cli = parse(&["sfmt", "--print-width=40", "check", "--print-width=100"]);

        assert_eq!(cli.print_width.last().copied(), Some(100));
    }

    #[test]
    fn plugins_accumulate_across_occurrences() {
        let cli = parse(&["sfmt", "--plugins=csv,ini", "check", "--plugins=toml"]);

        assert_eq!(cli.plugins, vec!["csv", "ini", "toml"]);
    }

    #[test]
    fn unknown_command_is_a_usage_error() {
        let dir = TempDir::new().unwrap();
        let env = Env::fixed(dir.path(), true);
        let code = run_with(vec!["sfmt".into(), "frobnicate".into()], &env).unwrap();

        assert_eq!(code, 1);
    }

    #[test]
    fn missing_command_is_a_usage_error() {
        let dir = TempDir::new().unwrap();
        let env = Env::fixed(dir.path(), true);
        let code = run_with(vec!["sfmt".into()], &env).unwrap();

        assert_eq!(code, 1);
    }

    #[test]
    fn interactive_without_patterns_is_a_usage_error() {
        let dir = TempDir::new().unwrap();
        let env = Env::fixed(dir.path(), true);
        let code = run_with(vec!["sfmt".into(), "check".into()], &env).unwrap();

        assert_eq!(code, 1);
    }

    #[test]
    fn piped_stdin_check_succeeds_on_formatted_input() {
        let dir = TempDir::new().unwrap();
        let env = Env::fixed(dir.path(), false).with_stdin_text("[1, 2]\n");
        let code = run_with(vec!["sfmt".into(), "check".into()], &env).unwrap();

        assert_eq!(code, 0);
    }

    #[test]
    fn piped_stdin_check_fails_on_misformatted_input() {
        let dir = TempDir::new().unwrap();
        let env = Env::fixed(dir.path(), false).with_stdin_text("[1,2]");
        let code = run_with(vec!["sfmt".into(), "check".into()], &env).unwrap();

        assert_eq!(code, 1);
    }

    #[test]
    fn config_print_width_is_overridden_by_command_line() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(config::CONFIG_FILE), "--print-width=5\n").unwrap();

        // At width 5 this input would fail check; width 80 from the command
        // line must win.
        let env = Env::fixed(dir.path(), false).with_stdin_text("[100, 200]\n");
        let code = run_with(
            vec!["sfmt".into(), "check".into(), "--print-width=80".into()],
            &env,
        )
        .unwrap();

        assert_eq!(code, 0);
    }

    #[test]
    fn config_pattern_contributes_work_items() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), "[1,2]").unwrap();
        fs::write(dir.path().join(config::CONFIG_FILE), "a.json\n").unwrap();

        let env = Env::fixed(dir.path(), true);
        let code = run_with(vec!["sfmt".into(), "check".into()], &env).unwrap();

        // The config-supplied pattern queued the misformatted file.
        assert_eq!(code, 1);
    }

    #[test]
    fn missing_plugin_aborts_the_run() {
        let dir = TempDir::new().unwrap();
        let env = Env::fixed(dir.path(), false).with_stdin_text("[1]");
        let result = run_with(
            vec!["sfmt".into(), "check".into(), "--plugins=nope".into()],
            &env,
        );

        assert!(result.is_err());
    }
}
