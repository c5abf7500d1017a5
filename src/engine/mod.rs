//! # Dispatch Engine
//!
//! Core of the run: resolve work items, queue them, drain the queue across a
//! bounded pool of workers, and fold per-item outcomes into one aggregate
//! failure flag.
//!
//! ## Pipeline
//!
//! ```text
//! patterns ──► resolve_items ──► WorkQueue ──► dispatch (N workers)
//!                                                 │
//!                                  Action::run per item, classified
//!                                                 │
//!                                   aggregate OR ──► exit status
//! ```
//!
//! ## Invariants
//!
//! - The queue is populated once, before any worker starts; `pop` never
//!   blocks, it only observes empty.
//! - Every item is consumed exactly once, by exactly one worker.
//! - A failing item never stops the others; the whole queue is always
//!   attempted.
//! - [`Options`] and the selected [`Action`] are immutable during dispatch
//!   and shared across workers without further synchronization.

mod action;
pub mod diagnostics;
mod error;
mod item;
mod pool;
mod queue;

use std::io::IsTerminal;
use std::path::PathBuf;

pub use action::{
    Action, EmitFormatted, EmitJson, EmitMatch, InspectDoc, InspectTree, VerifyFormat,
    VerifyIdempotence, WriteInPlace,
};
pub use error::ItemError;
pub use item::{resolve_items, WorkItem};
pub use pool::dispatch;
pub use queue::WorkQueue;

/// Default maximum line width for formatted output.
pub const DEFAULT_PRINT_WIDTH: usize = 80;

/// Finalized invocation options, immutable once parsing completes.
#[derive(Debug, Clone)]
pub struct Options {
    /// Maximum line width passed to the format capability.
    pub print_width: usize,

    /// Plugin names to load at start-up, in load order.
    pub plugin_names: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            print_width: DEFAULT_PRINT_WIDTH,
            plugin_names: Vec::new(),
        }
    }
}

/// Process environment handed to the engine explicitly, so resolution logic
/// never reaches for process globals and stays testable.
#[derive(Debug, Clone)]
pub struct Env {
    /// Working directory for config lookup and relative patterns.
    pub cwd: PathBuf,

    /// Whether standard input is an interactive terminal.
    pub stdin_is_terminal: bool,

    /// Pre-read standard input, used by tests. `None` means the stdin work
    /// item reads the real process stdin on first use.
    pub stdin_text: Option<String>,
}

impl Env {
    /// Captures the real process environment.
    pub fn detect() -> anyhow::Result<Self> {
        Ok(Self {
            cwd: std::env::current_dir()?,
            stdin_is_terminal: std::io::stdin().is_terminal(),
            stdin_text: None,
        })
    }

    /// Fixed environment for tests.
    pub fn fixed(cwd: impl Into<PathBuf>, stdin_is_terminal: bool) -> Self {
        Self {
            cwd: cwd.into(),
            stdin_is_terminal,
            stdin_text: None,
        }
    }

    /// Injects stdin text, marking stdin as piped.
    pub fn with_stdin_text(mut self, text: impl Into<String>) -> Self {
        self.stdin_is_terminal = false;
        self.stdin_text = Some(text.into());
        self
    }
}
