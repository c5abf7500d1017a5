//! sfmt - A parallel formatting front-end for tree-structured source files
//!
//! sfmt resolves a set of work items (files matched by glob patterns, or
//! standard input when piped), dispatches each one through a selected action
//! (inspect, verify, transform, emit), runs the work across a bounded pool of
//! workers, and folds per-item outcomes into a single process exit status
//! with source-excerpt diagnostics for parse failures.

pub mod cli;
pub mod engine;
pub mod handler;
pub mod plugin;

pub use engine::{Action, ItemError, Options, WorkItem, WorkQueue};
pub use handler::{Handler, HandlerRegistry, ParseFailure, Tree};
