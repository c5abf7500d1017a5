//! Work items and their resolution
//!
//! A work item is either a file on disk or the process's standard input,
//! with a lazily-read source text and a handler resolved by file extension.
//! The source is read at most once per item.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};

use crate::handler::{Handler, HandlerRegistry};

use super::Env;

/// Synthetic path marker for the stdin pseudo-item.
pub const STDIN_MARKER: &str = "<stdin>";

enum ItemKind {
    File(PathBuf),
    Stdin,
}

/// One unit of queued work: a source to read plus the handler to process it.
pub struct WorkItem {
    kind: ItemKind,
    handler: Arc<dyn Handler>,
    source: OnceLock<String>,
}

impl WorkItem {
    /// A work item backed by a file on disk.
    pub fn file(path: impl Into<PathBuf>, handler: Arc<dyn Handler>) -> Self {
        Self {
            kind: ItemKind::File(path.into()),
            handler,
            source: OnceLock::new(),
        }
    }

    /// The stdin pseudo-item. When `preset` is given (tests), the real
    /// process stdin is never touched.
    pub fn stdin(handler: Arc<dyn Handler>, preset: Option<String>) -> Self {
        let source = OnceLock::new();
        if let Some(text) = preset {
            let _ = source.set(text);
        }
        Self {
            kind: ItemKind::Stdin,
            handler,
            source,
        }
    }

    pub fn is_stdin(&self) -> bool {
        matches!(self.kind, ItemKind::Stdin)
    }

    /// The file path, or `None` for stdin.
    pub fn path(&self) -> Option<&Path> {
        match &self.kind {
            ItemKind::File(path) => Some(path),
            ItemKind::Stdin => None,
        }
    }

    /// Display form of the path; stdin uses its synthetic marker.
    pub fn path_display(&self) -> String {
        match &self.kind {
            ItemKind::File(path) => path.display().to_string(),
            ItemKind::Stdin => STDIN_MARKER.to_string(),
        }
    }

    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }

    /// The item's source text, read on first use and cached. A file is never
    /// re-read after the first successful read.
    pub fn source(&self) -> Result<&str> {
        if let Some(text) = self.source.get() {
            return Ok(text);
        }
        let text = match &self.kind {
            ItemKind::File(path) => fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
            ItemKind::Stdin => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("failed to read standard input")?;
                text
            }
        };
        Ok(self.source.get_or_init(|| text))
    }

    /// The cached source, if it was already read.
    pub fn cached_source(&self) -> Option<&str> {
        self.source.get().map(String::as_str)
    }
}

/// Expands positional patterns into the final queue contents.
///
/// With no patterns and piped stdin, the queue receives exactly one stdin
/// pseudo-item. Otherwise every glob match that is a regular file is pushed;
/// directories and other non-regular matches are silently skipped, and a
/// pattern matching nothing contributes zero items.
pub fn resolve_items(
    patterns: &[String],
    env: &Env,
    registry: &HandlerRegistry,
) -> Result<Vec<WorkItem>> {
    if patterns.is_empty() && !env.stdin_is_terminal {
        return Ok(vec![WorkItem::stdin(
            registry.fallback(),
            env.stdin_text.clone(),
        )]);
    }

    let mut items = Vec::new();
    for pattern in patterns {
        let full = if Path::new(pattern).is_absolute() {
            pattern.clone()
        } else {
            env.cwd.join(pattern).display().to_string()
        };
        let paths = glob::glob(&full)
            .with_context(|| format!("invalid glob pattern `{pattern}`"))?;
        for entry in paths {
            // Unreadable entries are skipped like non-regular matches.
            let Ok(path) = entry else { continue };
            if path.is_file() {
                let handler = registry.for_path(&path);
                items.push(WorkItem::file(path, handler));
            }
        }
    }
    Ok(items)
}
