//! # Language Handlers
//!
//! The parser/formatter capability consumed by every action, resolved per
//! file extension.
//!
//! ## Capabilities
//!
//! | Capability | Used by |
//! |------------|---------|
//! | `parse` | ast, json, match (and every format path) |
//! | `format` | check, debug, format, write |
//! | `doc` | doc (formatter grouping introspection) |
//! | `colorize` | diagnostic renderer (output-only) |
//!
//! ## Resolution
//!
//! A [`HandlerRegistry`] maps file extensions to handlers. The built-in JSON
//! handler is registered for `json` and doubles as the default for standard
//! input and unknown extensions. Plugins register additional extensions at
//! start-up (see [`crate::plugin`]).

mod json;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use json::JsonHandler;

/// A structured parse failure reported by a handler.
///
/// `line` is 1-based, `column` is 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ParseFailure {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// A parsed source tree.
///
/// Handlers produce a uniform node shape so the inspect/emit actions do not
/// depend on any one language: a node kind, an optional literal value, and
/// ordered children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub kind: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<Tree>,
}

impl Tree {
    pub fn leaf(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    pub fn node(kind: impl Into<String>, children: Vec<Tree>) -> Self {
        Self {
            kind: kind.into(),
            value: None,
            children,
        }
    }

    /// Converts the tree into a JSON-compatible structure.
    pub fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        object.insert("kind".into(), serde_json::Value::String(self.kind.clone()));
        if let Some(value) = &self.value {
            object.insert("value".into(), serde_json::Value::String(value.clone()));
        }
        if !self.children.is_empty() {
            let children = self.children.iter().map(Tree::to_json).collect();
            object.insert("children".into(), serde_json::Value::Array(children));
        }
        serde_json::Value::Object(object)
    }

    /// Builds a structural-match expression describing this tree.
    ///
    /// Leaves render as `kind("value")`, interior nodes as
    /// `kind(child, child, ...)`.
    pub fn match_expression(&self) -> String {
        match (&self.value, self.children.is_empty()) {
            (Some(value), _) => format!("{}({})", self.kind, quoted(value)),
            (None, true) => self.kind.clone(),
            (None, false) => {
                let inner: Vec<String> =
                    self.children.iter().map(Tree::match_expression).collect();
                format!("{}({})", self.kind, inner.join(", "))
            }
        }
    }
}

fn quoted(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// The per-file-type parse/format capability set.
///
/// Implementations must be shareable across worker threads; they hold no
/// per-item state.
pub trait Handler: Send + Sync {
    /// Parses the source into a [`Tree`].
    fn parse(&self, source: &str) -> Result<Tree, ParseFailure>;

    /// Formats the source at the given print width.
    fn format(&self, source: &str, print_width: usize) -> Result<String, ParseFailure>;

    /// Renders the formatter's internal grouping structure for the source,
    /// returning a debug view of the first group.
    fn doc(&self, source: &str, print_width: usize) -> Result<String, ParseFailure>;

    /// Syntax-highlights a single source line for diagnostics. Output-only:
    /// no parsing side effects, and the uncolored text must survive intact.
    fn colorize(&self, line: &str) -> String {
        line.to_string()
    }
}

/// Maps file extensions to handlers.
pub struct HandlerRegistry {
    by_extension: HashMap<String, Arc<dyn Handler>>,
    fallback: Arc<dyn Handler>,
}

impl HandlerRegistry {
    /// Creates a registry with the built-in JSON handler registered and set
    /// as the fallback.
    pub fn new() -> Self {
        let json: Arc<dyn Handler> = Arc::new(JsonHandler);
        let mut by_extension: HashMap<String, Arc<dyn Handler>> = HashMap::new();
        by_extension.insert("json".to_string(), Arc::clone(&json));

        Self {
            by_extension,
            fallback: json,
        }
    }

    /// Registers a handler for a file extension (without the leading dot).
    /// Later registrations win, so plugins can shadow the built-in handler.
    pub fn register(&mut self, extension: impl Into<String>, handler: Arc<dyn Handler>) {
        self.by_extension.insert(extension.into(), handler);
    }

    /// Resolves the handler for a path by extension, falling back to the
    /// default handler for unknown extensions.
    pub fn for_path(&self, path: &Path) -> Arc<dyn Handler> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| self.by_extension.get(e))
            .map(Arc::clone)
            .unwrap_or_else(|| self.fallback())
    }

    /// Returns the default handler, used for standard input.
    pub fn fallback(&self) -> Arc<dyn Handler> {
        Arc::clone(&self.fallback)
    }

    /// Lists registered extensions (sorted, for verbose output).
    pub fn extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self.by_extension.keys().cloned().collect();
        extensions.sort();
        extensions
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
