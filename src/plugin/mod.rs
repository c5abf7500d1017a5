//! # Plugin System
//!
//! Extension point for additional file-extension handlers.
//!
//! Plugins are separate binaries that communicate with sfmt via JSON over
//! stdin/stdout, which keeps them language-agnostic. A plugin does not add
//! new actions; it registers `parse`/`format` capabilities for the file
//! extensions its manifest declares.
//!
//! ## Discovery
//!
//! `--plugins=name` resolves the binary `sfmt-plugin-name` in:
//! 1. `.sfmt/plugins/` under the current working directory
//! 2. `$PATH`
//!
//! A name that cannot be resolved, or a manifest that cannot be read, is a
//! fatal start-up error: no queue work begins.
//!
//! ## Protocol
//!
//! ```text
//! CLI                               Plugin Binary
//!  │                                     │
//!  ├── Spawn: sfmt-plugin-csv --manifest │
//!  │◄─ Stdout: {"name": ..., "extensions": ["csv"]}
//!  │                                     │
//!  ├── Stdin: {"operation": "parse", "params": {"source": "..."}}
//!  └── Stdout: {"success": true, "data": {"tree": {...}}}
//! ```

mod handler;
mod loader;
mod protocol;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::cli::Output;
use crate::handler::HandlerRegistry;

pub use handler::PluginHandler;
pub use loader::{LoadedPlugin, PluginLoader};
pub use protocol::{PluginManifest, PluginRequest, PluginResponse};

/// Loads every named plugin and registers its extensions. Any failure here
/// is fatal; per-item processing has not started yet.
pub fn load_plugins(
    names: &[String],
    cwd: &Path,
    registry: &mut HandlerRegistry,
    output: &Output,
) -> Result<()> {
    if names.is_empty() {
        return Ok(());
    }

    let loader = PluginLoader::new(cwd);
    for name in names {
        let plugin = loader.load(name)?;
        let handler = Arc::new(PluginHandler::new(plugin.path.clone()));
        for extension in &plugin.manifest.extensions {
            let shared: Arc<dyn crate::handler::Handler> = handler.clone();
            registry.register(extension.clone(), shared);
        }
        output.verbose_ctx(
            "plugin",
            &format!(
                "loaded {} v{} for [{}]",
                plugin.manifest.name,
                plugin.manifest.version,
                plugin.manifest.extensions.join(", ")
            ),
        );
    }
    Ok(())
}
