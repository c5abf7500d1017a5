//! Plugin discovery and loading
//!
//! A plugin name resolves to the binary `sfmt-plugin-{name}`, searched in
//! `.sfmt/plugins/` under the working directory first, then on `$PATH`.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};

use super::protocol::PluginManifest;

/// Directory of project-local plugins, relative to the working directory.
const PLUGIN_DIR: &str = ".sfmt/plugins";

/// A resolved plugin with its manifest loaded.
#[derive(Debug, Clone)]
pub struct LoadedPlugin {
    /// Path to the plugin executable
    pub path: PathBuf,

    /// Capabilities declared via `--manifest`
    pub manifest: PluginManifest,
}

/// Resolves plugin names to executables and loads their manifests.
pub struct PluginLoader {
    plugin_dir: PathBuf,
}

impl PluginLoader {
    pub fn new(cwd: &Path) -> Self {
        Self {
            plugin_dir: cwd.join(PLUGIN_DIR),
        }
    }

    /// Loads a plugin by name. Resolution or manifest failure is an error;
    /// callers treat it as fatal.
    pub fn load(&self, name: &str) -> Result<LoadedPlugin> {
        let path = self
            .resolve(name)
            .with_context(|| format!("failed to load plugin `{name}`"))?;
        let manifest = Self::load_manifest(&path)
            .with_context(|| format!("failed to load plugin `{name}`"))?;
        Ok(LoadedPlugin { path, manifest })
    }

    /// Finds the plugin binary: project-local directory first, then PATH.
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        let binary = format!("sfmt-plugin-{name}");

        let local = self.plugin_dir.join(&binary);
        if is_executable(&local) {
            return Ok(local);
        }

        if let Ok(path_var) = std::env::var("PATH") {
            for dir in std::env::split_paths(&path_var) {
                let candidate = dir.join(&binary);
                if is_executable(&candidate) {
                    return Ok(candidate);
                }
            }
        }

        anyhow::bail!("no executable `{binary}` in {} or PATH", self.plugin_dir.display())
    }

    /// Loads the manifest from a plugin
    fn load_manifest(path: &Path) -> Result<PluginManifest> {
        let output = Command::new(path)
            .arg("--manifest")
            .output()
            .with_context(|| format!("failed to execute plugin: {}", path.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("plugin returned error: {}", stderr.trim());
        }

        let manifest: PluginManifest = serde_json::from_slice(&output.stdout)
            .context("failed to parse plugin manifest")?;

        if manifest.extensions.is_empty() {
            anyhow::bail!("plugin `{}` declares no extensions", manifest.name);
        }

        Ok(manifest)
    }
}

/// Checks if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = path.metadata() {
            return meta.is_file() && meta.permissions().mode() & 0o111 != 0;
        }
        false
    }

    #[cfg(windows)]
    {
        path.extension()
            .map(|ext| ext == "exe" || ext == "bat" || ext == "cmd")
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_plugin_is_an_error() {
        let dir = TempDir::new().unwrap();
        let loader = PluginLoader::new(dir.path());

        let err = loader.load("nonexistent").unwrap_err();
        assert!(format!("{err:#}").contains("nonexistent"));
    }

    #[cfg(unix)]
    #[test]
    fn local_plugin_dir_is_searched_first() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let plugin_dir = dir.path().join(PLUGIN_DIR);
        std::fs::create_dir_all(&plugin_dir).unwrap();

        let path = plugin_dir.join("sfmt-plugin-echo");
        std::fs::write(
            &path,
            "#!/bin/sh\necho '{\"name\":\"echo\",\"version\":\"0.1.0\",\"extensions\":[\"txt\"]}'\n",
        )
        .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let loader = PluginLoader::new(dir.path());
        let plugin = loader.load("echo").unwrap();

        assert_eq!(plugin.manifest.name, "echo");
        assert_eq!(plugin.manifest.extensions, vec!["txt".to_string()]);
        assert_eq!(plugin.path, path);
    }

    #[cfg(unix)]
    #[test]
    fn manifest_without_extensions_is_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let plugin_dir = dir.path().join(PLUGIN_DIR);
        std::fs::create_dir_all(&plugin_dir).unwrap();

        let path = plugin_dir.join("sfmt-plugin-bare");
        std::fs::write(
            &path,
            "#!/bin/sh\necho '{\"name\":\"bare\",\"version\":\"0.1.0\",\"extensions\":[]}'\n",
        )
        .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let loader = PluginLoader::new(dir.path());
        assert!(loader.load("bare").is_err());
    }

    #[test]
    fn non_executable_file_is_not_resolved() {
        let dir = TempDir::new().unwrap();
        let plugin_dir = dir.path().join(PLUGIN_DIR);
        std::fs::create_dir_all(&plugin_dir).unwrap();
        std::fs::write(plugin_dir.join("sfmt-plugin-plain"), "not a binary").unwrap();

        let loader = PluginLoader::new(dir.path());
        assert!(loader.load("plain").is_err());
    }
}
