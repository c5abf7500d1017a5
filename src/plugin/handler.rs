//! Subprocess-backed handler
//!
//! Adapts a plugin binary to the [`Handler`] capability set. Each call
//! spawns the binary, writes one JSON request line, and reads one JSON
//! response line. Transport faults surface as parse failures at line 1 so
//! the worker classification still holds.

use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::handler::{Handler, ParseFailure, Tree};

use super::protocol::{PluginRequest, PluginResponse};

/// A handler whose parse/format capabilities live in a plugin binary.
pub struct PluginHandler {
    path: PathBuf,
}

impl PluginHandler {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn execute(&self, request: &PluginRequest) -> Result<PluginResponse, ParseFailure> {
        self.try_execute(request).map_err(|e| transport_failure(&e))
    }

    fn try_execute(&self, request: &PluginRequest) -> anyhow::Result<PluginResponse> {
        use anyhow::Context;

        let mut child = Command::new(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn plugin: {}", self.path.display()))?;

        let request_json =
            serde_json::to_string(request).context("failed to serialize plugin request")?;
        let mut stdin = child
            .stdin
            .take()
            .context("failed to open plugin stdin")?;
        writeln!(stdin, "{}", request_json).context("failed to write to plugin")?;
        drop(stdin);

        let stdout = child
            .stdout
            .take()
            .context("failed to open plugin stdout")?;
        let response_line = BufReader::new(stdout)
            .lines()
            .next()
            .context("no response from plugin")?
            .context("failed to read plugin response")?;

        let response: PluginResponse =
            serde_json::from_str(&response_line).context("failed to parse plugin response")?;

        let _ = child.wait();
        Ok(response)
    }

    /// Unpacks a failure response into the structured parse failure the
    /// diagnostics renderer expects.
    fn failure_of(response: PluginResponse) -> ParseFailure {
        let location = response.data.unwrap_or(serde_json::Value::Null);
        ParseFailure {
            line: location["line"].as_u64().unwrap_or(1) as usize,
            column: location["column"].as_u64().unwrap_or(0) as usize,
            message: response
                .error
                .unwrap_or_else(|| "plugin reported failure".to_string()),
        }
    }
}

fn transport_failure(error: &anyhow::Error) -> ParseFailure {
    ParseFailure {
        line: 1,
        column: 0,
        message: format!("{error:#}"),
    }
}

impl Handler for PluginHandler {
    fn parse(&self, source: &str) -> Result<Tree, ParseFailure> {
        let request = PluginRequest::new("parse", serde_json::json!({ "source": source }));
        let response = self.execute(&request)?;
        if !response.success {
            return Err(Self::failure_of(response));
        }

        let data = response.data.unwrap_or(serde_json::Value::Null);
        serde_json::from_value(data["tree"].clone()).map_err(|e| ParseFailure {
            line: 1,
            column: 0,
            message: format!("plugin returned malformed tree: {e}"),
        })
    }

    fn format(&self, source: &str, print_width: usize) -> Result<String, ParseFailure> {
        let request = PluginRequest::new(
            "format",
            serde_json::json!({ "source": source, "print_width": print_width }),
        );
        let response = self.execute(&request)?;
        if !response.success {
            return Err(Self::failure_of(response));
        }

        let data = response.data.unwrap_or(serde_json::Value::Null);
        match data["formatted"].as_str() {
            Some(text) => Ok(text.to_string()),
            None => Err(ParseFailure {
                line: 1,
                column: 0,
                message: "plugin response missing `formatted`".to_string(),
            }),
        }
    }

    fn doc(&self, source: &str, print_width: usize) -> Result<String, ParseFailure> {
        // Plugins expose no doc-group introspection; fall back to the
        // formatted output so the doc action still shows something useful.
        self.format(source, print_width)
    }
}
