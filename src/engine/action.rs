//! The action contract and its eight variants
//!
//! An action is the unit of work applied to every queued item. The set is
//! closed: extensibility happens through file-extension handlers, not new
//! actions. Each variant is stateless apart from the captured [`Options`],
//! so one instance is shared across all workers.

use std::fs;
use std::time::Instant;

use anyhow::Context;

use super::{ItemError, Options, WorkItem};

/// Polymorphic unit of work over one item, plus end-of-run hooks.
///
/// `run` either completes silently or raises a classified failure. The hooks
/// fire once after all queue processing, only when at least one item was
/// processed.
pub trait Action: Send + Sync {
    fn run(&self, item: &WorkItem) -> Result<(), ItemError>;

    fn on_all_succeeded(&self) {}

    fn on_any_failed(&self) {}
}

/// `ast`: parse and print a debug representation of the tree.
pub struct InspectTree;

impl Action for InspectTree {
    fn run(&self, item: &WorkItem) -> Result<(), ItemError> {
        let source = item.source()?;
        let tree = item.handler().parse(source)?;
        println!("{:#?}", tree);
        Ok(())
    }
}

/// `check`: verify each file is already formatted.
pub struct VerifyFormat {
    pub options: Options,
}

impl Action for VerifyFormat {
    fn run(&self, item: &WorkItem) -> Result<(), ItemError> {
        let source = item.source()?;
        let formatted = item.handler().format(source, self.options.print_width)?;
        if formatted != source {
            // Warn with the path now so the dispatcher does not have to
            // re-derive it from the failure.
            eprintln!("{}", item.path_display());
            return Err(ItemError::FormatMismatch);
        }
        Ok(())
    }

    fn on_all_succeeded(&self) {
        println!("All files match the expected format.");
    }

    fn on_any_failed(&self) {
        eprintln!("The listed files did not match the expected format.");
    }
}

/// `debug`: verify formatting is a fixed point after one pass.
pub struct VerifyIdempotence {
    pub options: Options,
}

impl Action for VerifyIdempotence {
    fn run(&self, item: &WorkItem) -> Result<(), ItemError> {
        let source = item.source()?;
        let handler = item.handler();
        let once = handler.format(source, self.options.print_width)?;
        let twice = handler.format(&once, self.options.print_width)?;
        if once != twice {
            eprintln!("{}", item.path_display());
            return Err(ItemError::NonIdempotent);
        }
        Ok(())
    }

    fn on_all_succeeded(&self) {
        println!("Formatting is stable for every file.");
    }

    fn on_any_failed(&self) {
        eprintln!("Formatting changed on a second pass for the listed files.");
    }
}

/// `doc`: print the formatter's first doc group.
pub struct InspectDoc {
    pub options: Options,
}

impl Action for InspectDoc {
    fn run(&self, item: &WorkItem) -> Result<(), ItemError> {
        let source = item.source()?;
        let doc = item.handler().doc(source, self.options.print_width)?;
        println!("{}", doc);
        Ok(())
    }
}

/// `format`: print each file formatted.
pub struct EmitFormatted {
    pub options: Options,
}

impl Action for EmitFormatted {
    fn run(&self, item: &WorkItem) -> Result<(), ItemError> {
        let source = item.source()?;
        let formatted = item.handler().format(source, self.options.print_width)?;
        print!("{}", formatted);
        Ok(())
    }
}

/// `json`: print the tree as pretty JSON.
pub struct EmitJson;

impl Action for EmitJson {
    fn run(&self, item: &WorkItem) -> Result<(), ItemError> {
        let source = item.source()?;
        let tree = item.handler().parse(source)?;
        let json = serde_json::to_string_pretty(&tree.to_json())
            .context("failed to serialize syntax tree")?;
        println!("{}", json);
        Ok(())
    }
}

/// `match`: print a structural-match expression for the tree.
pub struct EmitMatch;

impl Action for EmitMatch {
    fn run(&self, item: &WorkItem) -> Result<(), ItemError> {
        let source = item.source()?;
        let tree = item.handler().parse(source)?;
        println!("{}", tree.match_expression());
        Ok(())
    }
}

/// `write`: format each file in place.
///
/// The file is rewritten only when the formatted bytes differ from the
/// current content; an already-formatted file is reported with a dimmed
/// line and left untouched. Parse failures leave the file as-is.
pub struct WriteInPlace {
    pub options: Options,

    /// Whether to emit ANSI dimming; off when stdout is not a terminal.
    pub color: bool,
}

impl Action for WriteInPlace {
    fn run(&self, item: &WorkItem) -> Result<(), ItemError> {
        let start = Instant::now();
        let source = item.source()?;
        let formatted = item.handler().format(source, self.options.print_width)?;
        let changed = formatted != source;

        if changed {
            if let Some(path) = item.path() {
                fs::write(path, &formatted)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
        }

        let line = format!("{} {}ms", item.path_display(), start.elapsed().as_millis());
        if changed {
            println!("{}", line);
        } else {
            println!("{}", dim(&line, self.color));
        }
        Ok(())
    }
}

fn dim(text: &str, color: bool) -> String {
    if color {
        format!("\x1b[2m{}\x1b[0m", text)
    } else {
        text.to_string()
    }
}
