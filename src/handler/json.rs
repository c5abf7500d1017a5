//! Built-in JSON handler
//!
//! Parses with `serde_json` and formats with a small width-aware group
//! printer: a container renders on one line when it fits the print width and
//! breaks with two-space indentation when it does not. Object keys are
//! emitted in sorted order, so formatting is a fixed point after one pass.

use serde_json::Value;

use super::{Handler, ParseFailure, Tree};

/// Handler for `.json` sources, also the registry fallback.
pub struct JsonHandler;

impl Handler for JsonHandler {
    fn parse(&self, source: &str) -> Result<Tree, ParseFailure> {
        let value = parse_value(source)?;
        Ok(tree_of(&value))
    }

    fn format(&self, source: &str, print_width: usize) -> Result<String, ParseFailure> {
        let value = parse_value(source)?;
        let doc = doc_of(&value);
        let mut out = String::new();
        render(&doc, 0, 0, print_width, &mut out);
        out.push('\n');
        Ok(out)
    }

    fn doc(&self, source: &str, _print_width: usize) -> Result<String, ParseFailure> {
        let value = parse_value(source)?;
        let doc = doc_of(&value);
        let group = first_group(&doc).unwrap_or(&doc);
        Ok(format!("{:#?}", group))
    }

    fn colorize(&self, line: &str) -> String {
        colorize_line(line)
    }
}

fn parse_value(source: &str) -> Result<Value, ParseFailure> {
    serde_json::from_str(source).map_err(|e| ParseFailure {
        line: e.line().max(1),
        column: e.column().saturating_sub(1),
        message: e.to_string(),
    })
}

fn tree_of(value: &Value) -> Tree {
    match value {
        Value::Null => Tree::node("null", Vec::new()),
        Value::Bool(b) => Tree::leaf("bool", b.to_string()),
        Value::Number(n) => Tree::leaf("number", n.to_string()),
        Value::String(s) => Tree::leaf("string", s.clone()),
        Value::Array(items) => Tree::node("array", items.iter().map(tree_of).collect()),
        Value::Object(entries) => Tree::node(
            "object",
            entries
                .iter()
                .map(|(key, value)| {
                    Tree::node("pair", vec![Tree::leaf("key", key.clone()), tree_of(value)])
                })
                .collect(),
        ),
    }
}

/// Intermediate grouping structure the printer works over.
#[derive(Debug)]
enum Doc {
    Text(String),
    Pair { key: String, value: Box<Doc> },
    Group { open: char, close: char, items: Vec<Doc> },
}

fn doc_of(value: &Value) -> Doc {
    match value {
        Value::Array(items) => Doc::Group {
            open: '[',
            close: ']',
            items: items.iter().map(doc_of).collect(),
        },
        Value::Object(entries) => Doc::Group {
            open: '{',
            close: '}',
            items: entries
                .iter()
                .map(|(key, value)| Doc::Pair {
                    key: Value::String(key.clone()).to_string(),
                    value: Box::new(doc_of(value)),
                })
                .collect(),
        },
        scalar => Doc::Text(scalar.to_string()),
    }
}

fn first_group(doc: &Doc) -> Option<&Doc> {
    match doc {
        Doc::Group { .. } => Some(doc),
        Doc::Pair { value, .. } => first_group(value),
        Doc::Text(_) => None,
    }
}

/// Width of the document when rendered on a single line.
fn flat_width(doc: &Doc) -> usize {
    match doc {
        Doc::Text(text) => text.len(),
        Doc::Pair { key, value } => key.len() + 2 + flat_width(value),
        Doc::Group { items, .. } => {
            let inner: usize = items.iter().map(flat_width).sum();
            let separators = 2 * items.len().saturating_sub(1);
            2 + inner + separators
        }
    }
}

fn render_flat(doc: &Doc, out: &mut String) {
    match doc {
        Doc::Text(text) => out.push_str(text),
        Doc::Pair { key, value } => {
            out.push_str(key);
            out.push_str(": ");
            render_flat(value, out);
        }
        Doc::Group { open, close, items } => {
            out.push(*open);
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_flat(item, out);
            }
            out.push(*close);
        }
    }
}

/// Renders `doc` at the given column, breaking groups that do not fit.
fn render(doc: &Doc, column: usize, indent: usize, print_width: usize, out: &mut String) {
    if column + flat_width(doc) <= print_width {
        render_flat(doc, out);
        return;
    }

    match doc {
        Doc::Text(text) => out.push_str(text),
        Doc::Pair { key, value } => {
            out.push_str(key);
            out.push_str(": ");
            render(value, column + key.len() + 2, indent, print_width, out);
        }
        Doc::Group { open, close, items } => {
            if items.is_empty() {
                out.push(*open);
                out.push(*close);
                return;
            }
            out.push(*open);
            out.push('\n');
            let inner = indent + 2;
            for (i, item) in items.iter().enumerate() {
                out.push_str(&" ".repeat(inner));
                render(item, inner, inner, print_width, out);
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            out.push_str(&" ".repeat(indent));
            out.push(*close);
        }
    }
}

const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Highlights string and number literals on a single line. Unterminated
/// strings (common in the lines we diagnose) colorize to end of line.
fn colorize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                out.push_str(GREEN);
                out.push('"');
                let mut escaped = false;
                for c in chars.by_ref() {
                    out.push(c);
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == '"' {
                        break;
                    }
                }
                out.push_str(RESET);
            }
            '-' | '0'..='9' => {
                out.push_str(CYAN);
                out.push(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_digit() || matches!(next, '.' | 'e' | 'E' | '+' | '-') {
                        out.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(RESET);
            }
            other => out.push(other),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(source: &str, width: usize) -> String {
        JsonHandler.format(source, width).unwrap()
    }

    #[test]
    fn parse_reports_one_based_line() {
        let err = JsonHandler.parse("{\n  \"a\": }\n").unwrap_err();

        assert_eq!(err.line, 2);
        assert!(err.message.contains("line 2"));
    }

    #[test]
    fn parse_column_is_zero_based() {
        // Error at the very first character.
        let err = JsonHandler.parse("%").unwrap_err();

        assert_eq!(err.line, 1);
        assert_eq!(err.column, 0);
    }

    #[test]
    fn small_values_stay_on_one_line() {
        assert_eq!(format("[1, 2, 3]", 80), "[1, 2, 3]\n");
        assert_eq!(format("{\"a\": 1}", 80), "{\"a\": 1}\n");
    }

    #[test]
    fn narrow_width_breaks_groups() {
        let out = format("[100, 200, 300]", 10);

        assert_eq!(out, "[\n  100,\n  200,\n  300\n]\n");
    }

    #[test]
    fn nested_breaking_indents_by_two() {
        let out = format("{\"outer\": [1000, 2000, 3000]}", 20);

        assert_eq!(
            out,
            "{\n  \"outer\": [\n    1000,\n    2000,\n    3000\n  ]\n}\n"
        );
    }

    #[test]
    fn format_is_idempotent() {
        let sources = [
            "{\"b\": [1, 2, {\"c\": \"deep\"}], \"a\": null}",
            "[true, false, null, 1.5, \"text with spaces\"]",
            "{}",
            "[]",
        ];

        for source in sources {
            for width in [5, 20, 80] {
                let once = format(source, width);
                let twice = format(&once, width);
                assert_eq!(once, twice, "not idempotent for {source} at {width}");
            }
        }
    }

    #[test]
    fn object_keys_are_sorted() {
        assert_eq!(format("{\"b\": 1, \"a\": 2}", 80), "{\"a\": 2, \"b\": 1}\n");
    }

    #[test]
    fn empty_containers_never_break() {
        assert_eq!(format("{}", 1), "{}\n");
        assert_eq!(format("[]", 1), "[]\n");
    }

    #[test]
    fn doc_shows_first_group() {
        let doc = JsonHandler.doc("{\"a\": [1]}", 80).unwrap();

        assert!(doc.starts_with("Group"));
        assert!(doc.contains("Pair"));
    }

    #[test]
    fn doc_of_scalar_falls_back_to_whole_doc() {
        let doc = JsonHandler.doc("42", 80).unwrap();

        assert!(doc.contains("42"));
    }

    #[test]
    fn colorize_preserves_text() {
        let colored = JsonHandler.colorize("  \"a\": [1, true]");
        let stripped: String = colored.replace(GREEN, "").replace(CYAN, "").replace(RESET, "");

        assert_eq!(stripped, "  \"a\": [1, true]");
    }

    #[test]
    fn colorize_handles_unterminated_string() {
        let colored = JsonHandler.colorize("\"never closed");

        assert!(colored.contains("never closed"));
        assert!(colored.ends_with(RESET));
    }

    #[test]
    fn parse_builds_uniform_tree() {
        let tree = JsonHandler.parse("{\"n\": [1]}").unwrap();

        assert_eq!(tree.kind, "object");
        assert_eq!(tree.children[0].kind, "pair");
        assert_eq!(tree.children[0].children[0].value.as_deref(), Some("n"));
    }
}
