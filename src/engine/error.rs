//! Classified per-item failures
//!
//! Every failure raised while processing one work item is caught at the
//! worker boundary as an [`ItemError`]; only panics (environment faults)
//! escape and take the process down.

use thiserror::Error;

use crate::handler::ParseFailure;

/// A classified failure for a single work item.
#[derive(Debug, Error)]
pub enum ItemError {
    /// The source did not parse. Carries the 1-based line and 0-based column
    /// used by the diagnostic renderer.
    #[error(transparent)]
    Parse(#[from] ParseFailure),

    /// The formatted output differs from the source (check).
    #[error("output did not match the expected format")]
    FormatMismatch,

    /// Formatting changed on a second pass (debug).
    #[error("formatting changed on a second pass")]
    NonIdempotent,

    /// Any other failure during the item's processing, logged with its
    /// cause chain.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_failure_display_is_its_message() {
        let err = ItemError::from(ParseFailure {
            line: 3,
            column: 7,
            message: "expected value".to_string(),
        });

        assert_eq!(err.to_string(), "expected value");
    }

    #[test]
    fn io_errors_classify_as_other() {
        let io = std::fs::read_to_string("/definitely/not/here").unwrap_err();
        let err = ItemError::from(anyhow::Error::from(io));

        assert!(matches!(err, ItemError::Other(_)));
    }
}
