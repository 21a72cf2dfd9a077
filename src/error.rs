//! Error types for Probe Deck
//!
//! Geometry and physics never fail; they return `None` for degenerate cases.
//! The fallible paths are puzzle generation and JSON parsing.

use thiserror::Error;

/// Result type alias using Probe Deck's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Probe Deck operations
#[derive(Error, Debug)]
pub enum Error {
    /// A puzzle could not be generated
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Object catalog JSON was malformed
    #[error("Catalog error: {0}")]
    Catalog(#[source] serde_json::Error),

    /// Settings JSON was malformed
    #[error("Settings error: {0}")]
    Settings(#[source] serde_json::Error),

    /// Requested object is not in the catalog
    #[error("Unknown object: {0}")]
    UnknownObject(String),

    /// Snapshot output failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Puzzle generation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Every regeneration attempt failed its constraints
    #[error("{puzzle} generation gave up after {attempts} attempts")]
    RetriesExhausted {
        puzzle: &'static str,
        attempts: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_exhausted_message() {
        let err: Error = GenerationError::RetriesExhausted {
            puzzle: "deflection",
            attempts: 3,
        }
        .into();
        assert_eq!(err.to_string(), "deflection generation gave up after 3 attempts");
    }
}
