//! Error types shared by the row source and the analysis core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Conditioned tables broke an invariant (missing conference, ambiguous
    /// winner). Aborts the run.
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// A page could not be fetched or parsed, even after the retry.
    #[error("Source unavailable: {url}: {message}")]
    SourceUnavailable { url: String, message: String },
}

impl Error {
    /// Build a `DataIntegrity` error from every violation found in one pass.
    pub fn integrity(violations: &[String]) -> Self {
        Self::DataIntegrity(violations.join("; "))
    }

    pub fn source_unavailable(url: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::SourceUnavailable {
            url: url.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_joins_violations() {
        let err = Error::integrity(&["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "Data integrity error: a; b");
    }

    #[test]
    fn test_source_unavailable_message() {
        let err = Error::source_unavailable("http://x", "timed out");
        assert_eq!(err.to_string(), "Source unavailable: http://x: timed out");
    }
}
