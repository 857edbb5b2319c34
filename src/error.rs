//! Error taxonomy for the segmentation pipeline
//!
//! Every failure collapses into one of three variants so the CLI layer can
//! report them distinctly and exit with a distinct status code: bad input or
//! bad data shape (`Validation`), the database being unreachable or the query
//! failing (`DataSource`), and failures writing the model or CSV artifacts
//! (`Persistence`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid user input or a dataset that does not meet the pipeline's
    /// shape requirements (missing columns, nulls, too few rows).
    #[error("{0}")]
    Validation(String),

    /// Database configuration, connection, or query failure.
    #[error("data source: {0}")]
    DataSource(String),

    /// Failure writing the model artifact or the output CSV.
    #[error("persistence: {0}")]
    Persistence(String),
}

impl PipelineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Process exit status for this error class; success is 0.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::DataSource(_) => 3,
            Self::Persistence(_) => 4,
        }
    }
}

impl From<sqlx::Error> for PipelineError {
    fn from(err: sqlx::Error) -> Self {
        Self::DataSource(err.to_string())
    }
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        Self::DataSource(err.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            PipelineError::validation("bad").exit_code(),
            PipelineError::DataSource("down".into()).exit_code(),
            PipelineError::Persistence("denied".into()).exit_code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            assert_ne!(*a, 0);
            for b in codes.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_validation_message_passthrough() {
        let err = PipelineError::validation("sex must be 'M' or 'F'");
        assert_eq!(err.to_string(), "sex must be 'M' or 'F'");
    }
}
