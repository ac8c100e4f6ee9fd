//! Error types for the quiz domain.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a unit's question file.
#[derive(Debug, Error)]
pub enum QuestionStoreError {
    #[error("File not found: {}. Please check if the file exists.", .0.display())]
    NotFound(PathBuf),
    #[error("unit {0} does not exist")]
    UnknownUnit(u8),
    #[error("question {index} has an answer that is not one of its options")]
    AnswerNotInOptions { index: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid question file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised by the leaderboard files.
#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("leaderboard file is malformed: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors raised while talking to the text-completion service.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// The oracle did not answer in the `Question: ... Answer: ...` shape.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Couldn't parse the AI's question format correctly.")]
pub struct MalformedResponse;

/// Validation failures for user-provided session input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Please enter a valid name.")]
    EmptyName,
}
