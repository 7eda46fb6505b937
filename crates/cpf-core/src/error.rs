use thiserror::Error;

/// Structural parse failure with the 1-indexed line it was detected on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CpfError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Invalid abbreviation table: {0}")]
    InvalidAbbreviations(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CpfError>;
