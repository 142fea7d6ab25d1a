use thiserror::Error;

/// Failure modes of a single remote lookup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("Rate limit exceeded, please try again later")]
    RateLimited,
}

impl SourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Player not found: {0}")]
    IdentityNotFound(String),

    #[error("Match not found: {0}")]
    MatchNotFound(String),

    #[error("Roster for {match_id} is invalid: {reason}")]
    RosterInvalid { match_id: String, reason: String },

    #[error("API error: {0}")]
    Source(#[from] SourceError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::StorageError(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::JsonError(e.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::StorageError(e.to_string())
    }
}
