use std::time::Duration;

use thiserror::Error;

use crate::song::SongId;
use crate::validation::ValidationErrors;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Represents an SQL error.
    #[error("database error")]
    Sqlx { source: sqlx::Error },

    /// Represents a database statement that did not complete in time.
    #[error("database did not respond within {0:?}")]
    Timeout(Duration),

    /// Represents a lookup of a song that isn't in the database.
    #[error("no matching record in database")]
    NotFound(SongId),

    /// Represents an attempt to add a song twice.
    #[error("given song already exists in database")]
    AlreadyExists,

    /// Represents a lyrics lookup for a song that has none.
    #[error("given song does not have any lyrics assigned")]
    NoLyrics(SongId),

    /// Represents invalid user input, keyed by field.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Represents a page whose last item lies beyond the supported range.
    #[error("provided page ({page}) and pageSize ({page_size}) are too big, consider providing numbers that don't overflow int")]
    PageOverflow { page: u32, page_size: u32 },

    /// Represents a page with a zero number or size.
    #[error("provided page ({page}) and pageSize ({page_size}) must both be positive")]
    InvalidPage { page: u32, page_size: u32 },

    /// Represents a lyrics page that starts after the last verse.
    #[error("provided page ({page}) and pageSize ({page_size}) combination yields an empty page, song only has {verses} verses")]
    EmptyPage {
        page: u32,
        page_size: u32,
        verses: usize,
    },

    /// Represents a request body that couldn't be read as JSON.
    #[error("{0}")]
    MalformedBody(String),
}

impl LibraryError {
    /// Whether the error was caused by the server rather than the request.
    pub fn is_internal(&self) -> bool {
        matches!(self, LibraryError::Sqlx { .. } | LibraryError::Timeout(_))
    }
}

/// Enumerates reasons why song details couldn't be added after the
/// basic song info was saved.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// Represents a configured API URL that isn't HTTP(S).
    #[error("failed to fetch song details from external api: invalid or unsupported URL scheme: {0}")]
    UnsupportedUrl(String),

    /// Represents a transport-level failure.
    #[error("failed to fetch song details from external api: {source}")]
    Request { source: reqwest::Error },

    /// Represents a response with a status other than 200.
    #[error("failed to fetch song details from external api: API returned status: {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    /// Represents a response body that isn't the expected JSON.
    #[error("failed to fetch song details from external api: could not decode response: {source}")]
    Decode { source: reqwest::Error },

    /// Represents details that don't pass validation.
    #[error("failed to validate song details from external api: {0}")]
    InvalidDetails(ValidationErrors),

    /// Represents a failure to save valid details.
    #[error("failed to add additional info from external source: {0}")]
    Persist(LibraryError),
}
