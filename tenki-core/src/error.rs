use reqwest::StatusCode;
use thiserror::Error;

use crate::model::Field;

/// The source page could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to request source page: {0}")]
    Request(#[source] reqwest::Error),

    #[error("source page returned status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// The page was retrieved but no longer has the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("observation block (.observedValue / .obs_block) not found in page")]
    ObservationBlockMissing,

    #[error("{0} not found in page")]
    FieldMissing(Field),
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid {field} value {value:?}: expected a decimal number")]
    InvalidRow { field: Field, value: String },

    #[error("failed to reach persistence gateway: {0}")]
    Request(#[source] reqwest::Error),

    #[error("persistence gateway returned status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode persistence gateway response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("persistence gateway returned no row for the insert")]
    EmptyInsert,
}

/// Failure of one scrape-and-store run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("scrape failed: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("write failed: {0}")]
    Write(#[from] GatewayError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "persistence gateway credentials are not configured.\n\
         Hint: run `tenki configure` or set SUPABASE_URL and SUPABASE_KEY."
    )]
    MissingCredentials,

    #[error(
        "persistence gateway key contains characters not allowed in an HTTP header.\n\
         Hint: check SUPABASE_KEY for stray whitespace or line breaks."
    )]
    InvalidKey,

    #[error("source.utc_offset_hours = {0} is out of range (-23..=23)")]
    InvalidUtcOffset(i32),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Shortens a response body for error messages.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
