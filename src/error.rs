//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The selected month was missing or could not be read as a date or month.
    #[error("could not read \"{0}\" as a date or month")]
    InvalidDateInput(String),

    /// The `limit` or `offset` query parameter was not a non-negative integer.
    #[error("{0}")]
    InvalidPagination(String),

    /// The product feed could not be fetched or decoded.
    ///
    /// The string describes the underlying network or decoding error.
    #[error("could not fetch the product feed: {0}")]
    UpstreamFetchError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Writing a batch of feed records failed part way through.
    ///
    /// The batch is rolled back, so none of the `inserted` records are kept.
    #[error(
        "ingestion aborted after {inserted} of {total} records, no records were saved: {reason}"
    )]
    IngestionAborted {
        /// The number of records written before the failure.
        inserted: usize,
        /// The number of records in the batch.
        total: usize,
        /// The store error that stopped the batch.
        reason: String,
    },

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// No route matches the requested path.
    #[error("the requested resource could not be found")]
    NotFound,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl Error {
    /// The error kind reported to clients in the `kind` field of the response.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidDateInput(_) => "InvalidDateInput",
            Error::InvalidPagination(_) => "InvalidPagination",
            Error::UpstreamFetchError(_) => "UpstreamFetchError",
            Error::NotFound => "NotFound",
            Error::SqlError(_) | Error::IngestionAborted { .. } | Error::DatabaseLockError => {
                "StoreError"
            }
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidDateInput(_) | Error::InvalidPagination(_) => StatusCode::BAD_REQUEST,
            Error::UpstreamFetchError(_) => StatusCode::BAD_GATEWAY,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::SqlError(_) | Error::IngestionAborted { .. } | Error::DatabaseLockError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// The JSON body of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = match &self {
            // SQL error details are only meant for the server logs.
            Error::SqlError(error) => {
                tracing::error!("An unexpected error occurred: {}", error);
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            Error::DatabaseLockError => {
                tracing::error!("{self}");
                "The database is temporarily unavailable, try again later.".to_owned()
            }
            error => {
                tracing::warn!("{error}");
                error.to_string()
            }
        };

        let body = ErrorBody {
            kind: self.kind(),
            message,
        };

        (self.status_code(), Json(body)).into_response()
    }
}
