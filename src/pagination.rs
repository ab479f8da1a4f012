//! This modules defines the common functionality for paging data.

use crate::Error;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The maximum number of rows to return when the request does not set a limit.
    pub default_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { default_limit: 10 }
    }
}

/// A validated page request: at most `limit` rows, skipping the first `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// The maximum number of rows to return.
    pub limit: u64,
    /// The number of matching rows to skip.
    pub offset: u64,
}

impl Pagination {
    /// Read the `limit` and `offset` query parameters.
    ///
    /// Missing or empty values default to the configured limit and an offset of zero.
    ///
    /// # Errors
    /// Returns [Error::InvalidPagination] if either value is not a non-negative integer.
    pub fn parse(
        limit: Option<&str>,
        offset: Option<&str>,
        config: &PaginationConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            limit: parse_parameter("limit", limit)?.unwrap_or(config.default_limit),
            offset: parse_parameter("offset", offset)?.unwrap_or(0),
        })
    }
}

fn parse_parameter(name: &str, value: Option<&str>) -> Result<Option<u64>, Error> {
    let value = match value.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(value) => value,
    };

    // `i64::from_str` accepts a leading sign, which is not a plain integer.
    if !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(invalid(name, value));
    }

    // SQLite integers are signed, so the value must also fit in an `i64`.
    value
        .parse::<i64>()
        .ok()
        .and_then(|value| u64::try_from(value).ok())
        .map(Some)
        .ok_or_else(|| invalid(name, value))
}

fn invalid(name: &str, value: &str) -> Error {
    Error::InvalidPagination(format!(
        "{name} must be a non-negative integer, got \"{value}\""
    ))
}
