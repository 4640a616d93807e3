// handlers/protected/mod.rs - Handlers behind bearer authentication
//
// Every handler here receives the caller's Identity via Extension; the
// policy middleware has already rejected requests without one.
pub mod replies;
pub mod stats;
pub mod topics;
pub mod users;

use crate::error::ApiError;

/// Parse a `{id}` path segment.
pub(crate) fn parse_topic_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::bad_request("Invalid topic ID"))
}
