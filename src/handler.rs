//! HTTP request handlers for the URL shortener API
//!
//! Handlers validate the request shape and delegate to [`LinkService`]. The
//! caller has already been authenticated and authorized by the middleware.
//!
//! [`LinkService`]: crate::service::LinkService

use axum::{
    extract::{
        rejection::{PathRejection, StringRejection},
        Path, State,
    },
    Extension, Json,
};
use url::Url;

use crate::auth::Caller;
use crate::error::{Error, Result};
use crate::model::{Record, Statistics};
use crate::state::AppState;

/// Creates (or re-creates) a record for the caller
///
/// # Request Body
///
/// The raw URL as plain text, e.g. `http://www.google.com/`. Surrounding
/// whitespace is ignored.
///
/// # Response
///
/// - **200 OK** - The record, with its counters after this call
/// - **400 Bad Request** - Not an `http`/`https` URL
/// - **500 Internal Server Error** - Empty body
pub async fn create_short_url(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    body: std::result::Result<String, StringRejection>,
) -> Result<Json<Record>> {
    let body = body?;
    if body.is_empty() {
        return Err(Error::MissingBody);
    }

    let url = body.trim();
    if url.is_empty() || !is_web_url(url) {
        return Err(Error::InvalidArgument(format!("Invalid URL - {}", body)));
    }

    let record = state.links.create(&caller.name, url)?;
    Ok(Json(record))
}

/// Resolves one of the caller's identifiers to its URL
///
/// # Response
///
/// - **200 OK** - The URL as plain text
/// - **400 Bad Request** - Blank id
/// - **404 Not Found** - Unknown id, or id owned by another user
pub async fn resolve_url(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: std::result::Result<Path<String>, PathRejection>,
) -> Result<String> {
    let Path(id) = id?;
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument(format!("Invalid Tiny URL - {}", id)));
    }

    state.links.resolve(&caller.name, trimmed)
}

/// Statistics over every user's records (admin only)
pub async fn all_statistics(State(state): State<AppState>) -> Result<Json<Vec<Statistics>>> {
    Ok(Json(state.links.all_statistics()?))
}

/// Statistics over the caller's own records
pub async fn own_statistics(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<Statistics>>> {
    Ok(Json(state.links.user_statistics(&caller.name)?))
}

/// Statistics over the records of `user_id` (admin only)
pub async fn statistics_for_user(
    State(state): State<AppState>,
    user_id: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Statistics>>> {
    let Path(user_id) = user_id?;
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument(format!("Invalid userId - {}", user_id)));
    }

    Ok(Json(state.links.user_statistics(trimmed)?))
}

/// Accepts absolute `http`/`https` URLs with a host
fn is_web_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}
