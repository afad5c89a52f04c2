use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::auth::{Caller, Role};
use crate::error::Error;
use crate::state::AppState;

/// Middleware resolving the `Authorization` header to a [`Caller`]
///
/// Requests without valid Basic credentials are answered with 401 before any
/// route runs. On success the caller is stored in the request extensions for
/// the guards and handlers below.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Error> {
    let caller = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| state.users.authenticate_header(value));

    let Some(caller) = caller else {
        warn!(path = %request.uri().path(), "missing or invalid credentials");
        return Err(Error::Unauthenticated);
    };

    debug!(caller = %caller.name, path = %request.uri().path(), "authenticated");
    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

/// Route guard for endpoints open to `USER` (and therefore `ADMIN`)
pub async fn require_user(request: Request, next: Next) -> Result<Response, Error> {
    authorize(Role::User, request, next).await
}

/// Route guard for cross-user endpoints
pub async fn require_admin(request: Request, next: Next) -> Result<Response, Error> {
    authorize(Role::Admin, request, next).await
}

async fn authorize(required: Role, request: Request, next: Next) -> Result<Response, Error> {
    let Some(caller) = request.extensions().get::<Caller>() else {
        return Err(Error::Unauthenticated);
    };
    if !caller.permits(required) {
        warn!(caller = %caller.name, %required, "access denied");
        return Err(Error::AccessDenied);
    }

    Ok(next.run(request).await)
}
