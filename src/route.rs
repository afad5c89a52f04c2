//! Route definitions for the URL shortener API
//!
//! This module configures all HTTP routes and maps them to their respective
//! handlers and access guards.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::handler::{
    all_statistics, create_short_url, own_statistics, resolve_url, statistics_for_user,
};
use crate::middleware::{authenticate, require_admin, require_user};
use crate::state::AppState;

/// Creates and configures the Axum application router with all routes
///
/// # Route Definitions
///
/// - `POST /api/tinyurl` - Creates a record (USER)
/// - `GET /api/tinyurl/{id}` - Resolves an id to its URL (USER)
/// - `GET /api/tinyurl/user/statistics` - Caller's statistics (USER)
/// - `GET /api/tinyurl/statistics` - Statistics over all users (ADMIN)
/// - `GET /api/tinyurl/user/{user_id}/statistics` - Another user's statistics (ADMIN)
///
/// Every route requires Basic authentication; ADMIN passes USER guards.
///
/// # Example Usage
///
/// ```no_run
/// # use tinyurl::auth::UserDirectory;
/// # use tinyurl::route::create_app;
/// # use tinyurl::state::AppState;
/// # use tinyurl::store::RecordStore;
/// let store = RecordStore::open("data.db").unwrap();
/// let app = create_app(AppState::new(store, UserDirectory::default()));
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/tinyurl", post(create_short_url))
        .route("/tinyurl/{id}", get(resolve_url))
        .route("/tinyurl/user/statistics", get(own_statistics))
        .route_layer(middleware::from_fn(require_user));

    let admin_routes = Router::new()
        .route("/tinyurl/statistics", get(all_statistics))
        .route("/tinyurl/user/{user_id}/statistics", get(statistics_for_user))
        .route_layer(middleware::from_fn(require_admin));

    let api_routes = user_routes
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(state.clone(), authenticate));

    Router::new().nest("/api", api_routes).with_state(state)
}
