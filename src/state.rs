//! Application state shared across all request handlers

use std::sync::Arc;

use crate::auth::UserDirectory;
use crate::service::LinkService;
use crate::store::RecordStore;

/// Cloned into every handler by Axum
#[derive(Clone)]
pub struct AppState {
    pub links: LinkService,
    pub users: Arc<UserDirectory>,
}

impl AppState {
    pub fn new(store: RecordStore, users: UserDirectory) -> Self {
        Self {
            links: LinkService::new(store),
            users: Arc::new(users),
        }
    }
}
