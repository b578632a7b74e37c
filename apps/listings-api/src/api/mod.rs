//! API routes module
//!
//! This module defines all HTTP API routes for the Listings API.

pub mod health;
pub mod listings;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
/// Note: These are nested under /api by axum_helpers::create_router
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/listings", listings::router(state))
        .merge(health::router(state.clone()))
}
