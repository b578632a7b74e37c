//! Listings API routes
//!
//! Wires the listings domain to HTTP routes.

use std::sync::Arc;

use axum::Router;
use domain_listings::{ListingService, MongoListingRepository, handlers};
use mongodb::Database;

use crate::state::AppState;

/// Create listings router
pub fn router(state: &AppState) -> Router {
    let repository = MongoListingRepository::new(state.db.clone());
    let service = ListingService::new(Arc::new(repository));

    handlers::router(service)
}

/// Ensure the text and lookup indexes exist before serving traffic
pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    let repository = MongoListingRepository::new(db.clone());
    repository
        .create_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create listing indexes: {}", e))?;
    Ok(())
}
