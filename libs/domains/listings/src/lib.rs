//! Listings Domain
//!
//! This module provides a complete domain implementation for managing
//! property listings (an Airbnb-style dataset) using MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints + id-lookup middleware
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Pagination, validation, query assembly
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Listing entity, DTOs, filter allow-list
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_listings::{
//!     handlers,
//!     mongodb::MongoListingRepository,
//!     service::ListingService,
//! };
//! use mongodb::Client;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("airbnb");
//!
//! let repository = MongoListingRepository::new(db);
//! let service = ListingService::new(Arc::new(repository));
//!
//! // Create Axum router
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{ListingError, ListingResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateListing, Listing, ListingFilter, ListingPage, ListingQuery, PageParams, UpdateListing,
};
pub use mongodb::MongoListingRepository;
pub use repository::ListingRepository;
pub use service::ListingService;
