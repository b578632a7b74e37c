//! Application state management.
//!
//! The state contains the configuration plus the MongoDB client and the
//! database handle the domain routers read from.

use mongodb::{Client, Database};

/// Shared application state.
///
/// Cloned per handler; MongoDB handles are cheap Arc clones over a shared
/// connection pool.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// MongoDB client (cloneable, shares underlying connection pool)
    pub mongo_client: Client,
    /// MongoDB database instance
    pub db: Database,
}
