use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ListingResult;
use crate::models::{Listing, ListingQuery, PageWindow};

/// Storage operations for listings.
///
/// The service layer talks to this trait only; the MongoDB implementation
/// lives in [`crate::mongodb`], and tests use the generated mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn insert(&self, listing: &Listing) -> ListingResult<()>;

    async fn get_by_id(&self, id: Uuid) -> ListingResult<Option<Listing>>;

    async fn find(&self, query: &ListingQuery, window: &PageWindow) -> ListingResult<Vec<Listing>>;

    async fn count(&self, query: &ListingQuery) -> ListingResult<u64>;

    async fn replace(&self, listing: &Listing) -> ListingResult<()>;

    /// Returns true when a document was actually removed.
    async fn delete(&self, id: Uuid) -> ListingResult<bool>;
}
