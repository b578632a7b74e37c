use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::error::{ListingError, ListingResult};
use crate::models::{
    CreateListing, Listing, ListingFilter, ListingPage, ListingQuery, PageParams, UpdateListing,
};
use crate::repository::ListingRepository;

/// Default page size for the generic list and filter endpoints.
pub const DEFAULT_LIST_LIMIT: i64 = 100;
/// Default page size when listing a single host's properties.
pub const DEFAULT_HOST_LIMIT: i64 = 10;
/// Default page size for text search.
pub const DEFAULT_SEARCH_LIMIT: i64 = 100;
/// Default page size for price-band queries.
pub const DEFAULT_PRICE_LIMIT: i64 = 100;
/// Default page size for amenity queries.
pub const DEFAULT_AMENITIES_LIMIT: i64 = 100;

/// Business logic over a [`ListingRepository`].
pub struct ListingService<R: ListingRepository> {
    repository: Arc<R>,
}

impl<R: ListingRepository> ListingService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Run a query and wrap the results in a page envelope.
    ///
    /// The result list and the total count are two separate reads, so a
    /// concurrent write can make `totalPages` momentarily stale. Acceptable
    /// for pagination metadata.
    async fn page_of(
        &self,
        query: ListingQuery,
        params: &PageParams,
        default_limit: i64,
    ) -> ListingResult<ListingPage> {
        let window = params.window(default_limit);
        let listings = self.repository.find(&query, &window).await?;
        let total = self.repository.count(&query).await?;
        Ok(ListingPage {
            listings,
            total_pages: total.div_ceil(window.limit as u64),
            current_page: window.page,
        })
    }

    /// List listings matching the recognized filters.
    #[instrument(skip(self, filter, params))]
    pub async fn list(
        &self,
        filter: ListingFilter,
        params: &PageParams,
    ) -> ListingResult<ListingPage> {
        self.page_of(ListingQuery::Filtered(filter), params, DEFAULT_LIST_LIMIT)
            .await
    }

    /// List all listings belonging to one host.
    #[instrument(skip(self, params))]
    pub async fn by_host(
        &self,
        host_id: String,
        params: &PageParams,
    ) -> ListingResult<ListingPage> {
        self.page_of(ListingQuery::ByHost(host_id), params, DEFAULT_HOST_LIMIT)
            .await
    }

    /// Full-text search. An absent or blank term matches everything.
    #[instrument(skip(self, params))]
    pub async fn search(
        &self,
        q: Option<String>,
        params: &PageParams,
    ) -> ListingResult<ListingPage> {
        let term = q.filter(|s| !s.trim().is_empty());
        self.page_of(ListingQuery::Text(term), params, DEFAULT_SEARCH_LIMIT)
            .await
    }

    /// Listings in a price band, cheapest first.
    #[instrument(skip(self, params))]
    pub async fn by_price(
        &self,
        min: Option<f64>,
        max: Option<f64>,
        params: &PageParams,
    ) -> ListingResult<ListingPage> {
        tracing::info!(?min, ?max, "price query received");
        let page = self
            .page_of(
                ListingQuery::PriceRange { min, max },
                params,
                DEFAULT_PRICE_LIMIT,
            )
            .await?;
        tracing::info!(
            results = page.listings.len(),
            total_pages = page.total_pages,
            "price query complete"
        );
        Ok(page)
    }

    /// Listings containing every requested amenity. The amenities parameter
    /// is required here; its absence is a client error.
    #[instrument(skip(self, filter, params))]
    pub async fn by_amenities(
        &self,
        filter: ListingFilter,
        params: &PageParams,
    ) -> ListingResult<ListingPage> {
        if filter.amenity_list().is_empty() {
            return Err(ListingError::MissingParameter("amenities"));
        }
        let query = ListingQuery::Filtered(ListingFilter {
            amenities: filter.amenities,
            ..Default::default()
        });
        self.page_of(query, params, DEFAULT_AMENITIES_LIMIT).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> ListingResult<Listing> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ListingError::NotFound(id))
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateListing) -> ListingResult<Listing> {
        let listing = Listing::new(input);
        self.repository.insert(&listing).await?;
        Ok(listing)
    }

    /// Overlay `input` on the stored document and persist the result.
    #[instrument(skip(self, current, input), fields(listing_id = %current.id))]
    pub async fn update(
        &self,
        mut current: Listing,
        input: UpdateListing,
    ) -> ListingResult<Listing> {
        current.apply_update(input);
        self.repository.replace(&current).await?;
        Ok(current)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> ListingResult<()> {
        if !self.repository.delete(id).await? {
            return Err(ListingError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockListingRepository;
    use mockall::predicate::*;

    fn service(repo: MockListingRepository) -> ListingService<MockListingRepository> {
        ListingService::new(Arc::new(repo))
    }

    fn sample_listing() -> Listing {
        Listing::new(CreateListing {
            name: Some("Sea view flat".into()),
            host_id: Some("host-1".into()),
            price: Some(120.0),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_list_wraps_results_in_page() {
        let mut repo = MockListingRepository::new();
        repo.expect_find()
            .returning(|_, _| Ok(vec![sample_listing()]));
        repo.expect_count().returning(|_| Ok(250));

        let page = service(repo)
            .list(ListingFilter::default(), &PageParams::default())
            .await
            .unwrap();

        assert_eq!(page.listings.len(), 1);
        assert_eq!(page.current_page, 1);
        // 250 documents at the default limit of 100 spans 3 pages.
        assert_eq!(page.total_pages, 3);
    }

    #[tokio::test]
    async fn test_by_host_uses_smaller_default_limit() {
        let mut repo = MockListingRepository::new();
        repo.expect_find()
            .withf(|query, window| {
                *query == ListingQuery::ByHost("host-1".into()) && window.limit == 10
            })
            .returning(|_, _| Ok(vec![]));
        repo.expect_count().returning(|_| Ok(0));

        let page = service(repo)
            .by_host("host-1".into(), &PageParams::default())
            .await
            .unwrap();
        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn test_search_blank_term_matches_all() {
        let mut repo = MockListingRepository::new();
        repo.expect_find()
            .withf(|query, _| *query == ListingQuery::Text(None))
            .returning(|_, _| Ok(vec![]));
        repo.expect_count().returning(|_| Ok(0));

        service(repo)
            .search(Some("   ".into()), &PageParams::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_by_amenities_requires_parameter() {
        let repo = MockListingRepository::new();
        let err = service(repo)
            .by_amenities(ListingFilter::default(), &PageParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ListingError::MissingParameter("amenities")));
    }

    #[tokio::test]
    async fn test_by_amenities_drops_other_filters() {
        let mut repo = MockListingRepository::new();
        repo.expect_find()
            .withf(|query, _| match query {
                ListingQuery::Filtered(f) => {
                    f.amenities.is_some() && f.neighbourhood.is_none()
                }
                _ => false,
            })
            .returning(|_, _| Ok(vec![]));
        repo.expect_count().returning(|_| Ok(0));

        let filter = ListingFilter {
            amenities: Some("Wifi".into()),
            neighbourhood: Some("Chelsea".into()),
            ..Default::default()
        };
        service(repo)
            .by_amenities(filter, &PageParams::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let mut repo = MockListingRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));

        let id = Uuid::now_v7();
        let err = service(repo).get(id).await.unwrap_err();
        assert!(matches!(err, ListingError::NotFound(found) if found == id));
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_inserts() {
        let mut repo = MockListingRepository::new();
        repo.expect_insert().times(1).returning(|_| Ok(()));

        let listing = service(repo)
            .create(CreateListing {
                name: Some("New place".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(listing.name.as_deref(), Some("New place"));
    }

    #[tokio::test]
    async fn test_update_overlays_and_replaces() {
        let mut repo = MockListingRepository::new();
        repo.expect_replace()
            .withf(|listing| listing.price == Some(99.0))
            .times(1)
            .returning(|_| Ok(()));

        let current = sample_listing();
        let name_before = current.name.clone();
        let updated = service(repo)
            .update(
                current,
                UpdateListing {
                    price: Some(99.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price, Some(99.0));
        assert_eq!(updated.name, name_before);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let mut repo = MockListingRepository::new();
        repo.expect_delete().returning(|_| Ok(false));

        let err = service(repo).delete(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, ListingError::NotFound(_)));
    }
}
