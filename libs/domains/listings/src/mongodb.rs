//! MongoDB implementation of ListingRepository

use async_trait::async_trait;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, to_bson},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ListingResult;
use crate::models::{Listing, ListingQuery, PageWindow};
use crate::repository::ListingRepository;

/// MongoDB implementation of the ListingRepository
pub struct MongoListingRepository {
    collection: Collection<Listing>,
}

impl MongoListingRepository {
    /// Create a new MongoListingRepository
    ///
    /// # Example
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let db = client.database("airbnb");
    /// let repo = MongoListingRepository::new(db);
    /// ```
    pub fn new(db: Database) -> Self {
        let collection = db.collection::<Listing>("listings");
        Self { collection }
    }

    /// Create a new MongoListingRepository with a custom collection name
    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        let collection = db.collection::<Listing>(collection_name);
        Self { collection }
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<Listing> {
        &self.collection
    }

    /// Create the indexes the query paths rely on. Idempotent; call at startup.
    pub async fn create_indexes(&self) -> ListingResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "name": "text", "description": "text", "neighbourhood": "text" })
                .build(),
            IndexModel::builder().keys(doc! { "host_id": 1 }).build(),
            IndexModel::builder().keys(doc! { "price": 1 }).build(),
        ];
        self.collection.create_indexes(indexes).await?;
        tracing::info!("listing indexes ensured");
        Ok(())
    }

    /// Build a MongoDB filter document from a ListingQuery
    fn build_filter(query: &ListingQuery) -> Document {
        let mut doc = doc! {};

        match query {
            ListingQuery::Filtered(filter) => {
                if let Some(ref neighbourhood) = filter.neighbourhood {
                    doc.insert("neighbourhood", neighbourhood);
                }

                if let Some(ref room_type) = filter.room_type {
                    doc.insert("room_type", room_type);
                }

                if let Some(accommodates) = filter.accommodates_value() {
                    doc.insert("accommodates", accommodates);
                }

                let mut price = doc! {};
                if let Some(min) = filter.price_min() {
                    price.insert("$gte", min);
                }
                if let Some(max) = filter.price_max() {
                    price.insert("$lte", max);
                }
                if !price.is_empty() {
                    doc.insert("price", price);
                }

                let amenities = filter.amenity_list();
                if !amenities.is_empty() {
                    doc.insert("amenities", doc! { "$all": amenities });
                }
            }
            ListingQuery::ByHost(host_id) => {
                doc.insert("host_id", host_id);
            }
            ListingQuery::Text(term) => {
                if let Some(term) = term {
                    doc.insert("$text", doc! { "$search": term });
                }
            }
            ListingQuery::PriceRange { min, max } => {
                let mut price = doc! {};
                if let Some(min) = min {
                    price.insert("$gte", *min);
                }
                if let Some(max) = max {
                    price.insert("$lte", *max);
                }
                if !price.is_empty() {
                    doc.insert("price", price);
                }
            }
        }

        doc
    }

    /// Sort order for a query; price queries come back cheapest first,
    /// everything else newest first.
    fn build_sort(query: &ListingQuery) -> Document {
        match query {
            ListingQuery::PriceRange { .. } => doc! { "price": 1 },
            _ => doc! { "created_at": -1 },
        }
    }
}

#[async_trait]
impl ListingRepository for MongoListingRepository {
    #[instrument(skip(self, listing), fields(listing_id = %listing.id))]
    async fn insert(&self, listing: &Listing) -> ListingResult<()> {
        self.collection.insert_one(listing).await?;
        tracing::info!(listing_id = %listing.id, "Listing created successfully");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ListingResult<Option<Listing>> {
        let filter = doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) };
        let listing = self.collection.find_one(filter).await?;
        Ok(listing)
    }

    #[instrument(skip(self, query))]
    async fn find(&self, query: &ListingQuery, window: &PageWindow) -> ListingResult<Vec<Listing>> {
        use futures_util::TryStreamExt;

        let mongo_filter = Self::build_filter(query);
        let options = mongodb::options::FindOptions::builder()
            .limit(window.limit)
            .skip(window.skip)
            .sort(Self::build_sort(query))
            .build();

        let cursor = self
            .collection
            .find(mongo_filter)
            .with_options(options)
            .await?;
        let listings: Vec<Listing> = cursor.try_collect().await?;

        Ok(listings)
    }

    #[instrument(skip(self, query))]
    async fn count(&self, query: &ListingQuery) -> ListingResult<u64> {
        let mongo_filter = Self::build_filter(query);
        let count = self.collection.count_documents(mongo_filter).await?;
        Ok(count)
    }

    #[instrument(skip(self, listing), fields(listing_id = %listing.id))]
    async fn replace(&self, listing: &Listing) -> ListingResult<()> {
        let filter = doc! { "_id": to_bson(&listing.id).unwrap_or(Bson::Null) };
        self.collection.replace_one(filter, listing).await?;
        tracing::info!(listing_id = %listing.id, "Listing updated successfully");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ListingResult<bool> {
        let filter = doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) };
        let result = self.collection.delete_one(filter).await?;

        if result.deleted_count > 0 {
            tracing::info!(listing_id = %id, "Listing deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }
}
