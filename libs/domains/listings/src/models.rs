use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Upper bound on page size; requests asking for more are clamped.
pub const MAX_PAGE_SIZE: i64 = 500;

/// A property listing stored in the `listings` collection.
///
/// Only the fields the API filters or validates on are typed; everything
/// else travels in `extra` so documents with arbitrary shapes survive a
/// read-modify-write cycle untouched.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Listing {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbourhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accommodates: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amenities: Vec<String>,
    /// Fields not modelled above pass through verbatim.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn new(input: CreateListing) -> Self {
        let now = Utc::now();
        let mut extra = input.extra;
        // Client-supplied ids are never honored.
        extra.remove("_id");
        extra.remove("id");
        Self {
            id: Uuid::now_v7(),
            host_id: input.host_id,
            name: input.name,
            neighbourhood: input.neighbourhood,
            room_type: input.room_type,
            accommodates: input.accommodates,
            price: input.price,
            amenities: input.amenities.unwrap_or_default(),
            extra,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overlay an update on top of the current document.
    ///
    /// Fields present in the update replace the stored value; fields absent
    /// from the update are left alone. The id and creation timestamp are
    /// immutable.
    pub fn apply_update(&mut self, update: UpdateListing) {
        if let Some(host_id) = update.host_id {
            self.host_id = Some(host_id);
        }
        if let Some(name) = update.name {
            self.name = Some(name);
        }
        if let Some(neighbourhood) = update.neighbourhood {
            self.neighbourhood = Some(neighbourhood);
        }
        if let Some(room_type) = update.room_type {
            self.room_type = Some(room_type);
        }
        if let Some(accommodates) = update.accommodates {
            self.accommodates = Some(accommodates);
        }
        if let Some(price) = update.price {
            self.price = Some(price);
        }
        if let Some(amenities) = update.amenities {
            self.amenities = amenities;
        }
        for (key, value) in update.extra {
            if key == "_id" || key == "id" {
                continue;
            }
            self.extra.insert(key, value);
        }
        self.updated_at = Utc::now();
    }
}

/// Request body for creating a listing.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateListing {
    pub host_id: Option<String>,
    pub name: Option<String>,
    pub neighbourhood: Option<String>,
    pub room_type: Option<String>,
    #[validate(range(min = 0))]
    pub accommodates: Option<i64>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    pub amenities: Option<Vec<String>>,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Map<String, Value>,
}

/// Request body for updating a listing. Every field is optional; only the
/// ones provided are written.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateListing {
    pub host_id: Option<String>,
    pub name: Option<String>,
    pub neighbourhood: Option<String>,
    pub room_type: Option<String>,
    #[validate(range(min = 0))]
    pub accommodates: Option<i64>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    pub amenities: Option<Vec<String>>,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Map<String, Value>,
}

/// Recognized filter parameters for list-style endpoints.
///
/// Query strings may carry any keys the client likes; only the ones named
/// here affect the query. Numeric values are accepted as strings and parsed
/// leniently, so building a filter never fails.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListingFilter {
    pub neighbourhood: Option<String>,
    pub room_type: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub accommodates: Option<String>,
    /// Comma-separated list of amenities the listing must contain.
    pub amenities: Option<String>,
    /// Free-text search term.
    pub q: Option<String>,
}

impl ListingFilter {
    pub fn price_min(&self) -> Option<f64> {
        parse_lenient(self.price_min.as_deref(), "price_min")
    }

    pub fn price_max(&self) -> Option<f64> {
        parse_lenient(self.price_max.as_deref(), "price_max")
    }

    pub fn accommodates_value(&self) -> Option<i64> {
        parse_lenient(self.accommodates.as_deref(), "accommodates")
    }

    pub fn amenity_list(&self) -> Vec<String> {
        self.amenities
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn parse_lenient<T: std::str::FromStr>(raw: Option<&str>, field: &str) -> Option<T> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(field, value = raw, "ignoring unparseable filter value");
            None
        }
    }
}

/// Pagination parameters shared by every list-style endpoint.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// 1-based page number; values below 1 are clamped to 1.
    pub page: Option<u32>,
    /// Page size; clamped to 1..=500. Each endpoint has its own default.
    pub limit: Option<i64>,
}

/// A resolved pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub limit: i64,
    pub skip: u64,
}

impl PageParams {
    pub fn window(&self, default_limit: i64) -> PageWindow {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
        PageWindow {
            page,
            limit,
            skip: (page as u64 - 1) * limit as u64,
        }
    }
}

/// One page of listings plus pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListingPage {
    pub listings: Vec<Listing>,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
    #[serde(rename = "currentPage")]
    pub current_page: u32,
}

/// The queries the repository knows how to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingQuery {
    /// Field-level filters from the allow-list.
    Filtered(ListingFilter),
    /// All listings belonging to one host.
    ByHost(String),
    /// Full-text search; `None` matches everything.
    Text(Option<String>),
    /// Price band, sorted by price ascending.
    PriceRange { min: Option<f64>, max: Option<f64> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_listing_strips_client_supplied_id() {
        let input: CreateListing = serde_json::from_value(json!({
            "name": "Cozy loft",
            "_id": "11111111-1111-1111-1111-111111111111",
            "beds": 2
        }))
        .unwrap();
        let listing = Listing::new(input);
        assert_ne!(
            listing.id.to_string(),
            "11111111-1111-1111-1111-111111111111"
        );
        assert!(!listing.extra.contains_key("_id"));
        assert_eq!(listing.extra.get("beds"), Some(&json!(2)));
    }

    #[test]
    fn test_apply_update_overlays_and_preserves() {
        let mut listing = Listing::new(CreateListing {
            name: Some("Old name".into()),
            neighbourhood: Some("Brooklyn".into()),
            price: Some(120.0),
            ..Default::default()
        });
        let original_id = listing.id;
        let created_at = listing.created_at;

        let update: UpdateListing = serde_json::from_value(json!({
            "price": 150.0,
            "_id": "22222222-2222-2222-2222-222222222222",
            "wifi": true
        }))
        .unwrap();
        listing.apply_update(update);

        assert_eq!(listing.id, original_id);
        assert_eq!(listing.created_at, created_at);
        assert_eq!(listing.price, Some(150.0));
        assert_eq!(listing.name.as_deref(), Some("Old name"));
        assert_eq!(listing.neighbourhood.as_deref(), Some("Brooklyn"));
        assert_eq!(listing.extra.get("wifi"), Some(&json!(true)));
        assert!(!listing.extra.contains_key("_id"));
    }

    #[test]
    fn test_filter_parses_numeric_strings() {
        let filter = ListingFilter {
            price_min: Some("50".into()),
            price_max: Some("200.5".into()),
            accommodates: Some("4".into()),
            ..Default::default()
        };
        assert_eq!(filter.price_min(), Some(50.0));
        assert_eq!(filter.price_max(), Some(200.5));
        assert_eq!(filter.accommodates_value(), Some(4));
    }

    #[test]
    fn test_filter_ignores_malformed_numbers() {
        let filter = ListingFilter {
            price_min: Some("cheap".into()),
            accommodates: Some("".into()),
            ..Default::default()
        };
        assert_eq!(filter.price_min(), None);
        assert_eq!(filter.accommodates_value(), None);
    }

    #[test]
    fn test_amenity_list_splits_and_trims() {
        let filter = ListingFilter {
            amenities: Some("Wifi, Kitchen,,  Heating ".into()),
            ..Default::default()
        };
        assert_eq!(filter.amenity_list(), vec!["Wifi", "Kitchen", "Heating"]);
    }

    #[test]
    fn test_page_window_clamps() {
        let params = PageParams {
            page: Some(0),
            limit: Some(10_000),
        };
        let window = params.window(100);
        assert_eq!(window.page, 1);
        assert_eq!(window.limit, MAX_PAGE_SIZE);
        assert_eq!(window.skip, 0);
    }

    #[test]
    fn test_page_window_defaults() {
        let window = PageParams::default().window(10);
        assert_eq!(window.page, 1);
        assert_eq!(window.limit, 10);
        assert_eq!(window.skip, 0);
    }

    #[test]
    fn test_page_window_computes_skip() {
        let params = PageParams {
            page: Some(3),
            limit: Some(25),
        };
        let window = params.window(100);
        assert_eq!(window.skip, 50);
    }

    #[test]
    fn test_listing_round_trips_with_extra_fields() {
        let doc = json!({
            "_id": "0192a1b2-0000-7000-8000-000000000000",
            "name": "Sunny studio",
            "price": 85.0,
            "amenities": ["Wifi"],
            "bathrooms": 1.5,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z"
        });
        let listing: Listing = serde_json::from_value(doc).unwrap();
        assert_eq!(listing.extra.get("bathrooms"), Some(&json!(1.5)));
        let back = serde_json::to_value(&listing).unwrap();
        assert_eq!(back.get("bathrooms"), Some(&json!(1.5)));
        assert!(back.get("_id").is_some());
    }
}
