use axum::{
    Json, Router,
    extract::{Extension, Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{
        BadRequestIdResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::error::{ListingError, ListingResult};
use crate::models::{
    CreateListing, Listing, ListingFilter, ListingPage, PageParams, UpdateListing,
};
use crate::repository::ListingRepository;
use crate::service::ListingService;

/// OpenAPI documentation for the Listings API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_listings,
        create_listing,
        listings_by_host,
        search_listings,
        listings_by_price,
        listings_by_amenities,
        get_listing,
        update_listing,
        delete_listing,
    ),
    components(
        schemas(Listing, CreateListing, UpdateListing, ListingPage, DeleteConfirmation),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestIdResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Listings", description = "Property listing endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;

pub type ListingsState<R> = Arc<ListingService<R>>;

/// Confirmation body returned by DELETE.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteConfirmation {
    pub message: String,
}

/// Create the listings router with all HTTP endpoints
pub fn router<R: ListingRepository + 'static>(service: ListingService<R>) -> Router {
    let state: ListingsState<R> = Arc::new(service);

    // Routes addressing one listing share an extractor middleware that
    // resolves the path id up front, so handlers never see a missing or
    // malformed id.
    let by_id = Router::new()
        .route(
            "/{id}",
            get(get_listing::<R>)
                .put(update_listing::<R>)
                .delete(delete_listing::<R>),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            load_listing::<R>,
        ));

    Router::new()
        .route("/", get(list_listings::<R>).post(create_listing::<R>))
        .route("/hosts/{host_id}/listings", get(listings_by_host::<R>))
        .route("/search", get(search_listings::<R>))
        .route("/price", get(listings_by_price::<R>))
        .route("/amenities", get(listings_by_amenities::<R>))
        .merge(by_id)
        .with_state(state)
}

/// Resolve the `{id}` path segment to a stored listing.
///
/// A malformed id is a client error, not a server failure; an unknown id is
/// a 404. On success the listing rides along as a request extension.
async fn load_listing<R: ListingRepository>(
    State(service): State<ListingsState<R>>,
    Path(id): Path<String>,
    mut request: Request,
    next: Next,
) -> Result<Response, ListingError> {
    let id: Uuid = id
        .parse()
        .map_err(|_| ListingError::InvalidId(id.clone()))?;
    let listing = service.get(id).await?;
    request.extensions_mut().insert(listing);
    Ok(next.run(request).await)
}

/// List listings, optionally narrowed by the recognized filters
#[utoipa::path(
    get,
    path = "",
    tag = "Listings",
    params(ListingFilter, PageParams),
    responses(
        (status = 200, description = "One page of listings", body = ListingPage),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_listings<R: ListingRepository>(
    State(service): State<ListingsState<R>>,
    Query(filter): Query<ListingFilter>,
    Query(params): Query<PageParams>,
) -> ListingResult<Json<ListingPage>> {
    let page = service.list(filter, &params).await?;
    Ok(Json(page))
}

/// Create a new listing
#[utoipa::path(
    post,
    path = "",
    tag = "Listings",
    request_body = CreateListing,
    responses(
        (status = 201, description = "Listing created successfully", body = Listing),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_listing<R: ListingRepository>(
    State(service): State<ListingsState<R>>,
    ValidatedJson(input): ValidatedJson<CreateListing>,
) -> ListingResult<impl IntoResponse> {
    let listing = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

/// List all listings belonging to one host
#[utoipa::path(
    get,
    path = "/hosts/{host_id}/listings",
    tag = "Listings",
    params(
        ("host_id" = String, Path, description = "Host identifier"),
        PageParams
    ),
    responses(
        (status = 200, description = "One page of the host's listings", body = ListingPage),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn listings_by_host<R: ListingRepository>(
    State(service): State<ListingsState<R>>,
    Path(host_id): Path<String>,
    Query(params): Query<PageParams>,
) -> ListingResult<Json<ListingPage>> {
    let page = service.by_host(host_id, &params).await?;
    Ok(Json(page))
}

/// Full-text search over listings
#[utoipa::path(
    get,
    path = "/search",
    tag = "Listings",
    params(
        ("q" = Option<String>, Query, description = "Search term; blank matches everything"),
        PageParams
    ),
    responses(
        (status = 200, description = "One page of matching listings", body = ListingPage),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_listings<R: ListingRepository>(
    State(service): State<ListingsState<R>>,
    Query(filter): Query<ListingFilter>,
    Query(params): Query<PageParams>,
) -> ListingResult<Json<ListingPage>> {
    let page = service.search(filter.q, &params).await?;
    Ok(Json(page))
}

/// Listings within a price band, cheapest first
#[utoipa::path(
    get,
    path = "/price",
    tag = "Listings",
    params(
        ("price_min" = Option<String>, Query, description = "Lower price bound"),
        ("price_max" = Option<String>, Query, description = "Upper price bound"),
        PageParams
    ),
    responses(
        (status = 200, description = "One page of listings in the band", body = ListingPage),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn listings_by_price<R: ListingRepository>(
    State(service): State<ListingsState<R>>,
    Query(filter): Query<ListingFilter>,
    Query(params): Query<PageParams>,
) -> ListingResult<Json<ListingPage>> {
    let page = service
        .by_price(filter.price_min(), filter.price_max(), &params)
        .await?;
    Ok(Json(page))
}

/// Listings containing every requested amenity
#[utoipa::path(
    get,
    path = "/amenities",
    tag = "Listings",
    params(
        ("amenities" = String, Query, description = "Comma-separated amenity names (required)"),
        PageParams
    ),
    responses(
        (status = 200, description = "One page of matching listings", body = ListingPage),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn listings_by_amenities<R: ListingRepository>(
    State(service): State<ListingsState<R>>,
    Query(filter): Query<ListingFilter>,
    Query(params): Query<PageParams>,
) -> ListingResult<Json<ListingPage>> {
    let page = service.by_amenities(filter, &params).await?;
    Ok(Json(page))
}

/// Get a listing by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Listings",
    params(
        ("id" = Uuid, Path, description = "Listing ID")
    ),
    responses(
        (status = 200, description = "Listing found", body = Listing),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_listing<R: ListingRepository>(
    Extension(listing): Extension<Listing>,
) -> Json<Listing> {
    Json(listing)
}

/// Update a listing
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Listings",
    params(
        ("id" = Uuid, Path, description = "Listing ID")
    ),
    request_body = UpdateListing,
    responses(
        (status = 200, description = "Listing updated successfully", body = Listing),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_listing<R: ListingRepository>(
    State(service): State<ListingsState<R>>,
    Extension(listing): Extension<Listing>,
    ValidatedJson(input): ValidatedJson<UpdateListing>,
) -> ListingResult<Json<Listing>> {
    let updated = service.update(listing, input).await?;
    Ok(Json(updated))
}

/// Delete a listing
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Listings",
    params(
        ("id" = Uuid, Path, description = "Listing ID")
    ),
    responses(
        (status = 200, description = "Listing deleted successfully", body = DeleteConfirmation),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_listing<R: ListingRepository>(
    State(service): State<ListingsState<R>>,
    Extension(listing): Extension<Listing>,
) -> ListingResult<Json<DeleteConfirmation>> {
    service.delete(listing.id).await?;
    Ok(Json(DeleteConfirmation {
        message: "Deleted Listing".to_string(),
    }))
}
