//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Listings API",
        version = "0.1.0",
        description = "MongoDB-based REST API for browsing and managing property listings",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/listings", api = domain_listings::ApiDoc)
    ),
    tags(
        (name = "Listings", description = "Property listing endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;
