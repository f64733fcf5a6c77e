use utoipa::OpenApi;

/// Top-level OpenAPI document, with the catalog routes mounted where the
/// router actually serves them.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bazar Catalog API",
        description = "Product catalog with image uploads and star ratings"
    ),
    nest(
        (path = "/api", api = domain_catalog::ApiDoc)
    )
)]
pub struct ApiDoc;
