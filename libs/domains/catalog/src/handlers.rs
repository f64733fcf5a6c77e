use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_helpers::errors::responses::{
    BadRequestUuidResponse, BadRequestValidationResponse, InternalServerErrorResponse,
    NotFoundResponse,
};
use axum_helpers::{UuidPath, ValidatedJson};
use utoipa::{OpenApi, ToSchema};

use crate::error::{CatalogError, CatalogResult};
use crate::images::ImageStore;
use crate::models::{AddRating, ImageUpload, NewProduct, Product, Rating, RatingSummary, SearchQuery};
use crate::repository::ProductRepository;
use crate::service::CatalogService;

/// Builds the catalog router. The body limit covers a full form with the
/// maximum number of images plus headroom for the text fields.
pub fn router<R, S>(service: CatalogService<R, S>) -> Router
where
    R: ProductRepository + 'static,
    S: ImageStore + 'static,
{
    let limits = service.upload_limits();
    let body_limit = limits
        .max_files
        .saturating_mul(limits.max_file_bytes)
        .saturating_add(64 * 1024);

    Router::new()
        .route("/items", get(search_products::<R, S>))
        .route("/items/{id}", get(get_product::<R, S>))
        .route("/create", post(create_product::<R, S>))
        .route("/items/{id}/addrating", post(add_rating::<R, S>))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(Arc::new(service))
}

/// Multipart form for creating a product. Shape documentation only, the
/// handler reads the fields from the raw multipart stream.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct CreateProductForm {
    name: String,
    description: String,
    price: f64,
    brand: String,
    stock: i32,
    category: String,
    /// Up to five image files.
    #[schema(value_type = Vec<String>, format = Binary)]
    images: Vec<String>,
}

/// Search products by name or description.
#[utoipa::path(
    get,
    path = "/items",
    tag = "Catalog",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching products, newest first", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse),
    )
)]
async fn search_products<R: ProductRepository, S: ImageStore>(
    State(service): State<Arc<CatalogService<R, S>>>,
    Query(query): Query<SearchQuery>,
) -> CatalogResult<Json<Vec<Product>>> {
    let products = service.search_products(query.search.as_deref()).await?;
    Ok(Json(products))
}

/// Get a single product by id.
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product", body = Product),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse),
    )
)]
async fn get_product<R: ProductRepository, S: ImageStore>(
    State(service): State<Arc<CatalogService<R, S>>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<Json<Product>> {
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// Create a product with up to five images.
#[utoipa::path(
    post,
    path = "/create",
    tag = "Catalog",
    request_body(content = CreateProductForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "The created product", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse),
    )
)]
async fn create_product<R: ProductRepository, S: ImageStore>(
    State(service): State<Arc<CatalogService<R, S>>>,
    multipart: Multipart,
) -> CatalogResult<impl IntoResponse> {
    let (input, files) = read_create_form(multipart).await?.into_parts()?;
    let product = service.create_product(input, files).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Add a star rating to a product.
#[utoipa::path(
    post,
    path = "/items/{id}/addrating",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = AddRating,
    responses(
        (status = 200, description = "Updated rating summary", body = RatingSummary),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse),
    )
)]
async fn add_rating<R: ProductRepository, S: ImageStore>(
    State(service): State<Arc<CatalogService<R, S>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<AddRating>,
) -> CatalogResult<Json<RatingSummary>> {
    let summary = service.add_rating(id, input).await?;
    Ok(Json(summary))
}

/// Accumulated fields of the creation form, before validation.
#[derive(Debug, Default)]
struct CreateForm {
    name: Option<String>,
    description: Option<String>,
    price: Option<String>,
    brand: Option<String>,
    stock: Option<String>,
    category: Option<String>,
    files: Vec<ImageUpload>,
}

impl CreateForm {
    fn into_parts(self) -> CatalogResult<(NewProduct, Vec<ImageUpload>)> {
        let mut missing = Vec::new();
        let name = require(self.name, "name", &mut missing);
        let description = require(self.description, "description", &mut missing);
        let price = require(self.price, "price", &mut missing);
        let brand = require(self.brand, "brand", &mut missing);
        let stock = require(self.stock, "stock", &mut missing);
        let category = require(self.category, "category", &mut missing);
        if !missing.is_empty() {
            return Err(CatalogError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let price = price.trim().parse::<f64>().map_err(|_| {
            CatalogError::Validation(format!("price must be a number, got '{price}'"))
        })?;
        let stock = stock.trim().parse::<i32>().map_err(|_| {
            CatalogError::Validation(format!("stock must be an integer, got '{stock}'"))
        })?;

        let input = NewProduct {
            name,
            description,
            price,
            brand,
            stock,
            category,
        };
        Ok((input, self.files))
    }
}

fn require(field: Option<String>, name: &'static str, missing: &mut Vec<&'static str>) -> String {
    match field {
        Some(value) if !value.trim().is_empty() => value,
        _ => {
            missing.push(name);
            String::new()
        }
    }
}

async fn read_create_form(mut multipart: Multipart) -> CatalogResult<CreateForm> {
    let mut form = CreateForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| CatalogError::Upload(err.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "images" => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|err| CatalogError::Upload(err.to_string()))?;
                form.files.push(ImageUpload {
                    filename,
                    content_type,
                    data,
                });
            }
            "name" => form.name = Some(read_text(field).await?),
            "description" => form.description = Some(read_text(field).await?),
            "price" => form.price = Some(read_text(field).await?),
            "brand" => form.brand = Some(read_text(field).await?),
            "stock" => form.stock = Some(read_text(field).await?),
            "category" => form.category = Some(read_text(field).await?),
            // Unknown fields are ignored, matching lenient form clients.
            _ => {}
        }
    }
    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> CatalogResult<String> {
    field
        .text()
        .await
        .map_err(|err| CatalogError::Validation(err.to_string()))
}

#[derive(OpenApi)]
#[openapi(
    paths(search_products, get_product, create_product, add_rating),
    components(
        schemas(Product, Rating, AddRating, RatingSummary, CreateProductForm),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = "Catalog", description = "Product catalog endpoints"))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::MockImageStore;
    use crate::repository::MockProductRepository;
    use crate::service::UploadLimits;
    use bytes::Bytes;

    fn filled_form() -> CreateForm {
        CreateForm {
            name: Some("Desk Lamp".to_string()),
            description: Some("Warm white, dimmable".to_string()),
            price: Some("24.50".to_string()),
            brand: Some("Luxo".to_string()),
            stock: Some("40".to_string()),
            category: Some("lighting".to_string()),
            files: vec![ImageUpload {
                filename: Some("lamp.png".to_string()),
                content_type: Some("image/png".to_string()),
                data: Bytes::from_static(b"png-bytes"),
            }],
        }
    }

    #[test]
    fn into_parts_builds_input_and_keeps_files() {
        let (input, files) = filled_form().into_parts().unwrap();
        assert_eq!(input.name, "Desk Lamp");
        assert_eq!(input.price, 24.50);
        assert_eq!(input.stock, 40);
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn into_parts_lists_all_missing_fields() {
        let mut form = filled_form();
        form.name = None;
        form.price = Some("  ".to_string());

        let err = form.into_parts().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("name"));
        assert!(message.contains("price"));
        assert!(!message.contains("brand"));
    }

    #[test]
    fn into_parts_rejects_non_numeric_price() {
        let mut form = filled_form();
        form.price = Some("cheap".to_string());

        let err = form.into_parts().unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert!(err.to_string().contains("cheap"));
    }

    #[test]
    fn into_parts_rejects_fractional_stock() {
        let mut form = filled_form();
        form.stock = Some("4.5".to_string());

        let err = form.into_parts().unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[test]
    fn router_tolerates_extreme_upload_limits() {
        let service = CatalogService::new(
            Arc::new(MockProductRepository::new()),
            Arc::new(MockImageStore::new()),
        )
        .with_limits(UploadLimits {
            max_files: usize::MAX,
            max_file_bytes: 2,
        });

        // Body limit computation must not overflow.
        let _ = router(service);
    }

    #[test]
    fn openapi_document_lists_all_operations() {
        let doc = ApiDoc::openapi();
        let paths = doc.paths.paths;
        assert!(paths.contains_key("/items"));
        assert!(paths.contains_key("/items/{id}"));
        assert!(paths.contains_key("/create"));
        assert!(paths.contains_key("/items/{id}/addrating"));
    }
}
