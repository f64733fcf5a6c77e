use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Rating must be a number between 1 and 5, got {0}")]
    InvalidRating(f64),

    #[error("Upload rejected: {0}")]
    Upload(String),

    #[error("Image store error: {0}")]
    ImageStore(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<mongodb::error::Error> for CatalogError {
    fn from(err: mongodb::error::Error) -> Self {
        CatalogError::Database(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for CatalogError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        CatalogError::Database(err.to_string())
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::ImageStore(err.to_string())
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => AppError::NotFound(format!("Product not found: {id}")),
            CatalogError::Validation(_)
            | CatalogError::InvalidRating(_)
            | CatalogError::Upload(_) => AppError::BadRequest(err.to_string()),
            CatalogError::ImageStore(_) | CatalogError::Database(_) => {
                AppError::InternalServerError(err.to_string())
            }
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
