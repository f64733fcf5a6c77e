use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// A single star score attached to a product.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Rating {
    /// Whole stars, 1 through 5.
    pub value: i32,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    /// Builds a rating from a raw submitted value, rounding to the nearest
    /// whole star. Callers must have range-checked the value already.
    pub fn from_value(value: f64) -> Self {
        Self {
            value: value.round() as i32,
            created_at: Utc::now(),
        }
    }
}

/// Product entity - a catalog entry stored in MongoDB.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub brand: String,
    pub stock: i32,
    pub category: String,
    /// Public image URLs, in the order the files were submitted.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(input: NewProduct) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            description: input.description,
            price: input.price,
            brand: input.brand,
            stock: input.stock,
            category: input.category,
            images: Vec::new(),
            ratings: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Mean of all rating values, rounded to two decimal places.
    /// `None` when the product has no ratings yet.
    pub fn average_rating(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        let sum: i32 = self.ratings.iter().map(|r| r.value).sum();
        let mean = f64::from(sum) / self.ratings.len() as f64;
        Some((mean * 100.0).round() / 100.0)
    }
}

/// Text fields of the product creation form.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
    #[validate(range(exclusive_min = 0.0, message = "price must be greater than zero"))]
    pub price: f64,
    #[validate(length(min = 1, max = 100, message = "brand must be 1-100 characters"))]
    pub brand: String,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: i32,
    #[validate(length(min = 1, max = 100, message = "category must be 1-100 characters"))]
    pub category: String,
}

/// One image file received with the creation form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Query parameters for product search.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Case-insensitive substring matched against name and description.
    pub search: Option<String>,
}

/// A rating submission.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddRating {
    #[validate(range(min = 1.0, max = 5.0, message = "rating must be between 1 and 5"))]
    pub value: f64,
}

/// Response body for a successful rating submission.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub success: bool,
    pub product_id: Uuid,
    pub ratings_count: usize,
    pub average_rating: f64,
}
