use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::models::{NewProduct, Product, Rating};

/// Persistence operations for the product catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Inserts a new product and returns the stored record.
    async fn create(&self, input: NewProduct) -> CatalogResult<Product>;

    /// Fetches a product by id, `None` when no document matches.
    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Product>>;

    /// Lists products matching the query, newest first. An absent or empty
    /// query returns the whole catalog.
    async fn search<'a>(&self, query: Option<&'a str>) -> CatalogResult<Vec<Product>>;

    /// Replaces the product's image URL list and returns the updated record.
    async fn set_images(&self, id: Uuid, urls: Vec<String>) -> CatalogResult<Option<Product>>;

    /// Atomically appends a rating and returns the updated record.
    async fn push_rating(&self, id: Uuid, rating: Rating) -> CatalogResult<Option<Product>>;
}
