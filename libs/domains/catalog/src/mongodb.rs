use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, to_bson, Bson, Document};
use mongodb::options::{FindOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use tracing::instrument;
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::models::{NewProduct, Product, Rating};
use crate::repository::ProductRepository;

const COLLECTION_NAME: &str = "products";

/// MongoDB-backed product repository.
#[derive(Clone)]
pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Product>(COLLECTION_NAME),
        }
    }

    pub fn collection(&self) -> &Collection<Product> {
        &self.collection
    }

    /// Creates the indexes the catalog queries rely on. Safe to call on
    /// every startup, index creation is idempotent.
    pub async fn init_indexes(&self) -> CatalogResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_created_at".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "category": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!(collection = COLLECTION_NAME, "Indexes initialized");
        Ok(())
    }

    fn id_filter(id: Uuid) -> Document {
        doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) }
    }

    fn search_filter(query: Option<&str>) -> Document {
        match query {
            Some(q) if !q.trim().is_empty() => {
                let pattern = q.trim();
                doc! {
                    "$or": [
                        { "name": { "$regex": pattern, "$options": "i" } },
                        { "description": { "$regex": pattern, "$options": "i" } },
                    ]
                }
            }
            _ => doc! {},
        }
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create(&self, input: NewProduct) -> CatalogResult<Product> {
        let product = Product::new(input);
        self.collection.insert_one(&product).await?;
        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Product>> {
        let product = self.collection.find_one(Self::id_filter(id)).await?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn search<'a>(&self, query: Option<&'a str>) -> CatalogResult<Vec<Product>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let cursor = self
            .collection
            .find(Self::search_filter(query))
            .with_options(options)
            .await?;
        let products: Vec<Product> = cursor.try_collect().await?;
        Ok(products)
    }

    #[instrument(skip(self, urls), fields(count = urls.len()))]
    async fn set_images(&self, id: Uuid, urls: Vec<String>) -> CatalogResult<Option<Product>> {
        let update = doc! { "$set": { "images": to_bson(&urls)? } };
        let product = self
            .collection
            .find_one_and_update(Self::id_filter(id), update)
            .return_document(ReturnDocument::After)
            .await?;
        Ok(product)
    }

    #[instrument(skip(self, rating), fields(value = rating.value))]
    async fn push_rating(&self, id: Uuid, rating: Rating) -> CatalogResult<Option<Product>> {
        let update = doc! { "$push": { "ratings": to_bson(&rating)? } };
        let product = self
            .collection
            .find_one_and_update(Self::id_filter(id), update)
            .return_document(ReturnDocument::After)
            .await?;
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_filter_none_matches_everything() {
        assert_eq!(MongoProductRepository::search_filter(None), doc! {});
    }

    #[test]
    fn search_filter_empty_matches_everything() {
        assert_eq!(MongoProductRepository::search_filter(Some("")), doc! {});
        assert_eq!(MongoProductRepository::search_filter(Some("   ")), doc! {});
    }

    #[test]
    fn search_filter_builds_case_insensitive_or() {
        let filter = MongoProductRepository::search_filter(Some("keyboard"));
        let branches = filter
            .get_array("$or")
            .expect("filter should contain $or");
        assert_eq!(branches.len(), 2);

        let name_clause = branches[0].as_document().unwrap();
        let regex = name_clause.get_document("name").unwrap();
        assert_eq!(regex.get_str("$regex").unwrap(), "keyboard");
        assert_eq!(regex.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn search_filter_trims_query() {
        let filter = MongoProductRepository::search_filter(Some("  mouse "));
        let branches = filter.get_array("$or").unwrap();
        let name_clause = branches[0].as_document().unwrap();
        let regex = name_clause.get_document("name").unwrap();
        assert_eq!(regex.get_str("$regex").unwrap(), "mouse");
    }

    #[test]
    fn id_filter_serializes_uuid() {
        let id = Uuid::now_v7();
        let filter = MongoProductRepository::id_filter(id);
        assert!(filter.get("_id").is_some());
        assert_ne!(filter.get("_id"), Some(&Bson::Null));
    }
}
