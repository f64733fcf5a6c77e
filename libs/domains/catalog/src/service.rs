use std::sync::Arc;

use futures_util::future::try_join_all;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult};
use crate::images::ImageStore;
use crate::models::{AddRating, ImageUpload, NewProduct, Product, Rating, RatingSummary};
use crate::repository::ProductRepository;

pub const DEFAULT_MAX_FILES: usize = 5;
pub const DEFAULT_MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

/// Per-request upload constraints, checked before anything is persisted.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_files: usize,
    pub max_file_bytes: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

/// Catalog business logic on top of a repository and an image store.
pub struct CatalogService<R: ProductRepository, S: ImageStore> {
    repository: Arc<R>,
    images: Arc<S>,
    limits: UploadLimits,
}

impl<R: ProductRepository, S: ImageStore> Clone for CatalogService<R, S> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            images: Arc::clone(&self.images),
            limits: self.limits,
        }
    }
}

impl<R: ProductRepository, S: ImageStore> CatalogService<R, S> {
    pub fn new(repository: Arc<R>, images: Arc<S>) -> Self {
        Self {
            repository,
            images,
            limits: UploadLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: UploadLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn upload_limits(&self) -> UploadLimits {
        self.limits
    }

    #[instrument(skip(self))]
    pub async fn search_products(&self, query: Option<&str>) -> CatalogResult<Vec<Product>> {
        self.repository.search(query).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> CatalogResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    /// Creates a product, then uploads its images and stores their URLs.
    ///
    /// The product record is inserted before any upload starts, so a failed
    /// upload leaves a product without images rather than no product at all.
    /// Uploads run concurrently; the first failure aborts the rest.
    #[instrument(skip(self, input, files), fields(name = %input.name, files = files.len()))]
    pub async fn create_product(
        &self,
        input: NewProduct,
        files: Vec<ImageUpload>,
    ) -> CatalogResult<Product> {
        input
            .validate()
            .map_err(|err| CatalogError::Validation(err.to_string()))?;
        self.check_upload_limits(&files)?;

        let product = self.repository.create(input).await?;
        if files.is_empty() {
            return Ok(product);
        }

        let uploads = files
            .iter()
            .enumerate()
            .map(|(index, file)| self.images.upload(file.data.clone(), product.id, index));
        let urls = try_join_all(uploads).await?;

        self.repository
            .set_images(product.id, urls)
            .await?
            .ok_or(CatalogError::NotFound(product.id))
    }

    /// Records a star rating and returns the new rating summary. Fractional
    /// values are rounded to the nearest whole star before storage.
    #[instrument(skip(self))]
    pub async fn add_rating(&self, id: Uuid, input: AddRating) -> CatalogResult<RatingSummary> {
        if !(1.0..=5.0).contains(&input.value) || !input.value.is_finite() {
            return Err(CatalogError::InvalidRating(input.value));
        }

        let rating = Rating::from_value(input.value);
        let product = self
            .repository
            .push_rating(id, rating)
            .await?
            .ok_or(CatalogError::NotFound(id))?;

        Ok(RatingSummary {
            success: true,
            product_id: product.id,
            ratings_count: product.ratings.len(),
            average_rating: product.average_rating().unwrap_or(0.0),
        })
    }

    fn check_upload_limits(&self, files: &[ImageUpload]) -> CatalogResult<()> {
        if files.len() > self.limits.max_files {
            return Err(CatalogError::Upload(format!(
                "at most {} images per product, got {}",
                self.limits.max_files,
                files.len()
            )));
        }
        if let Some(file) = files.iter().find(|f| f.data.len() > self.limits.max_file_bytes) {
            return Err(CatalogError::Upload(format!(
                "file {} exceeds the {} byte limit",
                file.filename.as_deref().unwrap_or("<unnamed>"),
                self.limits.max_file_bytes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::MockImageStore;
    use crate::repository::MockProductRepository;
    use bytes::Bytes;

    fn sample_input() -> NewProduct {
        NewProduct {
            name: "Trail Backpack".to_string(),
            description: "30L, rain cover included".to_string(),
            price: 59.90,
            brand: "Osprey".to_string(),
            stock: 7,
            category: "outdoor".to_string(),
        }
    }

    fn sample_file(name: &str, size: usize) -> ImageUpload {
        ImageUpload {
            filename: Some(name.to_string()),
            content_type: Some("image/png".to_string()),
            data: Bytes::from(vec![0u8; size]),
        }
    }

    fn service(
        repository: MockProductRepository,
        images: MockImageStore,
    ) -> CatalogService<MockProductRepository, MockImageStore> {
        CatalogService::new(Arc::new(repository), Arc::new(images))
    }

    #[tokio::test]
    async fn search_passes_query_to_repository() {
        let mut repository = MockProductRepository::new();
        repository
            .expect_search()
            .withf(|query| *query == Some("keyboard"))
            .times(1)
            .returning(|_| Ok(vec![Product::new(sample_input())]));
        let images = MockImageStore::new();

        let products = service(repository, images)
            .search_products(Some("keyboard"))
            .await
            .unwrap();
        assert_eq!(products.len(), 1);
    }

    #[tokio::test]
    async fn search_without_query_lists_everything() {
        let mut repository = MockProductRepository::new();
        repository
            .expect_search()
            .withf(|query| query.is_none())
            .times(1)
            .returning(|_| Ok(vec![]));
        let images = MockImageStore::new();

        let products = service(repository, images)
            .search_products(None)
            .await
            .unwrap();
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn create_without_files_skips_uploads() {
        let mut repository = MockProductRepository::new();
        repository
            .expect_create()
            .times(1)
            .returning(|input| Ok(Product::new(input)));
        let images = MockImageStore::new();

        let product = service(repository, images)
            .create_product(sample_input(), vec![])
            .await
            .unwrap();
        assert!(product.images.is_empty());
    }

    #[tokio::test]
    async fn create_uploads_files_in_submission_order() {
        let mut repository = MockProductRepository::new();
        repository
            .expect_create()
            .times(1)
            .returning(|input| Ok(Product::new(input)));
        repository
            .expect_set_images()
            .withf(|_, urls| {
                urls == &["url-0".to_string(), "url-1".to_string(), "url-2".to_string()]
            })
            .times(1)
            .returning(|_, urls| {
                let mut product = Product::new(sample_input());
                product.images = urls;
                Ok(Some(product))
            });

        let mut images = MockImageStore::new();
        images
            .expect_upload()
            .times(3)
            .returning(|_, _, index| Ok(format!("url-{index}")));

        let product = service(repository, images)
            .create_product(
                sample_input(),
                vec![
                    sample_file("a.png", 10),
                    sample_file("b.png", 10),
                    sample_file("c.png", 10),
                ],
            )
            .await
            .unwrap();
        assert_eq!(product.images, vec!["url-0", "url-1", "url-2"]);
    }

    #[tokio::test]
    async fn create_rejects_too_many_files_before_insert() {
        let repository = MockProductRepository::new();
        let images = MockImageStore::new();

        let files = (0..6).map(|i| sample_file(&format!("{i}.png"), 10)).collect();
        let err = service(repository, images)
            .create_product(sample_input(), files)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Upload(_)));
    }

    #[tokio::test]
    async fn create_rejects_oversized_file_before_insert() {
        let repository = MockProductRepository::new();
        let images = MockImageStore::new();

        let limits = UploadLimits {
            max_files: 5,
            max_file_bytes: 100,
        };
        let err = service(repository, images)
            .with_limits(limits)
            .create_product(sample_input(), vec![sample_file("big.png", 101)])
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Upload(_)));
    }

    #[tokio::test]
    async fn create_rejects_invalid_input_before_insert() {
        let repository = MockProductRepository::new();
        let images = MockImageStore::new();

        let mut input = sample_input();
        input.price = -1.0;
        let err = service(repository, images)
            .create_product(input, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn upload_failure_leaves_product_without_images() {
        let mut repository = MockProductRepository::new();
        repository
            .expect_create()
            .times(1)
            .returning(|input| Ok(Product::new(input)));
        // set_images must not be called when an upload fails.

        let mut images = MockImageStore::new();
        images.expect_upload().returning(|_, _, index| {
            if index == 0 {
                Ok("url-0".to_string())
            } else {
                Err(CatalogError::ImageStore("upstream 500".to_string()))
            }
        });

        let err = service(repository, images)
            .create_product(
                sample_input(),
                vec![sample_file("a.png", 10), sample_file("b.png", 10)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::ImageStore(_)));
    }

    #[tokio::test]
    async fn get_product_maps_missing_to_not_found() {
        let mut repository = MockProductRepository::new();
        repository.expect_get_by_id().returning(|_| Ok(None));
        let images = MockImageStore::new();

        let err = service(repository, images)
            .get_product(Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn add_rating_rounds_before_storing() {
        let mut repository = MockProductRepository::new();
        repository
            .expect_push_rating()
            .withf(|_, rating| rating.value == 4)
            .times(1)
            .returning(|_, rating| {
                let mut product = Product::new(sample_input());
                product.ratings.push(rating);
                Ok(Some(product))
            });
        let images = MockImageStore::new();

        let summary = service(repository, images)
            .add_rating(Uuid::now_v7(), AddRating { value: 4.4 })
            .await
            .unwrap();
        assert!(summary.success);
        assert_eq!(summary.ratings_count, 1);
        assert_eq!(summary.average_rating, 4.0);
    }

    #[tokio::test]
    async fn add_rating_computes_average_over_all_ratings() {
        let mut repository = MockProductRepository::new();
        repository.expect_push_rating().returning(|_, rating| {
            let mut product = Product::new(sample_input());
            product.ratings.push(Rating::from_value(5.0));
            product.ratings.push(Rating::from_value(4.0));
            product.ratings.push(rating);
            Ok(Some(product))
        });
        let images = MockImageStore::new();

        let summary = service(repository, images)
            .add_rating(Uuid::now_v7(), AddRating { value: 1.0 })
            .await
            .unwrap();
        assert_eq!(summary.ratings_count, 3);
        assert_eq!(summary.average_rating, 3.33);
    }

    #[tokio::test]
    async fn add_rating_rejects_out_of_range_values() {
        let repository = MockProductRepository::new();
        let images = MockImageStore::new();
        let service = service(repository, images);

        for value in [0.0, 0.99, 5.01, -3.0, f64::NAN] {
            let err = service
                .add_rating(Uuid::now_v7(), AddRating { value })
                .await
                .unwrap_err();
            assert!(matches!(err, CatalogError::InvalidRating(_)));
        }
    }

    #[tokio::test]
    async fn add_rating_maps_missing_product_to_not_found() {
        let mut repository = MockProductRepository::new();
        repository.expect_push_rating().returning(|_, _| Ok(None));
        let images = MockImageStore::new();

        let err = service(repository, images)
            .add_rating(Uuid::now_v7(), AddRating { value: 3.0 })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }
}
