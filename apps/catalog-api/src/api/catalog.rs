use std::sync::Arc;

use axum::Router;
use domain_catalog::{CatalogService, CloudinaryImageStore, MongoProductRepository};

use crate::state::AppState;

/// Wires the catalog domain to its MongoDB repository and Cloudinary store.
pub fn router(state: &AppState) -> Router {
    let repository = Arc::new(MongoProductRepository::new(&state.db));
    let images = Arc::new(CloudinaryImageStore::new(state.config.cloudinary.clone()));
    let service = CatalogService::new(repository, images).with_limits(state.config.uploads);

    domain_catalog::router(service)
}
