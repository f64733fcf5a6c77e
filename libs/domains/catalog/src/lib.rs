//! # Product Catalog Domain
//!
//! Products with images and star ratings, backed by MongoDB and Cloudinary.
//!
//! ## Architecture
//!
//! - **[`models`]**: Entities and request/response DTOs
//! - **[`repository`]**: Persistence trait, mockable for tests
//! - **[`mongodb`]**: MongoDB implementation of the repository
//! - **[`images`]**: Image store trait and the Cloudinary adapter
//! - **[`service`]**: Business logic (upload limits, rating math)
//! - **[`handlers`]**: Axum routes and the OpenAPI document

pub mod error;
pub mod handlers;
pub mod images;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{CatalogError, CatalogResult};
pub use handlers::{router, ApiDoc};
pub use images::{CloudinaryConfig, CloudinaryImageStore, ImageStore};
pub use models::{AddRating, ImageUpload, NewProduct, Product, Rating, RatingSummary};
pub use mongodb::MongoProductRepository;
pub use repository::ProductRepository;
pub use service::{CatalogService, UploadLimits};
