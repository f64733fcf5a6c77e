//! # Axum Helpers
//!
//! Shared utilities and middleware for the workspace's Axum services.
//!
//! ## Modules
//!
//! - **[`errors`]**: Structured error responses with a single JSON shape
//! - **[`extractors`]**: Custom extractors (UUID path, validated JSON)
//! - **[`http`]**: HTTP middleware (security headers)
//! - **[`server`]**: Router/server setup, health endpoint, graceful shutdown

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

// Re-export error types
pub use errors::{AppError, ErrorResponse};

// Re-export extractors
pub use extractors::{UuidPath, ValidatedJson};

// Re-export HTTP middleware
pub use http::security_headers;

// Re-export server types
pub use server::{
    HealthResponse, create_app, create_production_app, create_router, health_router,
    shutdown_signal,
};
