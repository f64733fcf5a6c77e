//! Server infrastructure module.
//!
//! Provides application setup with OpenAPI documentation, a health endpoint,
//! and graceful shutdown coordination.

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_app, create_production_app, create_router};
pub use health::{HealthResponse, health_router};
pub use shutdown::{ShutdownCoordinator, coordinated_shutdown, shutdown_signal};
