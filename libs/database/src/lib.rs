//! Database library providing the MongoDB connector used by the workspace.
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, connect_from_config};
//! use core_config::FromEnv;
//!
//! let config = MongoConfig::from_env()?;
//! let client = connect_from_config(&config).await?;
//! let db = client.database(config.database());
//! ```

pub mod mongodb;

pub use mongodb::{MongoConfig, MongoError};
