use std::sync::Arc;

use database::mongodb::{Client, Database};

use crate::config::Config;

/// Shared application state, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub mongo_client: Client,
    pub db: Database,
}

impl AppState {
    pub fn new(config: Config, mongo_client: Client) -> Self {
        let db = mongo_client.database(config.mongodb.database());
        Self {
            config: Arc::new(config),
            mongo_client,
            db,
        }
    }
}
