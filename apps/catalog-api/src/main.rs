mod api;
mod config;
mod openapi;
mod state;

use std::time::Duration;

use axum_helpers::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::mongodb::connect_from_config;
use domain_catalog::MongoProductRepository;
use eyre::Result;
use tracing::info;

use crate::config::Config;
use crate::state::AppState;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(
        name = config.app.name,
        version = config.app.version,
        "Starting catalog API"
    );

    // A dead database at startup is fatal, no retries.
    let mongo_client = connect_from_config(&config.mongodb).await?;
    let state = AppState::new(config, mongo_client);

    MongoProductRepository::new(&state.db).init_indexes().await?;

    let router = create_router::<openapi::ApiDoc>(api::routes(&state))
        .await?
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()));

    let server_config = state.config.server.clone();
    let mongo_client = state.mongo_client.clone();
    create_production_app(router, &server_config, SHUTDOWN_TIMEOUT, async move {
        info!("Closing MongoDB connections");
        mongo_client.shutdown().await;
    })
    .await?;

    Ok(())
}
