use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::{info, warn};

use mc_api::telemetry::init_tracing;
use mc_api::{create_app, AppState};
use mc_core::domain::{Entity, User};
use mc_core::repositories::EntityRepository;
use mc_shared::config::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging)?;

    info!(environment = %config.environment, "Starting MyCrud API Server");
    if config.environment.is_production() && config.cors.allows_any_origin() {
        warn!("CORS accepts any origin in production; set cors.allowed_origins");
    }

    let services = mc_infra::initialize(&config.database, &[User::definition()])
        .await
        .context("failed to initialize the database layer")?;
    info!("{}", services.pool.statistics());

    let users = EntityRepository::<User>::new(services.store(User::definition()));
    let state = web::Data::new(AppState::new(users).with_database(services.pool.clone()));

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let server_config = Arc::new(config.server.clone());
    let cors_config = Arc::new(config.cors.clone());
    let mut server = HttpServer::new(move || {
        create_app(state.clone(), &server_config, &cors_config)
    })
    .keep_alive(std::time::Duration::from_secs(config.server.keep_alive))
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {}", bind_address))?;

    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    let result = server.run().await;

    services.shutdown().await;
    info!("Server stopped");
    result.context("server error")
}
