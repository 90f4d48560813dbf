//! Application state and factory
//!
//! This module holds the state shared by every worker and builds the
//! Actix-web application around it.

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use mc_core::domain::User;
use mc_core::repositories::EntityRepository;
use mc_infra::database::DatabasePool;
use mc_shared::config::{CorsConfig, ServerConfig};
use mc_shared::{error_codes, ErrorResponse};

use crate::middleware::create_cors;
use crate::routes::{health, users};

/// State shared by all workers
#[derive(Clone)]
pub struct AppState {
    /// User CRUD facade
    pub users: EntityRepository<User>,
    /// Pool probed by the health endpoint; absent for in-memory stores
    pub database: Option<DatabasePool>,
}

impl AppState {
    pub fn new(users: EntityRepository<User>) -> Self {
        Self {
            users,
            database: None,
        }
    }

    pub fn with_database(mut self, pool: DatabasePool) -> Self {
        self.database = Some(pool);
        self
    }
}

/// Create and configure the application
pub fn create_app(
    state: web::Data<AppState>,
    server: &ServerConfig,
    cors: &CorsConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(web::JsonConfig::default().limit(server.max_payload_size))
        // order matters: tracing wraps CORS so rejected preflights are logged
        .wrap(create_cors(cors))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api/v1")
                .configure(users::configure)
                .route("/", web::get().to(health::api_info)),
        )
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
