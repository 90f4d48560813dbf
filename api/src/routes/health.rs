//! Service status and endpoint listing

use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use mc_shared::types::{HealthResponse, HealthStatus, ServiceHealth};

use crate::app::AppState;

/// Handler for GET /health
///
/// Reports the database as a service when the app runs against one.
/// Returns 503 when any service is unhealthy.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let mut services = HashMap::new();
    if let Some(pool) = &state.database {
        let health = match pool.health_check().await {
            Ok(true) => ServiceHealth::healthy(),
            Ok(false) => ServiceHealth::unhealthy("unexpected health check result"),
            Err(e) => ServiceHealth::unhealthy(e.to_string()),
        };
        services.insert("database".to_string(), health);
    }

    let response = HealthResponse::from_services(services, env!("CARGO_PKG_VERSION"));
    if response.status == HealthStatus::Unhealthy {
        HttpResponse::ServiceUnavailable().json(response)
    } else {
        HttpResponse::Ok().json(response)
    }
}

/// Handler for GET /api/v1/
pub async fn api_info() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "MyCrud API v1",
        "endpoints": {
            "health": "/health",
            "users": {
                "create": {
                    "path": "/api/v1/users",
                    "method": "POST",
                    "request_body": {
                        "username": "string (1-64 chars)",
                        "password": "string (1-64 chars)",
                        "status": "active | deleted (optional)"
                    }
                },
                "list": {
                    "path": "/api/v1/users?limit={n}",
                    "method": "GET",
                    "description": "At most n users in id order, all when n is 0 or absent"
                },
                "get": { "path": "/api/v1/users/{id}", "method": "GET" },
                "update": {
                    "path": "/api/v1/users/{id}",
                    "method": "PUT",
                    "description": "Overwrites only the supplied fields"
                },
                "delete": { "path": "/api/v1/users/{id}", "method": "DELETE" }
            }
        }
    }))
}
