use actix_web::{web, HttpResponse};

use crate::app::AppState;
use crate::dto::UserResponse;
use crate::handlers::ApiError;

/// Handler for GET /api/v1/users/{id}
///
/// ## Errors
/// - 404 Not Found: No user has this id
pub async fn get_user(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let user = state.users.find_by_id(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
