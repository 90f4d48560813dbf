use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::{UpdateUserRequest, UserResponse};
use crate::handlers::ApiError;

/// Handler for PUT /api/v1/users/{id}
///
/// Overwrites only the fields present in the body and returns the user as
/// stored afterwards. An empty body changes nothing.
///
/// ## Errors
/// - 400 Bad Request: Invalid field values
/// - 404 Not Found: No user has this id
pub async fn update_user(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    request: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    request.validate()?;

    let id = id.into_inner();
    let user = state.users.patch(id, request.into_changes()).await?;
    tracing::info!(id, "User updated");

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
