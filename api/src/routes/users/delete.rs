use actix_web::{web, HttpResponse};

use crate::app::AppState;
use crate::dto::DeleteUserResponse;
use crate::handlers::ApiError;

/// Handler for DELETE /api/v1/users/{id}
///
/// Deleting an absent user is not an error; it reports `{"deleted": 0}`.
pub async fn delete_user(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let deleted = state.users.delete(id).await?;
    tracing::info!(id, deleted, "User deleted");

    Ok(HttpResponse::Ok().json(DeleteUserResponse { deleted }))
}
