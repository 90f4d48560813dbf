use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::{CreateUserRequest, UserResponse};
use crate::handlers::ApiError;

/// Handler for POST /api/v1/users
///
/// # Request Body
/// ```json
/// { "username": "Aeishen", "password": "301070" }
/// ```
///
/// # Response
///
/// ## Success (201 Created)
/// The stored user with its generated id, without the password.
///
/// ## Errors
/// - 400 Bad Request: Missing or invalid fields
/// - 503 Service Unavailable: Database unreachable
pub async fn create_user(
    state: web::Data<AppState>,
    request: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    request.validate()?;

    let user = state.users.create(request.into_user()).await?;
    tracing::info!(id = ?user.id, "User created");

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}
