use actix_web::{web, HttpResponse};

use crate::app::AppState;
use crate::dto::{ListUsersQuery, UserResponse};
use crate::handlers::ApiError;

/// Handler for GET /api/v1/users?limit={n}
///
/// `limit` (alias `line`) of 0 or absent lists every user.
pub async fn list_users(
    state: web::Data<AppState>,
    query: web::Query<ListUsersQuery>,
) -> Result<HttpResponse, ApiError> {
    let users = state.users.find_many(query.limit).await?;
    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(users))
}
