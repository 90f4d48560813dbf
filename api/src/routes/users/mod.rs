//! User CRUD route handlers
//!
//! Each handler maps one HTTP verb onto one facade call:
//! - `POST /users` creates
//! - `GET /users` lists, `GET /users/{id}` finds
//! - `PUT /users/{id}` updates the supplied fields
//! - `DELETE /users/{id}` deletes

pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::web;

pub use create::create_user;
pub use delete::delete_user;
pub use get::get_user;
pub use list::list_users;
pub use update::update_user;

/// Register the user routes under the current scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::post().to(create_user))
            .route("", web::get().to(list_users))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}", web::put().to(update_user))
            .route("/{id}", web::delete().to(delete_user)),
    );
}
