pub mod auth;
pub mod health;
pub mod todos;

use crate::{auth::AuthMiddleware, error::AppError};
use actix_web::web;
use log::debug;

/// Registers the credential and todo routes.
///
/// `/auth/me` and the whole `/todos` scope sit behind `AuthMiddleware`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        debug!("Rejected request body: {}", err);
        AppError::BadRequest("Invalid request format".into()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        debug!("Rejected query string: {}", err);
        AppError::BadRequest("Invalid query parameters".into()).into()
    }))
    .service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login)
            .service(web::scope("/me").wrap(AuthMiddleware).service(auth::me)),
    )
    .service(
        web::scope("/todos")
            .wrap(AuthMiddleware)
            .service(todos::list_todos)
            .service(todos::create_todo)
            .service(todos::get_todo)
            .service(todos::update_todo)
            .service(todos::delete_todo),
    );
}
