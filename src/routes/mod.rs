pub mod categories;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::error::{json_error_handler, path_error_handler};

/// Registers every route of the board plus the JSON/path error handlers.
///
/// The caller supplies `web::Data<AppState>` and wraps the app in `AuthMiddleware`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .service(health::index)
        .service(health::health)
        .service(
            web::scope("/users")
                .service(users::register)
                .service(users::login)
                .service(users::update_account)
                .service(users::delete_account),
        )
        .service(
            web::scope("/categories")
                .service(categories::create_category)
                .service(categories::get_categories)
                .service(categories::update_category)
                .service(categories::delete_category),
        )
        .service(
            web::scope("/tasks")
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::update_task_status)
                .service(tasks::update_task_category)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}
