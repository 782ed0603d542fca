use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};
use std::process;
use std::sync::Arc;

use kanban_board::auth::{AuthMiddleware, TokenService};
use kanban_board::config::Config;
use kanban_board::routes;
use kanban_board::seed::ensure_admin;
use kanban_board::state::AppState;
use kanban_board::store::PgStore;

/// Logs a fatal startup error and exits.
fn fail(stage: &str, err: impl std::fmt::Display) -> ! {
    error!("{}: {}", stage, err);
    process::exit(1);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().unwrap_or_else(|e| fail("Invalid configuration", e));

    let store = PgStore::connect(&config.database_url)
        .await
        .unwrap_or_else(|e| fail("Error connecting to database", e));
    store
        .migrate()
        .await
        .unwrap_or_else(|e| fail("Failed to run migrations", e));

    ensure_admin(&store, &config.admin, config.bcrypt_cost)
        .await
        .unwrap_or_else(|e| fail("Failed to seed admin user", e));

    let state = web::Data::new(AppState::new(
        Arc::new(store),
        TokenService::new(&config.jwt_secret),
        config.bcrypt_cost,
    ));

    info!("Starting Kanban board server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(AuthMiddleware)
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
