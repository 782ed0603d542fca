#![doc = "The `kanban_board` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain models, authentication and authorization layer,"]
#![doc = "persistence, routing configuration, and error handling for the Kanban board API."]
#![doc = "It is used by the main binary (`main.rs`) to construct and run the application."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
