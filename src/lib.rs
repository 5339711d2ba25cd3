#![doc = "The `tasklist` library crate."]
#![doc = ""]
#![doc = "Accounts, bearer-token sessions and per-user todo storage for the tasklist"]
#![doc = "API. The binary (`main.rs`) wires these modules into an actix-web server;"]
#![doc = "the integration tests build the same app on top of the in-memory stores."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod state;

pub use crate::error::AppError;
pub use crate::state::AppState;
