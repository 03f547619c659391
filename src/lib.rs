// Library Crate Root
// lib.rs

// main.rs imports through lib.rs like an external crate
pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod library;
pub mod locale;
pub mod recipes;
pub mod translation;
pub mod websocket;

// pub use = re-export at crate root
pub use api::{create_router, AppState};
pub use config::AppConfig;
pub use error::AppError;
pub use locale::Locale;
pub use websocket::Broadcaster;
