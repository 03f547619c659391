pub mod auth_handlers;
pub mod handlers;
pub mod library_handlers;
pub mod openapi;
pub mod responses;
pub mod routes;
pub mod state;

pub use openapi::ApiDocV1;
pub use responses::*;
pub use routes::create_router;
pub use state::AppState;
