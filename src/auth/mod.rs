//! Accounts, password hashing and bearer sessions

pub mod extractor;
pub mod repository;
pub mod service;

pub use extractor::{bearer_token, AuthUser};
pub use repository::{InMemoryUserRepository, UserProfile, UserRecord, UserRepository};
pub use service::{AuthService, Session, MIN_PASSWORD_LEN};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("Email already in use")]
    EmailInUse,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthorized,

    #[error("User not found")]
    UserNotFound,

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}
