use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::AuthError;

/// Public part of an account (`users/{uid}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Name shown next to authored content: display name, else email
    pub fn author_name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .or_else(|| Some(self.email.as_str()).filter(|email| !email.is_empty()))
    }
}

/// Stored account: profile plus argon2 PHC string
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub profile: UserProfile,
    pub password_hash: String,
}

/// User account storage
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new account; fails with `EmailInUse` if the email is taken
    async fn insert(&self, record: UserRecord) -> Result<(), AuthError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError>;

    async fn find_by_uid(&self, uid: &str) -> Result<Option<UserRecord>, AuthError>;

    /// Replace the stored profile of an existing account
    async fn update_profile(&self, profile: UserProfile) -> Result<UserProfile, AuthError>;
}

/// Process-local user store, keyed by uid with an email index
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<String, UserRecord>,
    emails: DashMap<String, String>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, record: UserRecord) -> Result<(), AuthError> {
        match self.emails.entry(record.profile.email.clone()) {
            Entry::Occupied(_) => Err(AuthError::EmailInUse),
            Entry::Vacant(slot) => {
                slot.insert(record.profile.uid.clone());
                self.users.insert(record.profile.uid.clone(), record);
                Ok(())
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let uid = match self.emails.get(email) {
            Some(uid) => uid.clone(),
            None => return Ok(None),
        };
        Ok(self.users.get(&uid).map(|record| record.clone()))
    }

    async fn find_by_uid(&self, uid: &str) -> Result<Option<UserRecord>, AuthError> {
        Ok(self.users.get(uid).map(|record| record.clone()))
    }

    async fn update_profile(&self, profile: UserProfile) -> Result<UserProfile, AuthError> {
        let mut record = self
            .users
            .get_mut(&profile.uid)
            .ok_or(AuthError::UserNotFound)?;
        record.profile = profile.clone();
        Ok(profile)
    }
}
