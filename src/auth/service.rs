use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::repository::{UserProfile, UserRecord, UserRepository};
use super::AuthError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Bearer token plus the account it belongs to
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

/// Email/password accounts with opaque session tokens
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    /// token -> uid
    sessions: DashMap<String, String>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            users,
            sessions: DashMap::new(),
        }
    }

    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Session, AuthError> {
        let email = normalize_email(email);
        validate_email(&email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must have at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let now = Utc::now();
        let profile = UserProfile {
            uid: Uuid::new_v4().to_string(),
            email,
            display_name: clean_name(display_name),
            created_at: now,
            updated_at: now,
        };
        self.users
            .insert(UserRecord {
                profile: profile.clone(),
                password_hash: hash_password(password)?,
            })
            .await?;

        tracing::info!("Account created: {}", profile.uid);
        Ok(self.open_session(profile))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let record = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &record.password_hash) {
            tracing::debug!("Rejected login for {}", record.profile.uid);
            return Err(AuthError::InvalidCredentials);
        }

        Ok(self.open_session(record.profile))
    }

    /// Drop the session; unknown tokens are ignored
    pub fn logout(&self, token: &str) {
        if let Some((_, uid)) = self.sessions.remove(token) {
            tracing::debug!("Session closed for {}", uid);
        }
    }

    /// Resolve a bearer token to its account
    pub async fn authenticate(&self, token: &str) -> Result<UserProfile, AuthError> {
        let uid = self
            .sessions
            .get(token)
            .map(|uid| uid.clone())
            .ok_or(AuthError::Unauthorized)?;

        match self.users.find_by_uid(&uid).await? {
            Some(record) => Ok(record.profile),
            None => {
                self.sessions.remove(token);
                Err(AuthError::Unauthorized)
            }
        }
    }

    /// Set or clear the display name
    pub async fn update_profile(
        &self,
        uid: &str,
        display_name: Option<&str>,
    ) -> Result<UserProfile, AuthError> {
        let mut profile = self
            .users
            .find_by_uid(uid)
            .await?
            .ok_or(AuthError::UserNotFound)?
            .profile;

        profile.display_name = clean_name(display_name);
        profile.updated_at = Utc::now();
        self.users.update_profile(profile).await
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    fn open_session(&self, user: UserProfile) -> Session {
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(token.clone(), user.uid.clone());
        Session { token, user }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AuthError::Validation("Invalid email address".to_string()))
    }
}

fn clean_name(name: Option<&str>) -> Option<String> {
    name.map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::InMemoryUserRepository;

    fn service() -> AuthService {
        AuthService::new(Arc::new(InMemoryUserRepository::new()))
    }

    #[tokio::test]
    async fn test_signup_login_roundtrip() {
        let auth = service();
        let session = auth
            .signup(" Ana@Example.com ", "segredo", Some("Ana"))
            .await
            .unwrap();
        assert_eq!(session.user.email, "ana@example.com");
        assert_eq!(session.user.display_name.as_deref(), Some("Ana"));
        assert_eq!(session.user.created_at, session.user.updated_at);

        let login = auth.login("ana@example.com", "segredo").await.unwrap();
        assert_eq!(login.user.uid, session.user.uid);
        assert_ne!(login.token, session.token);
        assert_eq!(auth.active_sessions(), 2);
    }

    #[tokio::test]
    async fn test_signup_validation() {
        let auth = service();
        for email in ["", "ana", "ana@", "@example.com", "ana@example", "ana@.com"] {
            assert!(
                matches!(
                    auth.signup(email, "segredo", None).await,
                    Err(AuthError::Validation(_))
                ),
                "{email} should be rejected"
            );
        }
        assert!(matches!(
            auth.signup("ana@example.com", "12345", None).await,
            Err(AuthError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let auth = service();
        auth.signup("ana@example.com", "segredo", None).await.unwrap();
        assert!(matches!(
            auth.signup("ANA@example.com", "outro123", None).await,
            Err(AuthError::EmailInUse)
        ));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email() {
        let auth = service();
        auth.signup("ana@example.com", "segredo", None).await.unwrap();
        assert!(matches!(
            auth.login("ana@example.com", "errado").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("bia@example.com", "segredo").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_and_logout() {
        let auth = service();
        let session = auth.signup("ana@example.com", "segredo", None).await.unwrap();

        let profile = auth.authenticate(&session.token).await.unwrap();
        assert_eq!(profile.uid, session.user.uid);

        auth.logout(&session.token);
        assert!(matches!(
            auth.authenticate(&session.token).await,
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(
            auth.authenticate("not-a-token").await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_update_profile_bumps_updated_at() {
        let auth = service();
        let session = auth.signup("ana@example.com", "segredo", None).await.unwrap();

        let updated = auth
            .update_profile(&session.user.uid, Some("  Ana Maria "))
            .await
            .unwrap();
        assert_eq!(updated.display_name.as_deref(), Some("Ana Maria"));
        assert!(updated.updated_at >= session.user.updated_at);
        assert_eq!(updated.created_at, session.user.created_at);

        let cleared = auth.update_profile(&session.user.uid, Some(" ")).await.unwrap();
        assert_eq!(cleared.display_name, None);

        assert!(matches!(
            auth.update_profile("missing", None).await,
            Err(AuthError::UserNotFound)
        ));
    }
}
