// Credential store: persisted user records

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::auth::{error::AuthError, models::User};

/// Outcome of a conditional password update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordUpdate {
    Updated,
    /// The user's token version moved on; the authorising token was already used
    StaleVersion,
}

/// Storage backend for user records.
/// Lookups are exact, case-sensitive matches.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user matching either the username or the email
    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, AuthError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError>;

    /// Create a new user; `Conflict` if the username or email is taken
    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AuthError>;

    /// Replace the password hash if the token version still matches,
    /// bumping the version in the same write
    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
        expected_version: i32,
    ) -> Result<PasswordUpdate, AuthError>;
}

const USER_COLUMNS: &str = "id, username, email, password_hash, token_version, created_at";

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new PgUserStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1 OR email = $2 LIMIT 1",
            USER_COLUMNS
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, username, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Concurrent signups race past the pre-check; the unique index decides
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AuthError::Conflict;
                }
            }
            AuthError::Database(e.to_string())
        })?;

        Ok(user)
    }

    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
        expected_version: i32,
    ) -> Result<PasswordUpdate, AuthError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, token_version = token_version + 1 \
             WHERE id = $1 AND token_version = $3",
        )
        .bind(user_id)
        .bind(password_hash)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(PasswordUpdate::Updated);
        }

        match self.find_by_id(user_id).await? {
            Some(_) => Ok(PasswordUpdate::StaleVersion),
            None => Err(AuthError::UserNotFound),
        }
    }
}

/// In-memory user store with the same uniqueness rules as the database
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().await;
        Ok(users
            .iter()
            .find(|u| Some(u.username.as_str()) == username || Some(u.email.as_str()) == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AuthError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.username == username || u.email == email) {
            return Err(AuthError::Conflict);
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            token_version: 0,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
        expected_version: i32,
    ) -> Result<PasswordUpdate, AuthError> {
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(AuthError::UserNotFound)?;

        if user.token_version != expected_version {
            return Ok(PasswordUpdate::StaleVersion);
        }

        user.password_hash = password_hash.to_string();
        user.token_version += 1;
        Ok(PasswordUpdate::Updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_lookup() {
        let store = MemoryUserStore::new();
        let user = store.create("alice", "a@x.com", "hash").await.unwrap();

        assert_eq!(user.token_version, 0);
        assert_eq!(store.find_by_username("alice").await.unwrap().unwrap().id, user.id);
        assert_eq!(store.find_by_email("a@x.com").await.unwrap().unwrap().id, user.id);
        assert_eq!(store.find_by_id(user.id).await.unwrap().unwrap().username, "alice");
        assert!(store
            .find_by_username_or_email(Some("nobody"), Some("a@x.com"))
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_by_username_or_email(Some("nobody"), Some("n@x.com"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_lookups_are_case_sensitive() {
        let store = MemoryUserStore::new();
        store.create("alice", "a@x.com", "hash").await.unwrap();

        assert!(store.find_by_username("Alice").await.unwrap().is_none());
        assert!(store.find_by_email("A@X.COM").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_or_email_conflicts() {
        let store = MemoryUserStore::new();
        store.create("alice", "a@x.com", "hash").await.unwrap();

        assert!(matches!(
            store.create("alice", "other@x.com", "hash").await,
            Err(AuthError::Conflict)
        ));
        assert!(matches!(
            store.create("bob", "a@x.com", "hash").await,
            Err(AuthError::Conflict)
        ));
    }

    #[tokio::test]
    async fn test_update_password_bumps_version_once() {
        let store = MemoryUserStore::new();
        let user = store.create("alice", "a@x.com", "old").await.unwrap();

        let outcome = store.update_password(user.id, "new", 0).await.unwrap();
        assert_eq!(outcome, PasswordUpdate::Updated);

        let updated = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(updated.password_hash, "new");
        assert_eq!(updated.token_version, 1);

        // Replaying the same version changes nothing
        let outcome = store.update_password(user.id, "newer", 0).await.unwrap();
        assert_eq!(outcome, PasswordUpdate::StaleVersion);
        let unchanged = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(unchanged.password_hash, "new");
    }

    #[tokio::test]
    async fn test_update_password_unknown_user() {
        let store = MemoryUserStore::new();
        assert!(matches!(
            store.update_password(Uuid::new_v4(), "new", 0).await,
            Err(AuthError::UserNotFound)
        ));
    }
}
