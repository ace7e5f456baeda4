// Credential store: user persistence behind a common trait

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::{
    error::AuthError,
    models::{normalize_email, Role, User},
};
use crate::db::is_unique_violation;

/// Persistence operations the auth service needs
///
/// Implementations must reject a second account for an email that differs
/// only in letter case, even under concurrent registrations.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user; fails with `EmailAlreadyExists` when the email is taken
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<User, AuthError>;

    /// Find a user by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError>;

    /// Change the display name; `None` when the user does not exist
    async fn update_name(&self, id: Uuid, name: &str) -> Result<Option<User>, AuthError>;
}

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<User, AuthError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, name)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, name, role, created_at, updated_at
            "#,
        )
        .bind(normalize_email(email))
        .bind(password_hash)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // The unique index on LOWER(email) arbitrates concurrent registrations
            if is_unique_violation(&e) {
                AuthError::EmailAlreadyExists
            } else {
                AuthError::DatabaseError(e.to_string())
            }
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, role, created_at, updated_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<Option<User>, AuthError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, email, password_hash, name, role, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))
    }
}

/// In-memory user repository for tests and database-less development
///
/// The write lock is held across the duplicate check and the insert.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user with an explicit role, bypassing registration
    pub async fn insert_with_role(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        let email = normalize_email(email);
        let mut users = self.users.write().await;

        if users.values().any(|user| user.email == email) {
            return Err(AuthError::EmailAlreadyExists);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash: password_hash.to_string(),
            name: name.to_string(),
            role,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserStore for InMemoryUserRepository {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<User, AuthError> {
        self.insert_with_role(email, password_hash, name, Role::User).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let email = normalize_email(email);
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<Option<User>, AuthError> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.name = name.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_and_find_case_insensitive() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create_user("Alice@Example.com", "hash", "Alice").await.unwrap();

        assert_eq!(created.email, "alice@example.com");
        assert_eq!(created.role, Role::User);

        let found = repo.find_by_email("ALICE@example.COM").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(repo.find_by_id(created.id).await.unwrap().unwrap().name, "Alice");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create_user("a@x.com", "hash", "A").await.unwrap();

        let result = repo.create_user("A@X.COM", "hash", "Other").await;
        assert!(matches!(result, Err(AuthError::EmailAlreadyExists)));
    }

    #[tokio::test]
    async fn test_concurrent_registrations_yield_one_user() {
        let repo = Arc::new(InMemoryUserRepository::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.create_user("race@x.com", "hash", &format!("user{}", i)).await
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(AuthError::EmailAlreadyExists) => {}
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_update_name() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create_user("a@x.com", "hash", "A").await.unwrap();

        let updated = repo.update_name(user.id, "Alpha").await.unwrap().unwrap();
        assert_eq!(updated.name, "Alpha");
        assert!(updated.updated_at >= user.updated_at);

        assert!(repo.update_name(Uuid::new_v4(), "Nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_user_lookups() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.find_by_email("ghost@x.com").await.unwrap().is_none());
        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }
}
