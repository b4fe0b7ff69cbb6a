use crate::error::ProfileError;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

/// The slice of a user profile this service reads and writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub language: Option<String>,
}

/// Partial update; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub language: Option<String>,
}

/// Where user profiles live.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ProfileError>;

    /// Merge `update` into the stored profile, creating it if needed.
    async fn merge_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<(), ProfileError>;
}

/// Profile store kept in memory, for local runs and tests.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ProfileError> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn merge_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<(), ProfileError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles.entry(user_id.to_string()).or_default();
        if let Some(language) = update.language {
            profile.language = Some(language);
        }
        Ok(())
    }
}

/// Profile store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` and make sure the profile table exists.
    pub async fn connect(database_url: &str) -> Result<Self, ProfileError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let store = Self::new(pool);
        store.migrate().await?;
        info!("Connected to profile database");
        Ok(store)
    }

    /// Create the profile table if it does not exist yet.
    pub async fn migrate(&self) -> Result<(), ProfileError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS user_profiles (
                user_id TEXT PRIMARY KEY,
                language TEXT,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ProfileError> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT language FROM user_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(language,)| UserProfile { language }))
    }

    async fn merge_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<(), ProfileError> {
        sqlx::query(
            "INSERT INTO user_profiles (user_id, language, updated_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id) DO UPDATE SET
                language = COALESCE(EXCLUDED.language, user_profiles.language),
                updated_at = EXCLUDED.updated_at",
        )
        .bind(user_id)
        .bind(update.language)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
